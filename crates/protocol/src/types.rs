use std::fmt;

use serde::{Deserialize, Serialize};

/// Server-issued id that ties the chunks of one upload to the same record.
///
/// Empty before the first chunk has been accepted. Serializes as a bare
/// JSON string so it can be used directly as the `fileId` wire field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContinuationToken(String);

impl ContinuationToken {
    /// The token carried by the first chunk of every upload.
    pub fn empty() -> Self {
        Self(String::new())
    }

    /// Wraps a server-issued id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns `true` if no record has been established yet.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for ContinuationToken {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for ContinuationToken {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for ContinuationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
