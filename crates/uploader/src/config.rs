//! Uploader configuration.
//!
//! Read from a JSON file; every field has a default so a partial (or
//! missing) file still yields a usable configuration.

use std::path::Path;
use std::time::Duration;

use pdfdrop_protocol::{CHUNK_SIZE, MAX_FILE_SIZE};
use serde::{Deserialize, Serialize};

use crate::error::UploadError;

/// Settings for the upload flow and its HTTP binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UploaderConfig {
    /// Largest raw document accepted, in bytes.
    pub max_file_size: u64,

    /// Base64 characters per chunk.
    pub chunk_size: usize,

    /// Deadline for a single chunk call. Unset waits indefinitely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_timeout_secs: Option<u64>,

    /// URL of the chunk-save endpoint.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub endpoint: String,

    /// Bearer token for the endpoint. Empty sends no `Authorization` header.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub access_token: String,
}

impl Default for UploaderConfig {
    fn default() -> Self {
        Self {
            max_file_size: MAX_FILE_SIZE,
            chunk_size: CHUNK_SIZE,
            chunk_timeout_secs: None,
            endpoint: String::new(),
            access_token: String::new(),
        }
    }
}

impl UploaderConfig {
    /// Loads configuration from a JSON file.
    ///
    /// A missing file yields defaults. A file that does not parse is
    /// logged and also yields defaults.
    pub fn load(path: &Path) -> Result<Self, UploadError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        match serde_json::from_str::<Self>(&content) {
            Ok(config) => Ok(config),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config, using defaults"
                );
                Ok(Self::default())
            }
        }
    }

    /// Writes the configuration as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), UploadError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        tracing::debug!(path = %path.display(), "configuration saved");
        Ok(())
    }

    /// Rejects values the transfer loop cannot run with.
    pub fn validate(&self) -> Result<(), UploadError> {
        if self.chunk_size == 0 {
            return Err(UploadError::Config("chunkSize must be positive".into()));
        }
        if self.max_file_size == 0 {
            return Err(UploadError::Config("maxFileSize must be positive".into()));
        }
        if self.chunk_timeout_secs == Some(0) {
            return Err(UploadError::Config(
                "chunkTimeoutSecs must be positive when set".into(),
            ));
        }
        Ok(())
    }

    pub fn chunk_timeout(&self) -> Option<Duration> {
        self.chunk_timeout_secs.map(Duration::from_secs)
    }
}
