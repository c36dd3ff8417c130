use serde::{Deserialize, Serialize};

use crate::{ContinuationToken, SizeLimitExceeded, TransferError};

/// Record-level fields sent with every chunk of one upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkMetadata {
    /// Record the attachment is created under.
    pub parent_id: String,
    pub file_name: String,
    pub content_type: String,
}

/// One slice of encoded text handed to a sink.
#[derive(Debug, Clone, Copy)]
pub struct Chunk<'a> {
    /// Zero-based position in the upload's chunk sequence.
    pub index: usize,
    /// Character offset of `data` within the encoded payload.
    pub offset: usize,
    /// Raw base64 text; sinks apply any transport escaping themselves.
    pub data: &'a str,
    /// Token returned for the previous chunk, empty for the first.
    pub token: &'a ContinuationToken,
}

impl Chunk<'_> {
    /// Offset one past the last character of this chunk.
    pub fn end(&self) -> usize {
        self.offset + self.data.len()
    }

    pub fn is_first(&self) -> bool {
        self.index == 0
    }
}

/// Reported after each chunk the sink accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkProgress {
    pub index: usize,
    pub total_chunks: usize,
    pub sent_chars: usize,
    pub total_chars: usize,
}

/// Terminal state of one upload.
#[derive(Debug, Clone)]
pub enum UploadOutcome {
    /// Every chunk was accepted; `record_id` is the final continuation token.
    Success {
        record_id: ContinuationToken,
        chunks: usize,
    },
    /// Refused before any chunk was sent.
    Rejected(SizeLimitExceeded),
    /// A chunk failed; no later chunk was attempted.
    Failed(TransferError),
}

impl UploadOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, UploadOutcome::Success { .. })
    }

    /// Record id of a successful upload.
    pub fn record_id(&self) -> Option<&ContinuationToken> {
        match self {
            UploadOutcome::Success { record_id, .. } => Some(record_id),
            _ => None,
        }
    }
}
