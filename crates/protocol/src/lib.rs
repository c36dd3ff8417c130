//! Wire protocol types for chunked record-attachment uploads.
//!
//! A document is sent to the backend as a sequence of `SaveChunkRequest`
//! calls. The first call carries an empty `fileId`; the backend answers with
//! the id of the record it created, and every later call must carry that id
//! so the chunks are appended to the same record.

pub mod constants;
pub mod messages;
pub mod types;

// Re-export primary types for convenience.
pub use constants::{CHUNK_SIZE, MAX_FILE_SIZE, PDF_CONTENT_TYPE};
pub use messages::{
    SaveChunkRequest, SaveChunkResponse, encode_chunk_text, parse_save_chunk_response,
};
pub use types::ContinuationToken;

/// Errors produced while encoding or decoding wire messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("response did not contain a record id")]
    MissingRecordId,
}
