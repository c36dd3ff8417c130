//! Chunked upload of large documents through a size-limited remote call.
//!
//! The payload is base64-encoded, split into fixed-size slices of encoded
//! text and pushed through a [`ChunkSink`] one slice at a time. Each call
//! returns the continuation token the next call must carry.

mod chunked;
mod encoding;
mod engine;
mod sink;
mod types;
mod validation;

pub use chunked::{ChunkPlan, ChunkRanges};
pub use encoding::{
    EncodedPayload, check_size_limit, encode, format_bytes, format_human_size,
};
pub use engine::{TransferEngine, TransferState, upload};
pub use sink::{ChunkSink, SinkFuture};
pub use types::{Chunk, ChunkMetadata, ChunkProgress, UploadOutcome};
pub use validation::validate_file_name;

pub use pdfdrop_protocol::{CHUNK_SIZE, ContinuationToken, MAX_FILE_SIZE};

/// Raw payload larger than the configured limit.
///
/// Detected before any encoding or network activity.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("payload of {actual} bytes exceeds the {max} byte limit")]
pub struct SizeLimitExceeded {
    pub actual: u64,
    pub max: u64,
}

/// Failure reported by a [`ChunkSink`] for a single call.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SinkError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("remote error {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Errors produced by the transfer crate.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransferError {
    #[error("chunk size must be positive, got {0}")]
    InvalidChunkSize(usize),

    #[error("chunk {index} at offset {offset} failed: {source}")]
    ChunkTransmission {
        index: usize,
        offset: usize,
        #[source]
        source: SinkError,
    },

    #[error("chunk {index} was accepted without a continuation token")]
    MissingToken { index: usize },

    #[error("chunk {index} moved the upload from record {expected} to {actual}")]
    TokenMismatch {
        index: usize,
        expected: ContinuationToken,
        actual: ContinuationToken,
    },

    #[error("chunk {index} timed out after {after:?}")]
    Timeout {
        index: usize,
        after: std::time::Duration,
    },

    #[error("invalid file name: {0}")]
    InvalidFileName(String),
}
