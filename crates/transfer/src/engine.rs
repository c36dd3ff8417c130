//! The chunk loop.

use std::time::Duration;

use tracing::{debug, error, info};

use crate::chunked::ChunkPlan;
use crate::encoding::{EncodedPayload, check_size_limit, encode};
use crate::sink::ChunkSink;
use crate::types::{Chunk, ChunkMetadata, ChunkProgress, UploadOutcome};
use crate::{ContinuationToken, TransferError};

/// Position of an upload in its lifecycle.
#[derive(Debug)]
pub enum TransferState {
    /// No chunk has been sent yet.
    Idle,
    /// The chunk starting at `offset` is next, carrying `token`.
    Sending {
        offset: usize,
        token: ContinuationToken,
    },
    Succeeded {
        record_id: ContinuationToken,
    },
    Failed(TransferError),
}

/// Drives one payload through a [`ChunkSink`].
///
/// Chunks are sent strictly one after another: chunk N+1 is only built once
/// the token returned for chunk N is known. The first failure ends the
/// upload; nothing is retried.
pub struct TransferEngine<'a> {
    sink: &'a dyn ChunkSink,
    chunk_size: usize,
    chunk_timeout: Option<Duration>,
}

impl<'a> TransferEngine<'a> {
    /// Creates an engine sending `chunk_size` encoded characters per call.
    pub fn new(sink: &'a dyn ChunkSink, chunk_size: usize) -> Result<Self, TransferError> {
        ChunkPlan::new(0, chunk_size)?;
        Ok(Self {
            sink,
            chunk_size,
            chunk_timeout: None,
        })
    }

    /// Bounds every sink call; `None` waits indefinitely.
    pub fn with_chunk_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.chunk_timeout = timeout;
        self
    }

    /// Size-checks, encodes and uploads a raw payload.
    ///
    /// An oversized payload is rejected before it is encoded and before the
    /// sink is touched.
    pub async fn upload_payload(
        &self,
        payload: &[u8],
        max_bytes: u64,
        metadata: &ChunkMetadata,
        on_chunk: impl FnMut(ChunkProgress),
    ) -> UploadOutcome {
        if let Err(rejected) = check_size_limit(payload, max_bytes) {
            return UploadOutcome::Rejected(rejected);
        }
        let encoded = encode(payload);
        self.upload(&encoded, metadata, on_chunk).await
    }

    /// Uploads already-encoded text.
    pub async fn upload(
        &self,
        encoded: &EncodedPayload,
        metadata: &ChunkMetadata,
        mut on_chunk: impl FnMut(ChunkProgress),
    ) -> UploadOutcome {
        let plan = match ChunkPlan::new(encoded.len(), self.chunk_size) {
            Ok(plan) => plan,
            Err(e) => return UploadOutcome::Failed(e),
        };
        let total_chunks = plan.total_chunks();
        let mut sent = 0usize;
        let mut state = TransferState::Idle;

        loop {
            state = match state {
                TransferState::Idle => TransferState::Sending {
                    offset: 0,
                    token: ContinuationToken::empty(),
                },
                TransferState::Sending { offset, token } => {
                    let range = plan.range_from(offset);
                    let chunk = Chunk {
                        index: sent,
                        offset: range.start,
                        data: encoded.slice(range.clone()),
                        token: &token,
                    };
                    debug!(
                        file = %metadata.file_name,
                        chunk = sent,
                        of = total_chunks,
                        from = range.start,
                        to = range.end,
                        "sending chunk"
                    );

                    match self.send(metadata, chunk).await {
                        Ok(next) => match check_token(&token, next, sent) {
                            Ok(next) => {
                                sent += 1;
                                on_chunk(ChunkProgress {
                                    index: sent - 1,
                                    total_chunks,
                                    sent_chars: range.end,
                                    total_chars: encoded.len(),
                                });
                                if range.end == encoded.len() {
                                    TransferState::Succeeded { record_id: next }
                                } else {
                                    TransferState::Sending {
                                        offset: range.end,
                                        token: next,
                                    }
                                }
                            }
                            Err(e) => TransferState::Failed(e),
                        },
                        Err(e) => TransferState::Failed(e),
                    }
                }
                TransferState::Succeeded { record_id } => {
                    info!(
                        file = %metadata.file_name,
                        record = %record_id,
                        chunks = sent,
                        "upload complete"
                    );
                    return UploadOutcome::Success {
                        record_id,
                        chunks: sent,
                    };
                }
                TransferState::Failed(e) => {
                    error!(
                        file = %metadata.file_name,
                        chunks_sent = sent,
                        error = %e,
                        "upload failed"
                    );
                    return UploadOutcome::Failed(e);
                }
            };
        }
    }

    async fn send(
        &self,
        metadata: &ChunkMetadata,
        chunk: Chunk<'_>,
    ) -> Result<ContinuationToken, TransferError> {
        let index = chunk.index;
        let offset = chunk.offset;
        let call = self.sink.send_chunk(metadata, chunk);

        let result = match self.chunk_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| TransferError::Timeout {
                    index,
                    after: limit,
                })?,
            None => call.await,
        };

        result.map_err(|source| TransferError::ChunkTransmission {
            index,
            offset,
            source,
        })
    }
}

/// Ensures the record established by the first chunk is kept for the rest
/// of the upload.
fn check_token(
    current: &ContinuationToken,
    returned: ContinuationToken,
    index: usize,
) -> Result<ContinuationToken, TransferError> {
    if returned.is_empty() {
        return Err(TransferError::MissingToken { index });
    }
    if !current.is_empty() && *current != returned {
        return Err(TransferError::TokenMismatch {
            index,
            expected: current.clone(),
            actual: returned,
        });
    }
    Ok(returned)
}

/// Uploads `encoded` through `sink` in chunks of `chunk_size` characters.
///
/// A zero `chunk_size` fails without calling the sink.
pub async fn upload(
    encoded: &EncodedPayload,
    chunk_size: usize,
    sink: &dyn ChunkSink,
    metadata: &ChunkMetadata,
) -> UploadOutcome {
    match TransferEngine::new(sink, chunk_size) {
        Ok(engine) => engine.upload(encoded, metadata, |_| {}).await,
        Err(e) => UploadOutcome::Failed(e),
    }
}
