//! The remote side of a chunked upload.

use std::future::Future;
use std::pin::Pin;

use crate::types::{Chunk, ChunkMetadata};
use crate::{ContinuationToken, SinkError};

/// Boxed future returned by [`ChunkSink::send_chunk`].
pub type SinkFuture<'a> =
    Pin<Box<dyn Future<Output = Result<ContinuationToken, SinkError>> + Send + 'a>>;

/// Accepts chunks of one upload and hands back the continuation token.
///
/// Implemented by the application on top of its remote-call binding. Using a
/// trait keeps the transfer loop independent of the transport and testable
/// with mocks.
pub trait ChunkSink: Send + Sync {
    /// Stores `chunk` for the record described by `metadata`.
    ///
    /// `chunk.token` is empty for the first chunk. On success the returned
    /// token identifies the record that now holds the chunk.
    fn send_chunk<'a>(&'a self, metadata: &'a ChunkMetadata, chunk: Chunk<'a>) -> SinkFuture<'a>;
}
