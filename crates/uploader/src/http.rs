//! HTTP binding of the chunk-save call.
//!
//! Each chunk is POSTed as a JSON [`SaveChunkRequest`]; the response body
//! carries the id of the record holding the attachment.

use pdfdrop_protocol::{SaveChunkRequest, parse_save_chunk_response};
use pdfdrop_transfer::{Chunk, ChunkMetadata, ChunkSink, SinkError, SinkFuture};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};

use crate::config::UploaderConfig;
use crate::error::UploadError;

/// [`ChunkSink`] that talks to a chunk-save endpoint over HTTP.
pub struct HttpChunkSink {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpChunkSink {
    /// Creates a sink for `endpoint`, authenticating with `access_token`
    /// when it is non-empty.
    pub fn new(endpoint: impl Into<String>, access_token: &str) -> Result<Self, UploadError> {
        let endpoint = endpoint.into();
        if endpoint.is_empty() {
            return Err(UploadError::Config("endpoint is not set".into()));
        }

        let mut headers = HeaderMap::new();
        if !access_token.is_empty() {
            let value = HeaderValue::from_str(&format!("Bearer {access_token}"))
                .map_err(|_| UploadError::Config("access token is not a valid header".into()))?;
            headers.insert(AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self { http, endpoint })
    }

    pub fn from_config(config: &UploaderConfig) -> Result<Self, UploadError> {
        Self::new(config.endpoint.clone(), &config.access_token)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl ChunkSink for HttpChunkSink {
    fn send_chunk<'a>(&'a self, metadata: &'a ChunkMetadata, chunk: Chunk<'a>) -> SinkFuture<'a> {
        let request = SaveChunkRequest::new(
            metadata.parent_id.as_str(),
            metadata.file_name.as_str(),
            metadata.content_type.as_str(),
            chunk.data,
            chunk.token,
        );

        Box::pin(async move {
            let resp = self
                .http
                .post(&self.endpoint)
                .json(&request)
                .send()
                .await
                .map_err(|e| SinkError::Transport(e.to_string()))?;
            let status = resp.status();

            if !status.is_success() {
                let message = resp.text().await.unwrap_or_default();
                return Err(SinkError::Remote {
                    status: status.as_u16(),
                    message,
                });
            }

            let body = resp
                .bytes()
                .await
                .map_err(|e| SinkError::Transport(e.to_string()))?;
            parse_save_chunk_response(&body).map_err(|e| SinkError::InvalidResponse(e.to_string()))
        })
    }
}
