//! Upload error types.

/// Errors produced while preparing or uploading a document.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unsupported content type: {0}")]
    UnsupportedContentType(String),

    #[error("no PDF embedder configured for {0}")]
    NoEmbedder(String),

    #[error("PDF conversion failed: {0}")]
    Embed(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("transfer error: {0}")]
    Transfer(#[from] pdfdrop_transfer::TransferError),
}
