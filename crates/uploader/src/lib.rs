//! Document upload flow: prepare, size-check, chunked upload, notify.
//!
//! This crate holds the **business logic** of turning selected files into
//! record attachments. It has no UI dependencies: the front-end supplies
//! the files, a [`ChunkSink`](pdfdrop_transfer::ChunkSink) for the remote
//! call and a [`NotificationSink`](pdfdrop_notify::NotificationSink) for
//! user feedback.
//!
//! # Pipeline (per file, files strictly in order)
//!
//! 1. **Prepare**: PDFs pass through, PNG/JPEG go through a [`PdfEmbedder`]
//! 2. **Size**: compute the display size, reject oversized documents
//! 3. **Upload**: base64-encode and send in chunks, threading the record id
//! 4. **Notify**: success, rejection or failure

pub mod config;
pub mod document;
pub mod embed;
pub mod error;
pub mod http;
pub mod types;
pub mod uploader;

// Re-export primary types for convenience.
pub use config::UploaderConfig;
pub use document::{
    DocumentSource, EmbedFuture, ImageFormat, PdfEmbedder, PreparedDocument, SelectedFile,
    SourceKind, classify_content_type, converted_file_name, detect_content_type,
};
pub use embed::{ImagePdfEmbedder, image_to_pdf};
pub use error::UploadError;
pub use http::HttpChunkSink;
pub use types::{FileResult, FileStatus, UploadEvent};
pub use uploader::{Uploader, size_limit_message};
