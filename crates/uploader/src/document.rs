//! Turning selected files into uploadable PDF documents.
//!
//! PDFs are uploaded as-is. PNG and JPEG images are wrapped into a PDF by a
//! [`PdfEmbedder`] supplied by the application. The embedder must be fully
//! initialized before it is handed to [`DocumentSource::with_embedder`];
//! nothing here loads it lazily.

use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;

use pdfdrop_protocol::PDF_CONTENT_TYPE;
use pdfdrop_protocol::constants::{JPEG_CONTENT_TYPE, PNG_CONTENT_TYPE};
use pdfdrop_transfer::format_bytes;
use tracing::debug;

use crate::error::UploadError;

/// Image formats the embedder understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

/// How a selected file becomes a PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Already a PDF; uploaded unchanged.
    Pdf,
    /// An image that must be embedded into a new PDF.
    Image(ImageFormat),
}

/// Maps a caller-supplied MIME type to a [`SourceKind`].
///
/// Only the type string is consulted; file contents are never sniffed.
pub fn classify_content_type(content_type: &str) -> Option<SourceKind> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match essence.as_str() {
        PDF_CONTENT_TYPE => Some(SourceKind::Pdf),
        PNG_CONTENT_TYPE => Some(SourceKind::Image(ImageFormat::Png)),
        JPEG_CONTENT_TYPE | "image/jpg" => Some(SourceKind::Image(ImageFormat::Jpeg)),
        _ => None,
    }
}

/// Guesses a MIME type from a file extension.
pub fn detect_content_type(path: &Path) -> Option<&'static str> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match ext.as_deref() {
        Some("pdf") => Some(PDF_CONTENT_TYPE),
        Some("png") => Some(PNG_CONTENT_TYPE),
        Some("jpg" | "jpeg") => Some(JPEG_CONTENT_TYPE),
        _ => None,
    }
}

/// Name under which a converted image is stored: same stem, `.pdf`.
pub fn converted_file_name(file_name: &str) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("document");
    format!("{stem}.pdf")
}

/// A file picked by the user, fully read into memory.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Reads a file from disk, guessing its type from the extension.
    ///
    /// Unknown extensions get `application/octet-stream`, which
    /// [`DocumentSource::prepare`] rejects.
    pub async fn from_path(path: &Path) -> Result<Self, UploadError> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content_type = detect_content_type(path).unwrap_or("application/octet-stream");
        Ok(Self::new(name, content_type, bytes))
    }
}

/// A PDF ready for upload.
#[derive(Debug, Clone)]
pub struct PreparedDocument {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
    /// Human-readable size, e.g. `"1.43 MB"`.
    pub display_size: String,
}

impl PreparedDocument {
    fn new(file_name: String, bytes: Vec<u8>) -> Self {
        let display_size = format_bytes(bytes.len() as u64);
        Self {
            file_name,
            content_type: PDF_CONTENT_TYPE.to_string(),
            bytes,
            display_size,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Boxed future returned by [`PdfEmbedder::embed_image`].
pub type EmbedFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Vec<u8>, UploadError>> + Send + 'a>>;

/// Builds a single-page PDF around an image.
///
/// Page layout is the implementation's concern.
pub trait PdfEmbedder: Send + Sync {
    fn embed_image<'a>(&'a self, image: &'a [u8], format: ImageFormat) -> EmbedFuture<'a>;
}

/// Produces [`PreparedDocument`]s from selected files.
#[derive(Clone, Default)]
pub struct DocumentSource {
    embedder: Option<Arc<dyn PdfEmbedder>>,
}

impl DocumentSource {
    /// A source that only accepts PDFs.
    pub fn pdf_only() -> Self {
        Self { embedder: None }
    }

    /// A source that also converts images through `embedder`.
    pub fn with_embedder(embedder: Arc<dyn PdfEmbedder>) -> Self {
        Self {
            embedder: Some(embedder),
        }
    }

    pub fn can_convert_images(&self) -> bool {
        self.embedder.is_some()
    }

    /// Produces the PDF bytes for `file`.
    pub async fn prepare(&self, file: SelectedFile) -> Result<PreparedDocument, UploadError> {
        let kind = classify_content_type(&file.content_type)
            .ok_or_else(|| UploadError::UnsupportedContentType(file.content_type.clone()))?;

        match kind {
            SourceKind::Pdf => {
                debug!(file = %file.name, bytes = file.bytes.len(), "passing PDF through");
                Ok(PreparedDocument::new(file.name, file.bytes))
            }
            SourceKind::Image(format) => {
                let embedder = self
                    .embedder
                    .as_ref()
                    .ok_or_else(|| UploadError::NoEmbedder(file.content_type.clone()))?;
                let pdf = embedder.embed_image(&file.bytes, format).await?;
                debug!(
                    file = %file.name,
                    image_bytes = file.bytes.len(),
                    pdf_bytes = pdf.len(),
                    "converted image to PDF"
                );
                Ok(PreparedDocument::new(converted_file_name(&file.name), pdf))
            }
        }
    }
}

impl std::fmt::Debug for DocumentSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentSource")
            .field("can_convert_images", &self.can_convert_images())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Embedder that wraps the image bytes in fake PDF markers.
    struct FakeEmbedder;

    impl PdfEmbedder for FakeEmbedder {
        fn embed_image<'a>(&'a self, image: &'a [u8], format: ImageFormat) -> EmbedFuture<'a> {
            Box::pin(async move {
                let mut pdf = b"%PDF-1.7\n".to_vec();
                pdf.extend_from_slice(format!("{format:?}:").as_bytes());
                pdf.extend_from_slice(image);
                pdf.extend_from_slice(b"\n%%EOF");
                Ok(pdf)
            })
        }
    }

    struct BrokenEmbedder;

    impl PdfEmbedder for BrokenEmbedder {
        fn embed_image<'a>(&'a self, _image: &'a [u8], _format: ImageFormat) -> EmbedFuture<'a> {
            Box::pin(async { Err(UploadError::Embed("corrupt image".into())) })
        }
    }

    #[test]
    fn classify_known_types() {
        assert_eq!(classify_content_type("application/pdf"), Some(SourceKind::Pdf));
        assert_eq!(
            classify_content_type("image/png"),
            Some(SourceKind::Image(ImageFormat::Png))
        );
        assert_eq!(
            classify_content_type("image/jpeg"),
            Some(SourceKind::Image(ImageFormat::Jpeg))
        );
    }

    #[test]
    fn classify_ignores_case_and_parameters() {
        assert_eq!(
            classify_content_type("Application/PDF; charset=binary"),
            Some(SourceKind::Pdf)
        );
    }

    #[test]
    fn classify_unknown_types() {
        assert_eq!(classify_content_type("image/gif"), None);
        assert_eq!(classify_content_type("text/plain"), None);
        assert_eq!(classify_content_type(""), None);
    }

    #[test]
    fn detect_from_extension() {
        assert_eq!(detect_content_type(Path::new("a.pdf")), Some("application/pdf"));
        assert_eq!(detect_content_type(Path::new("B.PNG")), Some("image/png"));
        assert_eq!(detect_content_type(Path::new("c.jpg")), Some("image/jpeg"));
        assert_eq!(detect_content_type(Path::new("d.jpeg")), Some("image/jpeg"));
        assert_eq!(detect_content_type(Path::new("noext")), None);
    }

    #[test]
    fn converted_names() {
        assert_eq!(converted_file_name("photo.jpeg"), "photo.pdf");
        assert_eq!(converted_file_name("receipt.scan.png"), "receipt.scan.pdf");
        assert_eq!(converted_file_name("noext"), "noext.pdf");
        assert_eq!(converted_file_name(""), "document.pdf");
    }

    #[tokio::test]
    async fn pdf_passes_through() {
        let source = DocumentSource::pdf_only();
        let file = SelectedFile::new("doc.pdf", "application/pdf", b"%PDF-1.4 body".to_vec());

        let doc = source.prepare(file).await.unwrap();
        assert_eq!(doc.file_name, "doc.pdf");
        assert_eq!(doc.content_type, "application/pdf");
        assert_eq!(doc.bytes, b"%PDF-1.4 body");
        assert_eq!(doc.display_size, "13 Bytes");
    }

    #[tokio::test]
    async fn image_is_embedded() {
        let source = DocumentSource::with_embedder(Arc::new(FakeEmbedder));
        let file = SelectedFile::new("photo.png", "image/png", b"PNGDATA".to_vec());

        let doc = source.prepare(file).await.unwrap();
        assert_eq!(doc.file_name, "photo.pdf");
        assert_eq!(doc.content_type, "application/pdf");
        assert!(doc.bytes.starts_with(b"%PDF-1.7\nPng:PNGDATA"));
    }

    #[tokio::test]
    async fn image_without_embedder_fails() {
        let source = DocumentSource::pdf_only();
        let file = SelectedFile::new("photo.jpg", "image/jpeg", b"JPEG".to_vec());

        let err = source.prepare(file).await.unwrap_err();
        assert!(matches!(err, UploadError::NoEmbedder(_)));
    }

    #[tokio::test]
    async fn unsupported_type_fails() {
        let source = DocumentSource::with_embedder(Arc::new(FakeEmbedder));
        let file = SelectedFile::new("anim.gif", "image/gif", b"GIF89a".to_vec());

        let err = source.prepare(file).await.unwrap_err();
        assert!(matches!(err, UploadError::UnsupportedContentType(t) if t == "image/gif"));
    }

    #[tokio::test]
    async fn embedder_error_propagates() {
        let source = DocumentSource::with_embedder(Arc::new(BrokenEmbedder));
        let file = SelectedFile::new("photo.png", "image/png", b"x".to_vec());

        let err = source.prepare(file).await.unwrap_err();
        assert!(matches!(err, UploadError::Embed(_)));
    }

    #[tokio::test]
    async fn from_path_reads_and_detects() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.PDF");
        std::fs::write(&path, b"%PDF").unwrap();

        let file = SelectedFile::from_path(&path).await.unwrap();
        assert_eq!(file.name, "scan.PDF");
        assert_eq!(file.content_type, "application/pdf");
        assert_eq!(file.bytes, b"%PDF");
    }

    #[tokio::test]
    async fn from_path_missing_file() {
        let err = SelectedFile::from_path(Path::new("/nonexistent/scan.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::Io(_)));
    }
}
