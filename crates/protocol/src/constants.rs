/// Largest raw (pre-encoding) document accepted for upload, in bytes.
pub const MAX_FILE_SIZE: u64 = 4_500_000;

/// Number of base64 characters sent per chunk.
///
/// Measured on the encoded text, before percent-encoding.
pub const CHUNK_SIZE: usize = 750_000;

/// Content type of every uploaded document.
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// PNG source images, converted before upload.
pub const PNG_CONTENT_TYPE: &str = "image/png";

/// JPEG source images, converted before upload.
pub const JPEG_CONTENT_TYPE: &str = "image/jpeg";
