//! Data types for the upload flow.

/// Progress event emitted while files are processed.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadEvent {
    /// Work on a file began; a front-end shows its busy indicator.
    Started { file_name: String },
    /// The document is ready and its size is known.
    Prepared {
        file_name: String,
        display_size: String,
    },
    /// One chunk was accepted by the remote side.
    ChunkSent {
        file_name: String,
        index: usize,
        total_chunks: usize,
        sent_chars: usize,
        total_chars: usize,
    },
    Completed {
        file_name: String,
        record_id: String,
    },
    /// Refused by the size limit; nothing was sent.
    Rejected {
        file_name: String,
        display_size: String,
    },
    Failed { file_name: String, error: String },
}

impl UploadEvent {
    pub fn file_name(&self) -> &str {
        match self {
            UploadEvent::Started { file_name }
            | UploadEvent::Prepared { file_name, .. }
            | UploadEvent::ChunkSent { file_name, .. }
            | UploadEvent::Completed { file_name, .. }
            | UploadEvent::Rejected { file_name, .. }
            | UploadEvent::Failed { file_name, .. } => file_name,
        }
    }

    /// Returns `true` for the last event of a file.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            UploadEvent::Completed { .. }
                | UploadEvent::Rejected { .. }
                | UploadEvent::Failed { .. }
        )
    }
}

/// How one file ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    Uploaded { record_id: String, chunks: usize },
    Rejected { actual: u64, max: u64 },
    Failed { error: String },
}

/// Result for a single file of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileResult {
    /// Name the file was selected under.
    pub file_name: String,
    /// Size of the prepared document, if it got that far.
    pub display_size: Option<String>,
    pub status: FileStatus,
}

impl FileResult {
    pub fn is_uploaded(&self) -> bool {
        matches!(self.status, FileStatus::Uploaded { .. })
    }
}
