//! Sequential multi-file uploader.
//!
//! Files are processed strictly in the order given. Each one runs to its
//! own terminal state (uploaded, rejected or failed) before the next one
//! starts; a failure never stops the rest of the batch.

use std::path::Path;

use pdfdrop_notify::{Notification, NotificationSink};
use pdfdrop_transfer::{
    ChunkMetadata, ChunkSink, SizeLimitExceeded, TransferEngine, UploadOutcome,
    validate_file_name,
};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::config::UploaderConfig;
use crate::document::{DocumentSource, SelectedFile};
use crate::error::UploadError;
use crate::types::{FileResult, FileStatus, UploadEvent};

/// Event channel capacity.
const EVENT_BUFFER: usize = 256;

/// Uploads selected files as attachments of one parent record.
pub struct Uploader {
    config: UploaderConfig,
    parent_id: String,
    documents: DocumentSource,
    events_tx: mpsc::Sender<UploadEvent>,
    events_rx: Option<mpsc::Receiver<UploadEvent>>,
}

impl Uploader {
    /// Creates an uploader after validating `config`.
    pub fn new(
        config: UploaderConfig,
        parent_id: impl Into<String>,
        documents: DocumentSource,
    ) -> Result<Self, UploadError> {
        config.validate()?;
        let (events_tx, events_rx) = mpsc::channel(EVENT_BUFFER);
        Ok(Self {
            config,
            parent_id: parent_id.into(),
            documents,
            events_tx,
            events_rx: Some(events_rx),
        })
    }

    /// Takes the event receiver. Can only be called once.
    ///
    /// Events are dropped, not queued, once the channel buffer is full.
    pub fn take_events(&mut self) -> Option<mpsc::Receiver<UploadEvent>> {
        self.events_rx.take()
    }

    pub fn config(&self) -> &UploaderConfig {
        &self.config
    }

    /// Uploads `files` one after another.
    ///
    /// Returns a result per file, in input order.
    pub async fn upload_files(
        &self,
        files: Vec<SelectedFile>,
        sink: &dyn ChunkSink,
        notifier: &dyn NotificationSink,
    ) -> Vec<FileResult> {
        let mut results = Vec::with_capacity(files.len());
        for file in files {
            let result = self.upload_file(file, sink, notifier).await;
            results.push(result);
        }
        results
    }

    /// Reads and uploads files from disk, one after another.
    ///
    /// Each file is read just before it is uploaded. A file that cannot be
    /// read is reported as failed in its own position and the rest still
    /// upload.
    pub async fn upload_paths<P: AsRef<Path>>(
        &self,
        paths: &[P],
        sink: &dyn ChunkSink,
        notifier: &dyn NotificationSink,
    ) -> Vec<FileResult> {
        let mut results = Vec::with_capacity(paths.len());
        for path in paths {
            let path = path.as_ref();
            let result = match SelectedFile::from_path(path).await {
                Ok(file) => self.upload_file(file, sink, notifier).await,
                Err(e) => {
                    let name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| path.display().to_string());
                    self.emit(UploadEvent::Started {
                        file_name: name.clone(),
                    });
                    self.fail(&name, None, e, notifier)
                }
            };
            results.push(result);
        }
        results
    }

    /// Runs one file through prepare, size check and chunked upload.
    pub async fn upload_file(
        &self,
        file: SelectedFile,
        sink: &dyn ChunkSink,
        notifier: &dyn NotificationSink,
    ) -> FileResult {
        let file_name = file.name.clone();
        self.emit(UploadEvent::Started {
            file_name: file_name.clone(),
        });

        if let Err(e) = validate_file_name(&file_name) {
            return self.fail(&file_name, None, UploadError::from(e), notifier);
        }

        let document = match self.documents.prepare(file).await {
            Ok(doc) => doc,
            Err(e) => return self.fail(&file_name, None, e, notifier),
        };
        let display_size = document.display_size.clone();
        self.emit(UploadEvent::Prepared {
            file_name: file_name.clone(),
            display_size: display_size.clone(),
        });

        let engine = match TransferEngine::new(sink, self.config.chunk_size) {
            Ok(engine) => engine.with_chunk_timeout(self.config.chunk_timeout()),
            Err(e) => {
                return self.fail(&file_name, Some(display_size), e.into(), notifier);
            }
        };

        let metadata = ChunkMetadata {
            parent_id: self.parent_id.clone(),
            file_name: document.file_name.clone(),
            content_type: document.content_type.clone(),
        };

        let events_tx = self.events_tx.clone();
        let progress_name = file_name.clone();
        let outcome = engine
            .upload_payload(
                &document.bytes,
                self.config.max_file_size,
                &metadata,
                move |p| {
                    // Progress is best effort; a full channel drops the update.
                    let _ = events_tx.try_send(UploadEvent::ChunkSent {
                        file_name: progress_name.clone(),
                        index: p.index,
                        total_chunks: p.total_chunks,
                        sent_chars: p.sent_chars,
                        total_chars: p.total_chars,
                    });
                },
            )
            .await;

        match outcome {
            UploadOutcome::Success { record_id, chunks } => {
                info!(
                    file = %file_name,
                    record = %record_id,
                    size = %display_size,
                    "file uploaded"
                );
                notifier.notify(Notification::success("Success!", "File Upload Success"));
                self.emit(UploadEvent::Completed {
                    file_name: file_name.clone(),
                    record_id: record_id.to_string(),
                });
                FileResult {
                    file_name,
                    display_size: Some(display_size),
                    status: FileStatus::Uploaded {
                        record_id: record_id.into_string(),
                        chunks,
                    },
                }
            }
            UploadOutcome::Rejected(limit) => {
                warn!(
                    file = %file_name,
                    actual = limit.actual,
                    max = limit.max,
                    "file exceeds size limit"
                );
                notifier.notify(Notification::error("Error", size_limit_message(&limit)));
                self.emit(UploadEvent::Rejected {
                    file_name: file_name.clone(),
                    display_size: display_size.clone(),
                });
                FileResult {
                    file_name,
                    display_size: Some(display_size),
                    status: FileStatus::Rejected {
                        actual: limit.actual,
                        max: limit.max,
                    },
                }
            }
            UploadOutcome::Failed(e) => {
                self.fail(&file_name, Some(display_size), e.into(), notifier)
            }
        }
    }

    fn fail(
        &self,
        file_name: &str,
        display_size: Option<String>,
        err: UploadError,
        notifier: &dyn NotificationSink,
    ) -> FileResult {
        let message = err.to_string();
        error!(file = %file_name, error = %message, "file upload failed");
        notifier.notify(Notification::error(
            "Error",
            format!("File upload failed: {message}"),
        ));
        self.emit(UploadEvent::Failed {
            file_name: file_name.to_string(),
            error: message.clone(),
        });
        FileResult {
            file_name: file_name.to_string(),
            display_size,
            status: FileStatus::Failed { error: message },
        }
    }

    fn emit(&self, event: UploadEvent) {
        // Never block the upload on a receiver nobody drains.
        if let Err(mpsc::error::TrySendError::Full(event)) = self.events_tx.try_send(event) {
            debug!(file = %event.file_name(), "event channel full, dropping event");
        }
    }
}

/// User-facing text for a size-limit rejection.
pub fn size_limit_message(limit: &SizeLimitExceeded) -> String {
    format!(
        "File size cannot exceed {} bytes.\nSelected file size: {}",
        limit.max, limit.actual
    )
}
