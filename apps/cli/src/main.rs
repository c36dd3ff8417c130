//! `pdfdrop`: upload local PDFs to a record.
//!
//! Maps flags onto [`UploaderConfig`], reads each file from disk and runs
//! them through the uploader one at a time. PNG and JPEG files are turned
//! into single-page PDFs first.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use pdfdrop_notify::LogNotifier;
use pdfdrop_transfer::format_human_size;
use pdfdrop_uploader::{
    DocumentSource, FileResult, FileStatus, HttpChunkSink, ImagePdfEmbedder, UploadEvent,
    Uploader, UploaderConfig,
};
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "pdfdrop", version, about)]
struct Args {
    /// JSON configuration file.
    #[arg(short, long, env = "PDFDROP_CONFIG", default_value = "pdfdrop.json")]
    config: PathBuf,

    /// Chunk-save endpoint; overrides the config file.
    #[arg(long, env = "PDFDROP_ENDPOINT")]
    endpoint: Option<String>,

    /// Bearer token for the endpoint; overrides the config file.
    #[arg(long, env = "PDFDROP_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    /// Record the files are attached to.
    #[arg(short, long)]
    parent_id: String,

    /// Per-chunk timeout in seconds; overrides the config file.
    #[arg(long)]
    chunk_timeout: Option<u64>,

    /// Files to upload, in order.
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run(Args::parse()).await {
        Ok(results) if results.iter().all(FileResult::is_uploaded) => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<Vec<FileResult>> {
    let mut config = UploaderConfig::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    if let Some(endpoint) = args.endpoint {
        config.endpoint = endpoint;
    }
    if let Some(token) = args.access_token {
        config.access_token = token;
    }
    if args.chunk_timeout.is_some() {
        config.chunk_timeout_secs = args.chunk_timeout;
    }

    let sink = HttpChunkSink::from_config(&config).context("creating HTTP client")?;
    let documents = DocumentSource::with_embedder(Arc::new(ImagePdfEmbedder));
    let mut uploader =
        Uploader::new(config, args.parent_id, documents).context("invalid configuration")?;

    let forwarder = uploader.take_events().map(|mut rx| {
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                report_event(&event);
            }
        })
    });

    let results = uploader
        .upload_paths(&args.files, &sink, &LogNotifier)
        .await;

    // Dropping the uploader closes the channel so the forwarder drains and exits.
    drop(uploader);
    finish_forwarder(forwarder).await;

    for result in &results {
        print_result(result);
    }
    Ok(results)
}

/// Waits for the event forwarder; returns `false` if it panicked or was
/// cancelled.
async fn finish_forwarder(forwarder: Option<JoinHandle<()>>) -> bool {
    let Some(handle) = forwarder else {
        return true;
    };
    match handle.await {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!(error = %e, "event forwarder ended abnormally");
            false
        }
    }
}

fn report_event(event: &UploadEvent) {
    match event {
        UploadEvent::Started { file_name } => eprintln!("{file_name}: uploading"),
        UploadEvent::ChunkSent {
            file_name,
            index,
            total_chunks,
            sent_chars,
            total_chars,
        } => eprintln!(
            "{file_name}: chunk {}/{total_chunks} ({} of {})",
            index + 1,
            format_human_size(*sent_chars as u64, 2),
            format_human_size(*total_chars as u64, 2),
        ),
        _ => {}
    }
}

fn print_result(result: &FileResult) {
    let size = result.display_size.as_deref().unwrap_or("-");
    match &result.status {
        FileStatus::Uploaded { record_id, chunks } => {
            println!("ok       {} ({size}) -> {record_id} in {chunks} chunk(s)", result.file_name);
        }
        FileStatus::Rejected { actual, max } => {
            println!(
                "rejected {} ({size}): {actual} bytes exceeds {max}",
                result.file_name
            );
        }
        FileStatus::Failed { error } => {
            println!("failed   {}: {error}", result.file_name);
        }
    }
}
