// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::{Path, PathBuf};

use futures::StreamExt;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::filename::{content_type_essence, derive_filename, is_audio_mime};
use crate::error::DownloadError;
use crate::http::{ByteStream, HttpClient};
use crate::progress::{ProgressEvent, SharedProgressReporter};

/// Largest single write to disk
pub const CHUNK_SIZE: usize = 8192;

/// Downloads below this many bytes are flagged as suspicious
pub const SMALL_FILE_THRESHOLD: u64 = 10_000;

/// Suffix of the temporary file a body is streamed into
const PARTIAL_SUFFIX: &str = ".partial";

/// Per-run switches for the fetcher
#[derive(Debug, Clone, Copy)]
pub struct FetchOptions {
    /// Replace files that already exist at the output path
    pub overwrite: bool,
    /// Reject responses whose Content-Type is not `audio/*`
    pub validate_mime: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            overwrite: false,
            validate_mime: true,
        }
    }
}

/// Terminal result of processing one URL
#[derive(Debug)]
pub enum FetchOutcome {
    /// Content type was not audio; nothing was written
    Skipped { content_type: String },
    /// A file already exists at the output path and overwrite is off
    AlreadyExists { path: PathBuf },
    /// The body was written to `path`
    Succeeded {
        path: PathBuf,
        bytes_written: u64,
        /// Below [`SMALL_FILE_THRESHOLD`]; likely an error page rather than audio
        small_file: bool,
    },
    /// The request, the stream, or a file operation failed
    Failed(DownloadError),
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Succeeded { .. })
    }
}

/// Download a single URL into `dest_dir`
///
/// Never returns an error: every failure is folded into
/// [`FetchOutcome::Failed`] so a batch can carry on with the next URL.
pub async fn fetch_url<C: HttpClient>(
    client: &C,
    url: &str,
    dest_dir: &Path,
    options: &FetchOptions,
    reporter: &SharedProgressReporter,
) -> FetchOutcome {
    match try_fetch_url(client, url, dest_dir, options, reporter).await {
        Ok(outcome) => outcome,
        Err(e) => {
            debug!(url, error = %e, "download failed");
            FetchOutcome::Failed(e)
        }
    }
}

async fn try_fetch_url<C: HttpClient>(
    client: &C,
    url: &str,
    dest_dir: &Path,
    options: &FetchOptions,
    reporter: &SharedProgressReporter,
) -> Result<FetchOutcome, DownloadError> {
    debug!(url, "requesting");

    let response = client
        .get_stream(url)
        .await
        .map_err(|e| DownloadError::HttpFailed {
            url: url.to_string(),
            source: e,
        })?;

    if !response.is_success() {
        return Err(DownloadError::HttpStatus {
            url: url.to_string(),
            status: response.status,
        });
    }

    let mime = content_type_essence(response.content_type.as_deref());
    if options.validate_mime && !is_audio_mime(&mime) {
        debug!(url, content_type = %mime, "rejecting non-audio response");
        return Ok(FetchOutcome::Skipped { content_type: mime });
    }

    let filename = derive_filename(url, &mime);
    let path = dest_dir.join(&filename);

    if !options.overwrite && output_exists(&path).await? {
        debug!(path = %path.display(), "output exists, leaving it untouched");
        return Ok(FetchOutcome::AlreadyExists { path });
    }

    // A Content-Length of zero tells us nothing about the real size
    let total_bytes = response.content_length.filter(|&len| len > 0);

    reporter.report(ProgressEvent::DownloadStarting {
        url: url.to_string(),
        filename: filename.clone(),
        total_bytes,
    });

    let partial_path = dest_dir.join(format!("{}{}", filename, PARTIAL_SUFFIX));
    let bytes_written = match write_body(
        url,
        response.body,
        &partial_path,
        total_bytes.is_some(),
        reporter,
    )
    .await
    {
        Ok(bytes) => bytes,
        Err(e) => {
            let _ = tokio::fs::remove_file(&partial_path).await;
            reporter.report(ProgressEvent::DownloadAborted { filename });
            return Err(e);
        }
    };

    if let Err(e) = tokio::fs::rename(&partial_path, &path).await {
        let _ = tokio::fs::remove_file(&partial_path).await;
        reporter.report(ProgressEvent::DownloadAborted { filename });
        return Err(DownloadError::FinalizeFailed {
            from: partial_path,
            to: path,
            source: e,
        });
    }

    reporter.report(ProgressEvent::DownloadFinished {
        filename,
        bytes_written,
    });

    let small_file = bytes_written < SMALL_FILE_THRESHOLD;
    if small_file {
        debug!(path = %path.display(), bytes_written, "downloaded file is suspiciously small");
    }

    Ok(FetchOutcome::Succeeded {
        path,
        bytes_written,
        small_file,
    })
}

async fn output_exists(path: &Path) -> Result<bool, DownloadError> {
    tokio::fs::try_exists(path)
        .await
        .map_err(|e| DownloadError::ExistenceCheckFailed {
            path: path.to_path_buf(),
            source: e,
        })
}

/// Stream a response body into `path` in writes of at most [`CHUNK_SIZE`]
///
/// Returns the number of bytes written.
async fn write_body(
    url: &str,
    mut body: ByteStream,
    path: &Path,
    report_chunks: bool,
    reporter: &SharedProgressReporter,
) -> Result<u64, DownloadError> {
    let mut file = File::create(path)
        .await
        .map_err(|e| DownloadError::FileCreateFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = body.next().await {
        let chunk = chunk_result.map_err(|e| DownloadError::StreamFailed {
            url: url.to_string(),
            source: e,
        })?;

        for piece in chunk.chunks(CHUNK_SIZE) {
            file.write_all(piece)
                .await
                .map_err(|e| DownloadError::FileWriteFailed {
                    path: path.to_path_buf(),
                    source: e,
                })?;

            bytes_written += piece.len() as u64;

            if report_chunks {
                reporter.report(ProgressEvent::ChunkWritten {
                    bytes: piece.len() as u64,
                });
            }
        }
    }

    // Ensure all data is flushed to disk
    file.flush()
        .await
        .map_err(|e| DownloadError::FileWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    Ok(bytes_written)
}
