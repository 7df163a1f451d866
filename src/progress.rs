// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::sync::Arc;

/// Events emitted while a single URL is streamed to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// The body is about to be written
    DownloadStarting {
        url: String,
        filename: String,
        /// Expected size in bytes; `None` when the server did not announce a
        /// usable Content-Length
        total_bytes: Option<u64>,
    },

    /// A chunk of `bytes` was written. Only emitted when the total is known.
    ChunkWritten { bytes: u64 },

    /// The body was fully written and moved into place
    DownloadFinished { filename: String, bytes_written: u64 },

    /// Streaming stopped early
    DownloadAborted { filename: String },
}

/// Trait for reporting download progress.
///
/// Implementations can use this to display progress bars, log messages,
/// or collect statistics.
pub trait ProgressReporter: Send + Sync {
    /// Report a progress event
    fn report(&self, event: ProgressEvent);
}

/// A shared reference to a progress reporter
pub type SharedProgressReporter = Arc<dyn ProgressReporter>;

/// A no-op progress reporter that silently ignores all events.
/// Useful for tests or quiet mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn report(&self, _event: ProgressEvent) {}
}

impl NoopReporter {
    /// Create a new NoopReporter wrapped in an Arc
    pub fn shared() -> SharedProgressReporter {
        Arc::new(Self)
    }
}
