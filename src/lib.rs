pub mod collect;
pub mod error;
pub mod fetch;
pub mod http;
pub mod logging;
pub mod progress;

// Re-export main types for convenience
pub use collect::{
    collect_urls, dedup_preserving_order, ensure_dest_dir, parse_url_list, read_url_file,
};
pub use error::{CollectError, DownloadError};
pub use fetch::{FetchOptions, FetchOutcome, derive_filename, fetch_url};
pub use http::{HttpClient, HttpResponse, REQUEST_TIMEOUT, ReqwestClient};
pub use progress::{NoopReporter, ProgressEvent, ProgressReporter, SharedProgressReporter};
