mod download;
mod filename;

pub use download::{CHUNK_SIZE, FetchOptions, FetchOutcome, SMALL_FILE_THRESHOLD, fetch_url};
pub use filename::{
    AUDIO_MIME_PREFIX, DEFAULT_FILENAME, content_type_essence, derive_filename,
    extension_for_mime, filename_from_url, is_audio_mime,
};
