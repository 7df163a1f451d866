// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::Path;

use url::Url;

/// Name used when the URL has no usable last path segment
pub const DEFAULT_FILENAME: &str = "audio";

/// Content types accepted when MIME validation is enabled start with this
pub const AUDIO_MIME_PREFIX: &str = "audio/";

/// Reduce a Content-Type header to its bare media type
///
/// `audio/mpeg; charset=binary` becomes `audio/mpeg`. A missing header yields
/// an empty string.
pub fn content_type_essence(header: Option<&str>) -> String {
    header
        .and_then(|value| value.split(';').next())
        .map(str::trim)
        .unwrap_or("")
        .to_string()
}

/// Check whether a media type belongs to the audio family
pub fn is_audio_mime(mime: &str) -> bool {
    mime.starts_with(AUDIO_MIME_PREFIX)
}

/// Take the last path segment of a URL as a filename
///
/// Query string and fragment are not part of the name. Characters that are
/// not allowed in filenames are stripped; an empty result falls back to
/// [`DEFAULT_FILENAME`].
pub fn filename_from_url(url: &str) -> String {
    let segment = match Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .unwrap_or("")
            .to_string(),
        Err(_) => raw_last_segment(url).to_string(),
    };

    let sanitized = sanitize_filename::sanitize(&segment);
    if sanitized.is_empty() || sanitized == "." || sanitized == ".." {
        DEFAULT_FILENAME.to_string()
    } else {
        sanitized
    }
}

/// Last segment of something that did not parse as a URL
fn raw_last_segment(url: &str) -> &str {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    let path = &url[..end];
    path.rsplit('/').next().unwrap_or("")
}

/// Whether a filename already carries an extension
///
/// Leading dots do not count, so `.hidden` has none.
fn has_extension(name: &str) -> bool {
    Path::new(name).extension().is_some()
}

/// Map MIME types to file extensions
///
/// Audio types come first; the rest covers what servers commonly send for
/// audio-bearing or unlabelled content when validation is turned off.
pub fn extension_for_mime(mime: &str) -> Option<&'static str> {
    match mime.to_lowercase().as_str() {
        "audio/mpeg" | "audio/mp3" | "audio/mpeg3" | "audio/x-mpeg-3" => Some("mp3"),
        "audio/mp4" | "audio/m4a" | "audio/x-m4a" => Some("m4a"),
        "audio/aac" | "audio/x-aac" | "audio/aacp" => Some("aac"),
        "audio/ogg" | "audio/vorbis" => Some("ogg"),
        "audio/opus" => Some("opus"),
        "audio/wav" | "audio/x-wav" | "audio/wave" | "audio/vnd.wave" => Some("wav"),
        "audio/flac" | "audio/x-flac" => Some("flac"),
        "audio/webm" => Some("weba"),
        "audio/aiff" | "audio/x-aiff" => Some("aif"),
        "audio/basic" => Some("au"),
        "audio/midi" | "audio/x-midi" => Some("mid"),
        "audio/x-ms-wma" => Some("wma"),
        "audio/amr" => Some("amr"),
        "audio/3gpp" => Some("3gp"),
        "audio/x-matroska" => Some("mka"),
        "application/ogg" => Some("ogx"),
        "application/octet-stream" => Some("bin"),
        "video/mp4" => Some("mp4"),
        "video/webm" => Some("webm"),
        "video/ogg" => Some("ogv"),
        "video/mpeg" => Some("mpg"),
        "video/quicktime" => Some("mov"),
        "video/x-msvideo" => Some("avi"),
        "video/x-matroska" => Some("mkv"),
        "video/3gpp" => Some("3gp"),
        "application/zip" => Some("zip"),
        "application/json" => Some("json"),
        "application/xml" | "text/xml" => Some("xml"),
        "text/html" => Some("html"),
        "text/plain" => Some("txt"),
        _ => None,
    }
}

/// Derive the local filename for a download
///
/// Uses the URL's last path segment as-is when it has an extension. Without
/// one, the extension mapped from `mime` is appended if the mapping knows it.
pub fn derive_filename(url: &str, mime: &str) -> String {
    let name = filename_from_url(url);
    if has_extension(&name) {
        return name;
    }

    match extension_for_mime(mime) {
        Some(ext) => format!("{}.{}", name, ext),
        None => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // === Content type tests ===

    #[test]
    fn essence_strips_parameters() {
        assert_eq!(
            content_type_essence(Some("audio/mpeg; charset=binary")),
            "audio/mpeg"
        );
    }

    #[test]
    fn essence_trims_whitespace() {
        assert_eq!(content_type_essence(Some("  audio/ogg  ")), "audio/ogg");
    }

    #[test]
    fn essence_of_missing_header_is_empty() {
        assert_eq!(content_type_essence(None), "");
    }

    #[test]
    fn audio_prefix_is_required() {
        assert!(is_audio_mime("audio/mpeg"));
        assert!(is_audio_mime("audio/x-wav"));
        assert!(!is_audio_mime("text/html"));
        assert!(!is_audio_mime("application/octet-stream"));
        assert!(!is_audio_mime("video/mp4"));
        assert!(!is_audio_mime(""));
        assert!(!is_audio_mime("audio"));
    }

    // === URL segment tests ===

    #[test]
    fn takes_last_path_segment() {
        assert_eq!(filename_from_url("https://host/a/b/track1.mp3"), "track1.mp3");
    }

    #[test]
    fn ignores_query_and_fragment() {
        assert_eq!(
            filename_from_url("https://host/track1.mp3?token=abc#t=3"),
            "track1.mp3"
        );
    }

    #[test]
    fn trailing_slash_falls_back_to_default() {
        assert_eq!(filename_from_url("https://host/music/"), DEFAULT_FILENAME);
    }

    #[test]
    fn bare_host_falls_back_to_default() {
        assert_eq!(filename_from_url("https://host"), DEFAULT_FILENAME);
    }

    #[test]
    fn unparseable_url_uses_raw_segment() {
        assert_eq!(filename_from_url("host/dir/song.ogg?x=1"), "song.ogg");
        assert_eq!(filename_from_url("nothing-here/"), DEFAULT_FILENAME);
    }

    // === Extension tests ===

    #[test]
    fn detects_extensions() {
        assert!(has_extension("track.mp3"));
        assert!(has_extension("archive.tar.gz"));
        assert!(!has_extension("track"));
        assert!(!has_extension(".hidden"));
    }

    #[test]
    fn maps_common_audio_types() {
        assert_eq!(extension_for_mime("audio/mpeg"), Some("mp3"));
        assert_eq!(extension_for_mime("audio/mp4"), Some("m4a"));
        assert_eq!(extension_for_mime("audio/ogg"), Some("ogg"));
        assert_eq!(extension_for_mime("audio/flac"), Some("flac"));
        assert_eq!(extension_for_mime("audio/x-wav"), Some("wav"));
        assert_eq!(extension_for_mime("AUDIO/MPEG"), Some("mp3"));
    }

    #[test]
    fn maps_common_non_audio_types() {
        assert_eq!(extension_for_mime("video/mp4"), Some("mp4"));
        assert_eq!(extension_for_mime("video/webm"), Some("webm"));
        assert_eq!(extension_for_mime("application/ogg"), Some("ogx"));
        assert_eq!(extension_for_mime("application/octet-stream"), Some("bin"));
        assert_eq!(extension_for_mime("text/html"), Some("html"));
    }

    #[test]
    fn unknown_types_have_no_extension() {
        assert_eq!(extension_for_mime("audio/x-unknown"), None);
        assert_eq!(extension_for_mime("application/x-made-up"), None);
        assert_eq!(extension_for_mime(""), None);
    }

    // === Full filename tests ===

    #[test]
    fn keeps_url_extension_regardless_of_mime() {
        assert_eq!(derive_filename("https://host/track1.mp3", "audio/ogg"), "track1.mp3");
        assert_eq!(derive_filename("https://host/track1.mp3", ""), "track1.mp3");
    }

    #[test]
    fn appends_extension_from_mime() {
        assert_eq!(derive_filename("https://host/track", "audio/mpeg"), "track.mp3");
    }

    #[test]
    fn leaves_name_alone_for_unknown_mime() {
        assert_eq!(derive_filename("https://host/track", "audio/x-unknown"), "track");
        assert_eq!(derive_filename("https://host/track", ""), "track");
    }

    #[test]
    fn appends_extension_for_non_audio_mime() {
        assert_eq!(derive_filename("https://host/clip", "video/mp4"), "clip.mp4");
        assert_eq!(derive_filename("https://host/clip", "application/ogg"), "clip.ogx");
        assert_eq!(
            derive_filename("https://host/clip", "application/octet-stream"),
            "clip.bin"
        );
    }

    #[test]
    fn default_name_gets_mime_extension() {
        assert_eq!(derive_filename("https://host/", "audio/flac"), "audio.flac");
    }
}
