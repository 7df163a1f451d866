// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::HashSet;
use std::path::Path;

use crate::error::CollectError;

/// Lines starting with this marker are ignored in URL list files
pub const COMMENT_MARKER: char = '#';

/// Extract URLs from a newline-delimited list
///
/// Every line is trimmed; blank lines and comment lines are dropped. No URL
/// validation happens here.
pub fn parse_url_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with(COMMENT_MARKER))
        .map(String::from)
        .collect()
}

/// Read a URL list file from disk
pub fn read_url_file(path: &Path) -> Result<Vec<String>, CollectError> {
    let text = std::fs::read_to_string(path).map_err(|e| CollectError::InputReadFailed {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(parse_url_list(&text))
}

/// Remove exact duplicates, keeping the first occurrence of each URL
pub fn dedup_preserving_order<I>(urls: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    urls.into_iter()
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

/// Merge URLs from an optional list file and direct arguments
///
/// File URLs come first, direct URLs follow in the order given.
pub fn collect_urls(input: Option<&Path>, direct: &[String]) -> Result<Vec<String>, CollectError> {
    let from_file = match input {
        Some(path) => read_url_file(path)?,
        None => Vec::new(),
    };

    Ok(dedup_preserving_order(
        from_file.into_iter().chain(direct.iter().cloned()),
    ))
}

/// Create the destination directory and any missing parents
pub fn ensure_dest_dir(dest: &Path) -> Result<(), CollectError> {
    std::fs::create_dir_all(dest).map_err(|e| CollectError::CreateDirectoryFailed {
        path: dest.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_skips_blank_and_comment_lines() {
        let text = "\n# a comment\nhttps://a.example/1.mp3\n\n   \n  # indented comment\nhttps://a.example/2.mp3\n";
        assert_eq!(
            parse_url_list(text),
            strings(&["https://a.example/1.mp3", "https://a.example/2.mp3"])
        );
    }

    #[test]
    fn parse_trims_surrounding_whitespace() {
        let text = "  https://a.example/1.mp3\t\r\n";
        assert_eq!(parse_url_list(text), strings(&["https://a.example/1.mp3"]));
    }

    #[test]
    fn parse_keeps_hash_inside_url() {
        let text = "https://a.example/1.mp3#t=10";
        assert_eq!(parse_url_list(text), strings(&["https://a.example/1.mp3#t=10"]));
    }

    #[test]
    fn parse_does_not_validate_urls() {
        assert_eq!(parse_url_list("not a url"), strings(&["not a url"]));
    }

    #[test]
    fn dedup_keeps_first_occurrence_order() {
        let urls = strings(&["b", "a", "b", "c", "a", "b"]);
        assert_eq!(dedup_preserving_order(urls), strings(&["b", "a", "c"]));
    }

    #[test]
    fn dedup_uses_exact_string_equality() {
        let urls = strings(&[
            "https://a.example/x.mp3",
            "HTTPS://a.example/x.mp3",
            "https://a.example/x.mp3/",
        ]);
        assert_eq!(dedup_preserving_order(urls.clone()), urls);
    }

    #[test]
    fn collect_puts_file_urls_before_direct_urls() {
        let dir = tempdir().unwrap();
        let list = dir.path().join("urls.txt");
        std::fs::write(&list, "# list\nhttps://a.example/1.mp3\nhttps://a.example/2.mp3\n").unwrap();

        let direct = strings(&["https://a.example/3.mp3", "https://a.example/1.mp3"]);
        let urls = collect_urls(Some(&list), &direct).unwrap();

        assert_eq!(
            urls,
            strings(&[
                "https://a.example/1.mp3",
                "https://a.example/2.mp3",
                "https://a.example/3.mp3",
            ])
        );
    }

    #[test]
    fn collect_without_file_uses_direct_urls() {
        let direct = strings(&["https://a.example/1.mp3", "https://a.example/1.mp3"]);
        assert_eq!(
            collect_urls(None, &direct).unwrap(),
            strings(&["https://a.example/1.mp3"])
        );
    }

    #[test]
    fn collect_with_nothing_is_empty() {
        assert!(collect_urls(None, &[]).unwrap().is_empty());
    }

    #[test]
    fn collect_reports_missing_file() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.txt");

        match collect_urls(Some(&missing), &[]) {
            Err(CollectError::InputReadFailed { path, .. }) => assert_eq!(path, missing),
            other => panic!("Expected InputReadFailed, got {:?}", other),
        }
    }

    #[test]
    fn ensure_dest_dir_creates_nested_directories() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("assets").join("audio");

        ensure_dest_dir(&dest).unwrap();
        assert!(dest.is_dir());

        // Existing directory is fine
        ensure_dest_dir(&dest).unwrap();
    }
}
