//! Where an image comes from: a local file, a remote URL, or a data URI.
//!
//! [`ImageSource::fetch`] resolves any of them to raw bytes plus the basename
//! used for every exported file.
//!
//! ## Basenames
//!
//! The basename is the last path segment with everything from the first `.`
//! removed, so `photos/2024/sunset.final.jpg` becomes `sunset`. Backslashes
//! count as separators. URLs use the final (post-redirect) URL with query and
//! fragment ignored. Data URIs, and anything that would leave an empty name,
//! fall back to [`DEFAULT_BASENAME`].

use base64::Engine;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

pub const DEFAULT_BASENAME: &str = "image";

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("malformed data URI: {0}")]
    DataUri(String),
}

/// An image input as given by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    File(PathBuf),
    Url(String),
    DataUri(String),
}

/// Raw bytes plus the basename derived from the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedImage {
    pub bytes: Vec<u8>,
    pub basename: String,
}

impl ImageSource {
    /// Classify an input string. Never fails; unknown input is a file path.
    pub fn parse(input: &str) -> Self {
        let lower = input.trim_start().to_ascii_lowercase();
        if lower.starts_with("data:") {
            ImageSource::DataUri(input.trim().to_string())
        } else if lower.starts_with("http://") || lower.starts_with("https://") {
            ImageSource::Url(input.trim().to_string())
        } else {
            ImageSource::File(PathBuf::from(input))
        }
    }

    /// Resolve to bytes. Blocking for URLs.
    pub fn fetch(&self) -> Result<FetchedImage, SourceError> {
        match self {
            ImageSource::File(path) => {
                info!(path = %path.display(), "loading local file");
                let bytes = std::fs::read(path).map_err(|source| SourceError::Read {
                    path: path.clone(),
                    source,
                })?;
                Ok(FetchedImage {
                    bytes,
                    basename: basename_from_path(&path.to_string_lossy()),
                })
            }
            ImageSource::Url(url) => fetch_url(url),
            ImageSource::DataUri(uri) => Ok(FetchedImage {
                bytes: decode_data_uri(uri)?,
                basename: DEFAULT_BASENAME.to_string(),
            }),
        }
    }
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageSource::File(path) => write!(f, "{}", path.display()),
            ImageSource::Url(url) => f.write_str(url),
            ImageSource::DataUri(uri) => {
                let header = uri.split(',').next().unwrap_or("data:");
                write!(f, "{header},…")
            }
        }
    }
}

fn fetch_url(url: &str) -> Result<FetchedImage, SourceError> {
    let fetch_err = |source| SourceError::Fetch {
        url: url.to_string(),
        source,
    };
    info!(%url, "loading remote image");

    let response = reqwest::blocking::get(url)
        .and_then(|r| r.error_for_status())
        .map_err(fetch_err)?;
    let final_url = response.url().clone();
    let bytes = response.bytes().map_err(fetch_err)?;
    info!(bytes = bytes.len(), final_url = %final_url, "remote image loaded");

    Ok(FetchedImage {
        bytes: bytes.to_vec(),
        basename: basename_from_url(final_url.as_str()),
    })
}

/// Basename of a filesystem-style path.
pub fn basename_from_path(path: &str) -> String {
    let normalized = path.replace('\\', "/");
    let last = normalized.rsplit('/').next().unwrap_or("");
    let stem = last.split('.').next().unwrap_or("");
    if stem.is_empty() {
        DEFAULT_BASENAME.to_string()
    } else {
        stem.to_string()
    }
}

/// Basename of a URL's final path segment.
pub fn basename_from_url(url: &str) -> String {
    let without_fragment = url.split('#').next().unwrap_or(url);
    let path = without_fragment.split('?').next().unwrap_or(without_fragment);
    let path = path.split_once("://").map_or(path, |(_, rest)| {
        // Drop the authority so a bare host never becomes the basename
        rest.split_once('/').map_or("", |(_, p)| p)
    });
    basename_from_path(path)
}

/// Decode a `data:<mime>;base64,<payload>` URI.
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>, SourceError> {
    let rest = match uri.get(..5) {
        Some(prefix) if prefix.eq_ignore_ascii_case("data:") => &uri[5..],
        _ => return Err(SourceError::DataUri("missing data: prefix".into())),
    };
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| SourceError::DataUri("missing ',' separator".into()))?;
    if !header.to_ascii_lowercase().ends_with(";base64") {
        return Err(SourceError::DataUri("only base64 payloads are supported".into()));
    }
    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| SourceError::DataUri(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn parse_classifies_inputs() {
        assert_eq!(
            ImageSource::parse("photos/a.jpg"),
            ImageSource::File(PathBuf::from("photos/a.jpg"))
        );
        assert!(matches!(
            ImageSource::parse("https://example.com/a.png"),
            ImageSource::Url(_)
        ));
        assert!(matches!(
            ImageSource::parse("HTTP://example.com/a.png"),
            ImageSource::Url(_)
        ));
        assert!(matches!(
            ImageSource::parse("data:image/png;base64,AAAA"),
            ImageSource::DataUri(_)
        ));
    }

    #[test]
    fn basename_strips_directories_and_extension() {
        assert_eq!(basename_from_path("photos/2024/sunset.jpg"), "sunset");
        assert_eq!(basename_from_path("sunset.png"), "sunset");
        assert_eq!(basename_from_path("C:\\Users\\me\\cat.jpeg"), "cat");
        assert_eq!(basename_from_path("noext"), "noext");
    }

    #[test]
    fn basename_cuts_at_first_dot() {
        assert_eq!(basename_from_path("sunset.final.jpg"), "sunset");
    }

    #[test]
    fn basename_falls_back_when_empty() {
        assert_eq!(basename_from_path(".hidden"), DEFAULT_BASENAME);
        assert_eq!(basename_from_path("dir/"), DEFAULT_BASENAME);
    }

    #[test]
    fn url_basename_ignores_query_and_fragment() {
        assert_eq!(
            basename_from_url("https://cdn.example.com/img/hero.webp?w=200#top"),
            "hero"
        );
        assert_eq!(basename_from_url("https://example.com"), DEFAULT_BASENAME);
        assert_eq!(basename_from_url("https://example.com/"), DEFAULT_BASENAME);
    }

    #[test]
    fn data_uri_decodes_base64() {
        let bytes = decode_data_uri("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(bytes, b"hello");
    }

    #[test]
    fn data_uri_requires_base64() {
        assert!(matches!(
            decode_data_uri("data:text/plain,hello"),
            Err(SourceError::DataUri(_))
        ));
        assert!(matches!(
            decode_data_uri("data:image/png;base64"),
            Err(SourceError::DataUri(_))
        ));
    }

    #[test]
    fn fetch_file_reads_bytes_and_basename() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("banner.v2.png");
        std::fs::write(&path, b"bytes").unwrap();

        let fetched = ImageSource::File(path).fetch().unwrap();
        assert_eq!(fetched.bytes, b"bytes");
        assert_eq!(fetched.basename, "banner");
    }

    #[test]
    fn fetch_missing_file_is_read_error() {
        let result = ImageSource::File(PathBuf::from("/nonexistent/x.png")).fetch();
        assert!(matches!(result, Err(SourceError::Read { .. })));
    }

    #[test]
    fn fetch_data_uri_uses_default_basename() {
        let fetched = ImageSource::parse("data:image/png;base64,aGk=")
            .fetch()
            .unwrap();
        assert_eq!(fetched.bytes, b"hi");
        assert_eq!(fetched.basename, DEFAULT_BASENAME);
    }
}
