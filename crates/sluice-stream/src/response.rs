use serde::{Deserialize, Serialize};

use crate::header::HeaderMap;

/// HTTP protocol version of a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpVersion {
    Http09,
    Http10,
    Http11,
    H2,
    H3,
}

impl std::fmt::Display for HttpVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            HttpVersion::Http09 => "HTTP/0.9",
            HttpVersion::Http10 => "HTTP/1.0",
            HttpVersion::Http11 => "HTTP/1.1",
            HttpVersion::H2 => "HTTP/2",
            HttpVersion::H3 => "HTTP/3",
        };
        f.write_str(s)
    }
}

/// Response metadata, available before the body finishes streaming.
///
/// Immutable once constructed. Duplicate header names are collapsed to
/// a single entry with values joined by `", "` — the script layer sees
/// one value per name. The body is never part of the head; it is
/// delivered separately through a sink, which is what enables streaming
/// consumption before the full body lands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseHead {
    status: u16,
    version: HttpVersion,
    headers: HeaderMap,
}

impl ResponseHead {
    /// Build a head, joining duplicate header values.
    pub fn new(status: u16, version: HttpVersion, headers: HeaderMap) -> Self {
        Self {
            status,
            version,
            headers: headers.joined(),
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn version(&self) -> HttpVersion {
        self.version
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
