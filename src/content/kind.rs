//! Content kinds and the typed item value.

use std::fmt;

use serde_json::Value;

pub const CONTENT_TYPE_STRING: &str = "text/plain; charset=utf-8";
pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_BLOB: &str = "application/octet-stream";

/// The three payload shapes an item can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentKind {
    #[default]
    String,
    Json,
    Blob,
}

impl ContentKind {
    /// Kind of an incoming body, from its `Content-Type` header.
    ///
    /// Unknown or missing media types are read as strings.
    pub fn from_content_type(header: Option<&str>) -> Self {
        header
            .and_then(|value| Self::from_media_type(media_type(value)))
            .unwrap_or_default()
    }

    /// Representation asked for by an `Accept` header.
    ///
    /// Returns `None` when the client accepts anything, meaning the stored
    /// kind is served as-is.
    pub fn from_accept(header: Option<&str>) -> Option<Self> {
        header?
            .split(',')
            .map(media_type)
            .find_map(Self::from_media_type)
    }

    fn from_media_type(media: &str) -> Option<Self> {
        if media.eq_ignore_ascii_case(CONTENT_TYPE_JSON) {
            Some(Self::Json)
        } else if media.eq_ignore_ascii_case(CONTENT_TYPE_BLOB) {
            Some(Self::Blob)
        } else if media.eq_ignore_ascii_case("text/plain") {
            Some(Self::String)
        } else {
            None
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::String => CONTENT_TYPE_STRING,
            Self::Json => CONTENT_TYPE_JSON,
            Self::Blob => CONTENT_TYPE_BLOB,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Json => "json",
            Self::Blob => "blob",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strip parameters (`; charset=...`) and quality weights from a media range.
fn media_type(value: &str) -> &str {
    value.split(';').next().unwrap_or_default().trim()
}

/// An item value: exactly one of the three kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredValue {
    String(String),
    Json(Value),
    Blob(Vec<u8>),
}

impl StoredValue {
    pub fn kind(&self) -> ContentKind {
        match self {
            Self::String(_) => ContentKind::String,
            Self::Json(_) => ContentKind::Json,
            Self::Blob(_) => ContentKind::Blob,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_classification() {
        assert_eq!(ContentKind::from_content_type(None), ContentKind::String);
        assert_eq!(
            ContentKind::from_content_type(Some("application/json; charset=utf-8")),
            ContentKind::Json
        );
        assert_eq!(
            ContentKind::from_content_type(Some("Application/Octet-Stream")),
            ContentKind::Blob
        );
        assert_eq!(
            ContentKind::from_content_type(Some("application/x-www-form-urlencoded")),
            ContentKind::String
        );
    }

    #[test]
    fn test_accept_classification() {
        assert_eq!(ContentKind::from_accept(None), None);
        assert_eq!(ContentKind::from_accept(Some("*/*")), None);
        assert_eq!(
            ContentKind::from_accept(Some("text/html, application/json;q=0.9")),
            Some(ContentKind::Json)
        );
        assert_eq!(
            ContentKind::from_accept(Some("text/plain")),
            Some(ContentKind::String)
        );
    }
}
