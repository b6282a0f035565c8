//! Size ceilings and format-specific encode/decode.
//!
//! # Responsibilities
//! - Apply the per-kind byte ceiling to incoming bodies
//! - Decode bodies into a `StoredValue` (utf-8 strings, parsed JSON, raw blobs)
//! - Resolve a stored row into exactly one `StoredValue`
//! - Encode a value for the output kind a client asked for

use base64::Engine;
use serde_json::Value;

use crate::config::LimitsConfig;
use crate::content::kind::{ContentKind, StoredValue};

/// Errors raised while classifying, decoding or encoding item content.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContentError {
    #[error("{kind} payload of {size} bytes exceeds the {limit} byte ceiling")]
    TooLarge {
        kind: ContentKind,
        size: usize,
        limit: usize,
    },

    #[error("{message} at line: {line}, column: {column}, pos: {offset}")]
    MalformedJson {
        message: String,
        line: usize,
        column: usize,
        offset: usize,
    },

    #[error("Request body is not valid UTF-8")]
    InvalidUtf8,

    #[error("Request body contains a NUL character")]
    NulCharacter { kind: ContentKind },

    #[error("stored row has {populated} populated value columns, 1 expected")]
    AmbiguousRow { populated: usize },

    #[error("stored {kind} column is not decodable")]
    CorruptStoredValue { kind: ContentKind },

    #[error("blob items can not be served as json")]
    BlobAsJson,
}

impl ContentError {
    /// HTTP status this error surfaces as.
    pub fn status(&self) -> u16 {
        match self {
            Self::TooLarge { .. } | Self::BlobAsJson => 403,
            Self::MalformedJson { .. } | Self::InvalidUtf8 | Self::NulCharacter { .. } => 400,
            Self::AmbiguousRow { .. } | Self::CorruptStoredValue { .. } => 500,
        }
    }

    /// Message safe to hand to the client, if any beyond the status text.
    pub fn client_message(&self) -> Option<String> {
        match self {
            Self::TooLarge { .. } => Some("Request is too large".to_string()),
            Self::MalformedJson { .. } | Self::InvalidUtf8 | Self::NulCharacter { .. } => {
                Some(self.to_string())
            }
            Self::AmbiguousRow { .. } | Self::CorruptStoredValue { .. } | Self::BlobAsJson => None,
        }
    }
}

/// Ceiling configured for one kind.
pub fn ceiling(kind: ContentKind, limits: &LimitsConfig) -> usize {
    match kind {
        ContentKind::String => limits.string_size,
        ContentKind::Json => limits.json_size,
        ContentKind::Blob => limits.blob_size,
    }
}

/// Bound and decode an incoming body declared as `kind`.
pub fn classify_and_bound(
    body: &[u8],
    kind: ContentKind,
    limits: &LimitsConfig,
) -> Result<StoredValue, ContentError> {
    let limit = ceiling(kind, limits);
    if body.len() > limit {
        return Err(ContentError::TooLarge {
            kind,
            size: body.len(),
            limit,
        });
    }

    match kind {
        ContentKind::String => {
            let text = std::str::from_utf8(body).map_err(|_| ContentError::InvalidUtf8)?;
            if text.contains('\0') {
                return Err(ContentError::NulCharacter { kind });
            }
            Ok(StoredValue::String(text.to_owned()))
        }
        ContentKind::Json => {
            let doc = parse_json(body)?;
            if contains_nul(&doc) {
                return Err(ContentError::NulCharacter { kind });
            }
            Ok(StoredValue::Json(doc))
        }
        ContentKind::Blob => Ok(StoredValue::Blob(body.to_vec())),
    }
}

/// Text columns can not hold U+0000, in string values or object keys.
fn contains_nul(doc: &Value) -> bool {
    match doc {
        Value::String(s) => s.contains('\0'),
        Value::Array(items) => items.iter().any(contains_nul),
        Value::Object(map) => map.iter().any(|(k, v)| k.contains('\0') || contains_nul(v)),
        Value::Null | Value::Bool(_) | Value::Number(_) => false,
    }
}

fn parse_json(body: &[u8]) -> Result<Value, ContentError> {
    serde_json::from_slice(body).map_err(|err| {
        let line = err.line();
        let column = err.column();
        let text = err.to_string();
        let message = text
            .rsplit_once(" at line ")
            .map_or(text.as_str(), |(message, _)| message)
            .to_string();

        ContentError::MalformedJson {
            message,
            line,
            column,
            offset: byte_offset(body, line, column),
        }
    })
}

/// Byte offset of a 1-based `(line, column)` position reported by the parser.
fn byte_offset(body: &[u8], line: usize, column: usize) -> usize {
    let line_start: usize = body
        .split(|b| *b == b'\n')
        .take(line.saturating_sub(1))
        .map(|l| l.len() + 1)
        .sum();
    (line_start + column.saturating_sub(1)).min(body.len())
}

/// Resolve the `(string_val, json_val, blob_val)` columns of one row.
///
/// The single non-NULL column decides the kind. A row with every column NULL
/// reads as an empty string.
pub fn decode_columns(
    string_val: Option<Vec<u8>>,
    json_val: Option<Vec<u8>>,
    blob_val: Option<Vec<u8>>,
) -> Result<StoredValue, ContentError> {
    let populated = [&string_val, &json_val, &blob_val]
        .iter()
        .filter(|c| c.is_some())
        .count();
    if populated > 1 {
        return Err(ContentError::AmbiguousRow { populated });
    }

    if let Some(bytes) = string_val {
        return String::from_utf8(bytes)
            .map(StoredValue::String)
            .map_err(|_| ContentError::CorruptStoredValue {
                kind: ContentKind::String,
            });
    }
    if let Some(bytes) = json_val {
        return serde_json::from_slice(&bytes)
            .map(StoredValue::Json)
            .map_err(|_| ContentError::CorruptStoredValue {
                kind: ContentKind::Json,
            });
    }
    if let Some(bytes) = blob_val {
        return Ok(StoredValue::Blob(bytes));
    }

    Ok(StoredValue::String(String::new()))
}

/// A rendered body and its media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

/// Encode `value` for the `output` kind.
pub fn encode_value(value: &StoredValue, output: ContentKind) -> Result<Encoded, ContentError> {
    let body = match (value, output) {
        (StoredValue::Blob(_), ContentKind::Json) => return Err(ContentError::BlobAsJson),
        (StoredValue::Blob(bytes), ContentKind::String) => {
            base64::engine::general_purpose::STANDARD
                .encode(bytes)
                .into_bytes()
        }
        (StoredValue::Blob(bytes), ContentKind::Blob) => bytes.clone(),
        (StoredValue::String(s), ContentKind::Json) => pretty_json(&Value::String(s.clone())),
        (StoredValue::String(s), _) => s.clone().into_bytes(),
        (StoredValue::Json(doc), _) => pretty_json(doc),
    };

    Ok(Encoded {
        content_type: output.content_type(),
        body,
    })
}

fn pretty_json(doc: &Value) -> Vec<u8> {
    // Serializing an in-memory `Value` into a Vec does not fail.
    serde_json::to_vec_pretty(doc).unwrap_or_default()
}
