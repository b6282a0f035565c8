//! Parameterized statements for the two item operations.
//!
//! Every store sends all five parameters; the two columns that do not
//! match the value's kind are bound as NULL so an overwrite never leaves
//! a stale value behind.

use crate::content::StoredValue;

/// Statements understood by every backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statement {
    /// `$1` client, `$2` key.
    FetchItem,
    /// `$1` client, `$2` key, `$3` string, `$4` json, `$5` blob.
    InsertItem,
    /// Same parameters as `InsertItem`, replacing an existing row.
    UpsertItem,
}

impl Statement {
    pub fn sql(self) -> &'static str {
        match self {
            Self::FetchItem => FETCH_ITEM_SQL,
            Self::InsertItem => INSERT_ITEM_SQL,
            Self::UpsertItem => UPSERT_ITEM_SQL,
        }
    }

    /// Whether the statement yields a result set.
    pub fn returns_rows(self) -> bool {
        matches!(self, Self::FetchItem)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::FetchItem => "fetch_item",
            Self::InsertItem => "insert_item",
            Self::UpsertItem => "upsert_item",
        }
    }
}

const FETCH_ITEM_SQL: &str = r"
SELECT string_val, json_val::text, blob_val
FROM items
WHERE client = $1 AND key = $2
";

const INSERT_ITEM_SQL: &str = r"
INSERT INTO items (client, key, string_val, json_val, blob_val)
VALUES ($1, $2, $3, $4::jsonb, $5)
";

const UPSERT_ITEM_SQL: &str = r"
INSERT INTO items (client, key, string_val, json_val, blob_val)
VALUES ($1, $2, $3, $4::jsonb, $5)
ON CONFLICT (client, key) DO UPDATE
SET string_val = EXCLUDED.string_val,
    json_val = EXCLUDED.json_val,
    blob_val = EXCLUDED.blob_val,
    updated_at = now()
";

/// A positional parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    Text(Option<String>),
    Bytes(Option<Vec<u8>>),
}

impl Param {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => value.as_deref(),
            Self::Bytes(_) => None,
        }
    }

    /// The parameter's bytes, `None` when NULL.
    pub fn to_bytes(&self) -> Option<Vec<u8>> {
        match self {
            Self::Text(value) => value.clone().map(String::into_bytes),
            Self::Bytes(value) => value.clone(),
        }
    }
}

/// A statement together with its bound parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub statement: Statement,
    pub params: Vec<Param>,
}

/// How a store treats an existing `(client, key)` row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreMode {
    /// Fail with a uniqueness conflict.
    Insert,
    /// Replace it.
    Overwrite,
}

/// Build the fetch-item query.
pub fn fetch_item(client: &str, key: &str) -> Query {
    Query {
        statement: Statement::FetchItem,
        params: vec![
            Param::Text(Some(client.to_owned())),
            Param::Text(Some(key.to_owned())),
        ],
    }
}

/// Build the store-item query for `value`.
pub fn store_item(client: &str, key: &str, value: &StoredValue, mode: StoreMode) -> Query {
    let (string_val, json_val, blob_val) = match value {
        StoredValue::String(s) => (Some(s.clone()), None, None),
        StoredValue::Json(doc) => (None, Some(doc.to_string()), None),
        StoredValue::Blob(bytes) => (None, None, Some(bytes.clone())),
    };

    Query {
        statement: match mode {
            StoreMode::Insert => Statement::InsertItem,
            StoreMode::Overwrite => Statement::UpsertItem,
        },
        params: vec![
            Param::Text(Some(client.to_owned())),
            Param::Text(Some(key.to_owned())),
            Param::Text(string_val),
            Param::Text(json_val),
            Param::Bytes(blob_val),
        ],
    }
}
