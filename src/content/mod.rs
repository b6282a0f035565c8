//! Content negotiation subsystem.
//!
//! # Data Flow
//! ```text
//! Request body + Content-Type
//!     → kind.rs (which of string / json / blob)
//!     → negotiator.rs (size ceiling, utf-8 / json decode)
//!     → StoredValue handed to the query builder
//!
//! Stored row (three nullable columns)
//!     → negotiator.rs (pick the single populated column)
//!     → negotiator.rs (encode for the requested output kind)
//! ```
//!
//! # Design Decisions
//! - `StoredValue` is a sum type; the three-column shape exists only at the store edge
//! - Ceilings are checked before any decoding work

pub mod kind;
pub mod negotiator;

pub use kind::{ContentKind, StoredValue, CONTENT_TYPE_BLOB, CONTENT_TYPE_JSON, CONTENT_TYPE_STRING};
pub use negotiator::{classify_and_bound, decode_columns, encode_value, ContentError, Encoded};
