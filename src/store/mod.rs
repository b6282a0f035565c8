//! Datastore subsystem.
//!
//! # Data Flow
//! ```text
//! Lifecycle state machine
//!     → query.rs (positional parameters for fetch / store)
//!     → Session (open → submit → poll → rows → continue → release)
//!         → memory.rs (DashMap, in-process)
//!         → postgres.rs (sqlx pool, spawned query tasks)
//! ```
//!
//! # Design Decisions
//! - Sessions never block: every call returns a status, and `ready()` is the
//!   only thing a caller awaits
//! - Errors carry a structured kind so conflicts are detected without
//!   inspecting driver messages
//! - `release()` is idempotent and also runs when a session is dropped

use std::future::Future;

pub mod memory;
pub mod postgres;
pub mod query;

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use query::{Param, Query, Statement, StoreMode};

/// One stored row: `(string_val, json_val, blob_val)`, each nullable.
pub type Row = [Option<Vec<u8>>; 3];

/// What a finished query produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A result set, possibly empty.
    Rows(Vec<Row>),
    /// A command without a result set.
    Command,
}

/// Errors reported by a datastore session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("datastore unavailable: {0}")]
    Unavailable(String),

    #[error("session protocol violation: {0}")]
    Protocol(String),

    #[error("database error: {0}")]
    Database(String),
}

impl StoreError {
    /// Whether the failure is a uniqueness conflict on the item key.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::UniqueViolation(_))
    }
}

/// Result of asking a session to open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenStatus {
    Ready,
    /// Nothing is wrong yet; ask again once `ready()` resolves.
    RetryLater,
    Failed(StoreError),
}

/// Progress of a submitted query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStatus {
    Waiting,
    ResultReady,
    Complete,
    Failed(StoreError),
}

/// A per-request, poll-driven handle on the datastore.
pub trait Session: Send {
    /// Acquire a connection. Safe to call again while `RetryLater`.
    fn open(&mut self) -> OpenStatus;

    /// Start running `query` on the open connection.
    fn submit(&mut self, query: Query) -> Result<(), StoreError>;

    /// Observe the submitted query without blocking.
    fn poll(&mut self) -> PollStatus;

    /// Rows in the current result set.
    fn row_count(&self) -> usize;

    /// Column `col` of row `row`; `None` for SQL NULL or out of range.
    fn get(&self, row: usize, col: usize) -> Option<&[u8]>;

    /// Mark the current result set consumed.
    fn continue_after_row(&mut self);

    /// Give the connection back. Idempotent.
    fn release(&mut self);

    /// Resolves when pending I/O may have progressed.
    fn ready(&mut self) -> impl Future<Output = ()> + Send;
}

/// A shared handle that hands out sessions.
pub trait Datastore: Clone + Send + Sync + 'static {
    type Session: Session + 'static;

    fn session(&self) -> Self::Session;
}
