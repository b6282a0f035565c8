//! In-process datastore backed by a concurrent map.

use std::future::Future;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::store::query::{Param, Query, Statement};
use crate::store::{Datastore, OpenStatus, Outcome, PollStatus, Row, Session, StoreError};

type ItemKey = (String, String);

/// A thread-safe item table keyed by `(client, key)`.
#[derive(Clone, Default)]
pub struct MemoryStore {
    items: Arc<DashMap<ItemKey, Vec<Row>>>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored `(client, key)` entries.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Place raw rows under `(client, key)` without the uniqueness check.
    ///
    /// Lets callers reproduce a table whose key constraint was lost.
    pub fn seed_rows(&self, client: &str, key: &str, rows: Vec<Row>) {
        self.items.insert((client.to_owned(), key.to_owned()), rows);
    }

    fn execute(&self, query: &Query) -> Result<Outcome, StoreError> {
        let item_key = item_key(&query.params)?;

        match query.statement {
            Statement::FetchItem => Ok(Outcome::Rows(
                self.items
                    .get(&item_key)
                    .map(|rows| rows.value().clone())
                    .unwrap_or_default(),
            )),
            Statement::InsertItem => {
                let row = value_row(&query.params)?;
                match self.items.entry(item_key) {
                    Entry::Occupied(_) => Err(StoreError::UniqueViolation("items_pkey".into())),
                    Entry::Vacant(slot) => {
                        slot.insert(vec![row]);
                        Ok(Outcome::Command)
                    }
                }
            }
            Statement::UpsertItem => {
                let row = value_row(&query.params)?;
                self.items.insert(item_key, vec![row]);
                Ok(Outcome::Command)
            }
        }
    }
}

impl Datastore for MemoryStore {
    type Session = MemorySession;

    fn session(&self) -> MemorySession {
        MemorySession {
            store: self.clone(),
            phase: Phase::Closed,
        }
    }
}

fn item_key(params: &[Param]) -> Result<ItemKey, StoreError> {
    match (params.first().and_then(Param::as_text), params.get(1).and_then(Param::as_text)) {
        (Some(client), Some(key)) => Ok((client.to_owned(), key.to_owned())),
        _ => Err(StoreError::Protocol("client and key parameters are required".into())),
    }
}

fn value_row(params: &[Param]) -> Result<Row, StoreError> {
    match params {
        [_, _, string_val, json_val, blob_val] => Ok([
            string_val.to_bytes(),
            json_val.to_bytes(),
            blob_val.to_bytes(),
        ]),
        _ => Err(StoreError::Protocol(format!(
            "store expects 5 parameters, got {}",
            params.len()
        ))),
    }
}

#[derive(Debug)]
enum Phase {
    Closed,
    Open,
    /// Executed, but not yet observed by a poll.
    Pending(Result<Outcome, StoreError>),
    Rows { rows: Vec<Row>, drained: bool },
    Complete,
    Failed(StoreError),
    Released,
}

/// A session on a [`MemoryStore`].
///
/// Queries execute on submit; the first poll after a submit reports
/// `Waiting`, the next one the outcome.
pub struct MemorySession {
    store: MemoryStore,
    phase: Phase,
}

impl Session for MemorySession {
    fn open(&mut self) -> OpenStatus {
        match self.phase {
            Phase::Released => {
                OpenStatus::Failed(StoreError::Protocol("session already released".into()))
            }
            Phase::Closed => {
                self.phase = Phase::Open;
                OpenStatus::Ready
            }
            _ => OpenStatus::Ready,
        }
    }

    fn submit(&mut self, query: Query) -> Result<(), StoreError> {
        match self.phase {
            Phase::Open | Phase::Complete => {
                self.phase = Phase::Pending(self.store.execute(&query));
                Ok(())
            }
            _ => Err(StoreError::Protocol("submit on a session that is not idle".into())),
        }
    }

    fn poll(&mut self) -> PollStatus {
        match std::mem::replace(&mut self.phase, Phase::Complete) {
            Phase::Pending(result) => {
                self.phase = match result {
                    Ok(Outcome::Rows(rows)) => Phase::Rows { rows, drained: false },
                    Ok(Outcome::Command) => Phase::Complete,
                    Err(err) => Phase::Failed(err),
                };
                PollStatus::Waiting
            }
            Phase::Rows { rows, drained } => {
                let status = if drained {
                    PollStatus::Complete
                } else {
                    PollStatus::ResultReady
                };
                self.phase = Phase::Rows { rows, drained };
                status
            }
            Phase::Complete => PollStatus::Complete,
            Phase::Failed(err) => {
                self.phase = Phase::Failed(err.clone());
                PollStatus::Failed(err)
            }
            other => {
                self.phase = other;
                PollStatus::Failed(StoreError::Protocol("no query submitted".into()))
            }
        }
    }

    fn row_count(&self) -> usize {
        match &self.phase {
            Phase::Rows { rows, .. } => rows.len(),
            _ => 0,
        }
    }

    fn get(&self, row: usize, col: usize) -> Option<&[u8]> {
        match &self.phase {
            Phase::Rows { rows, .. } => rows.get(row)?.get(col)?.as_deref(),
            _ => None,
        }
    }

    fn continue_after_row(&mut self) {
        if let Phase::Rows { drained, .. } = &mut self.phase {
            *drained = true;
        }
    }

    fn release(&mut self) {
        self.phase = Phase::Released;
    }

    fn ready(&mut self) -> impl Future<Output = ()> + Send {
        std::future::ready(())
    }
}
