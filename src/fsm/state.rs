//! States, events, effects and the transition function.

use std::fmt;
use std::sync::Arc;

use axum::http::Method;
use tracing::{debug, error, info, warn};

use crate::config::ServoConfig;
use crate::content::{classify_and_bound, decode_columns};
use crate::fsm::context::{ItemRequest, RequestContext};
use crate::http::response::{self, Reply};
use crate::store::query::{self, Query, StoreMode};
use crate::store::{OpenStatus, PollStatus, Row, StoreError};

/// Lifecycle states; the only thing the scheduler needs to resume a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Init,
    Query,
    Wait,
    Read,
    Done,
    Error,
}

impl State {
    pub fn name(self) -> &'static str {
        match self {
            Self::Init => "INIT",
            Self::Query => "QUERY",
            Self::Wait => "WAIT",
            Self::Read => "READ",
            Self::Done => "DONE",
            Self::Error => "ERROR",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Error)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What the scheduler observed before re-entering a state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// INIT: result of `Session::open`.
    Opened(OpenStatus),
    /// QUERY: CPU-only dispatch, no I/O observed.
    Dispatch,
    /// WAIT: the submit issued by QUERY was refused.
    SubmitFailed(StoreError),
    /// WAIT: result of `Session::poll`.
    Polled(PollStatus),
    /// READ: every row of the current result set.
    Rows(Vec<Row>),
    /// DONE / ERROR: time to respond.
    Finish,
}

impl Event {
    fn name(&self) -> &'static str {
        match self {
            Self::Opened(_) => "opened",
            Self::Dispatch => "dispatch",
            Self::SubmitFailed(_) => "submit_failed",
            Self::Polled(_) => "polled",
            Self::Rows(_) => "rows",
            Self::Finish => "finish",
        }
    }
}

/// Work the scheduler must perform after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Run the (new) current state straight away.
    Continue,
    /// Wait for session readiness, then run the same state again.
    Retry,
    /// Submit the query, then run the current state.
    Submit(Query),
    /// Tell the session the row was consumed, then run the current state.
    ContinueAfterRow,
    /// Release the session and send the reply.
    Complete(Reply),
}

/// One request's lifecycle: context plus the immutable inputs it acts on.
pub struct Lifecycle {
    ctx: RequestContext,
    request: ItemRequest,
    config: Arc<ServoConfig>,
}

impl Lifecycle {
    pub fn new(config: Arc<ServoConfig>, client_id: impl Into<String>, request: ItemRequest) -> Self {
        let mut ctx = RequestContext::new(client_id);
        ctx.input_kind = request.input_kind;
        ctx.output_kind = request.requested_kind.unwrap_or(request.input_kind);
        Self {
            ctx,
            request,
            config,
        }
    }

    pub fn state(&self) -> State {
        self.ctx.state
    }

    pub fn context(&self) -> &RequestContext {
        &self.ctx
    }

    pub fn request(&self) -> &ItemRequest {
        &self.request
    }

    /// Apply `event` to the current state.
    pub fn transition(&mut self, event: Event) -> Effect {
        let from = self.ctx.state;
        let event_name = event.name();

        let effect = match (from, event) {
            (State::Init, Event::Opened(status)) => self.on_opened(status),
            (State::Query, Event::Dispatch) => self.on_dispatch(),
            (State::Wait, Event::SubmitFailed(err)) => self.on_store_error(err),
            (State::Wait, Event::Polled(status)) => self.on_polled(status),
            (State::Read, Event::Rows(rows)) => self.on_rows(rows),
            (State::Done | State::Error, Event::Finish) => self.on_finish(),
            (state, _) => {
                error!(
                    client = %self.ctx.client_id,
                    state = %state,
                    event = event_name,
                    "event does not apply to state"
                );
                self.fail(500, None)
            }
        };

        if from != self.ctx.state {
            debug!(
                client = %self.ctx.client_id,
                from = %from,
                to = %self.ctx.state,
                event = event_name,
                "state transition"
            );
        }
        effect
    }

    fn fail(&mut self, status: u16, message: Option<String>) -> Effect {
        self.ctx.fail(status, message);
        Effect::Continue
    }

    fn on_opened(&mut self, status: OpenStatus) -> Effect {
        match status {
            OpenStatus::Ready => {
                self.ctx.state = State::Query;
                Effect::Continue
            }
            OpenStatus::RetryLater => {
                debug!(client = %self.ctx.client_id, "datastore busy, retrying connection");
                Effect::Retry
            }
            OpenStatus::Failed(err) => {
                error!(
                    client = %self.ctx.client_id,
                    error = %err,
                    "failed to connect to datastore"
                );
                self.fail(500, None)
            }
        }
    }

    fn on_dispatch(&mut self) -> Effect {
        if !self.request.is_item() {
            self.ctx.state = State::Done;
            return Effect::Continue;
        }

        let mode = match self.request.method {
            Method::GET => {
                info!(key = %self.request.key, client = %self.ctx.client_id, "GET item");
                self.ctx.state = State::Wait;
                return Effect::Submit(query::fetch_item(&self.ctx.client_id, &self.request.key));
            }
            Method::POST => StoreMode::Insert,
            Method::PUT => StoreMode::Overwrite,
            Method::DELETE => return self.fail(501, None),
            _ => return self.fail(405, None),
        };

        let Some(body) = &self.request.body else {
            warn!(key = %self.request.key, client = %self.ctx.client_id, "body over every ceiling");
            return self.fail(403, Some("Request is too large".to_string()));
        };

        let value = match classify_and_bound(body, self.request.input_kind, &self.config.limits) {
            Ok(value) => value,
            Err(err) => {
                warn!(
                    key = %self.request.key,
                    client = %self.ctx.client_id,
                    error = %err,
                    "rejected item payload"
                );
                return self.fail(err.status(), err.client_message());
            }
        };

        info!(
            method = %self.request.method,
            key = %self.request.key,
            size = body.len(),
            kind = %value.kind(),
            client = %self.ctx.client_id,
            "store item"
        );

        let query = query::store_item(&self.ctx.client_id, &self.request.key, &value, mode);
        self.ctx.value_size = body.len();
        self.ctx.stored_value = Some(value);
        self.ctx.state = State::Wait;
        Effect::Submit(query)
    }

    fn on_polled(&mut self, status: PollStatus) -> Effect {
        match status {
            PollStatus::Waiting => Effect::Retry,
            PollStatus::ResultReady => {
                self.ctx.state = State::Read;
                Effect::Continue
            }
            PollStatus::Complete => {
                if self.request.method == Method::GET && self.ctx.stored_value.is_none() {
                    error!(
                        key = %self.request.key,
                        client = %self.ctx.client_id,
                        "fetch completed without a result set"
                    );
                    return self.fail(500, None);
                }
                self.ctx.state = State::Done;
                Effect::Continue
            }
            PollStatus::Failed(err) => self.on_store_error(err),
        }
    }

    fn on_store_error(&mut self, err: StoreError) -> Effect {
        error!(
            key = %self.request.key,
            client = %self.ctx.client_id,
            error = %err,
            "datastore query failed"
        );
        if err.is_conflict() {
            self.fail(409, Some("Item already exists".to_string()))
        } else {
            self.fail(500, None)
        }
    }

    fn on_rows(&mut self, rows: Vec<Row>) -> Effect {
        if self.request.method != Method::GET {
            error!(method = %self.request.method, "can not read rows for a write");
            return self.fail(500, None);
        }

        let mut rows = rows.into_iter();
        let row = match (rows.next(), rows.next()) {
            (None, _) => {
                debug!(key = %self.request.key, "zero rows selected");
                return self.fail(404, None);
            }
            (Some(row), None) => row,
            (Some(_), Some(_)) => {
                error!(
                    key = %self.request.key,
                    client = %self.ctx.client_id,
                    rows = rows.len() + 2,
                    "selected more than one row, 1 expected"
                );
                return self.fail(500, None);
            }
        };

        let [string_val, json_val, blob_val] = row;
        let size: usize = [&string_val, &json_val, &blob_val]
            .iter()
            .filter_map(|c| c.as_ref().map(Vec::len))
            .sum();

        match decode_columns(string_val, json_val, blob_val) {
            Ok(value) => {
                self.ctx.value_size = size;
                self.ctx.input_kind = value.kind();
                self.ctx.output_kind = self.request.requested_kind.unwrap_or(value.kind());
                self.ctx.stored_value = Some(value);
                self.ctx.state = State::Wait;
                Effect::ContinueAfterRow
            }
            Err(err) => {
                error!(key = %self.request.key, error = %err, "unreadable stored item");
                self.fail(err.status(), err.client_message())
            }
        }
    }

    fn on_finish(&mut self) -> Effect {
        if let Some(reply) = &self.ctx.reply {
            return Effect::Complete(reply.clone());
        }

        let reply = match self.ctx.state {
            State::Done => response::render_done(&self.ctx, &self.request, &self.config),
            _ => response::render_error(&self.ctx),
        };

        if self.ctx.state == State::Done && self.request.method == Method::GET && self.request.is_item() {
            debug!(
                size = self.ctx.value_size,
                stored = %self.ctx.input_kind,
                output = %self.ctx.output_kind,
                client = %self.ctx.client_id,
                "serving item"
            );
        }
        info!(
            status = reply.status,
            reason = response::status_text(reply.status),
            state = %self.ctx.state,
            client = %self.ctx.client_id,
            "request complete"
        );

        self.ctx.status = reply.status;
        self.ctx.reply = Some(reply.clone());
        Effect::Complete(reply)
    }
}
