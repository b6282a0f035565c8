//! Per-request state carried through the lifecycle.

use axum::body::Bytes;
use axum::http::Method;

use crate::content::{ContentKind, StoredValue};
use crate::fsm::state::State;
use crate::http::request::{is_item_path, RequestMeta};
use crate::http::response::Reply;

/// The parts of an HTTP request the lifecycle acts on.
#[derive(Debug, Clone)]
pub struct ItemRequest {
    pub method: Method,
    /// Request path, used verbatim as the item key.
    pub key: String,
    /// Buffered body; `None` when it exceeded the largest ceiling.
    pub body: Option<Bytes>,
    pub input_kind: ContentKind,
    pub requested_kind: Option<ContentKind>,
}

impl ItemRequest {
    pub fn from_meta(meta: &RequestMeta, body: Option<Bytes>) -> Self {
        Self {
            method: meta.method.clone(),
            key: meta.path.clone(),
            body,
            input_kind: meta.input_kind,
            requested_kind: meta.requested_kind,
        }
    }

    pub fn is_item(&self) -> bool {
        is_item_path(&self.key)
    }
}

/// Mutable state of one in-flight request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub client_id: String,
    pub state: State,
    pub status: u16,
    /// Curated message for the client; the first one set wins.
    pub error_message: Option<String>,
    pub input_kind: ContentKind,
    pub output_kind: ContentKind,
    pub stored_value: Option<StoredValue>,
    /// Byte length of the value as received or as stored.
    pub value_size: usize,
    /// Set once the terminal state has rendered and released.
    pub reply: Option<Reply>,
}

impl RequestContext {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            state: State::Init,
            status: 200,
            error_message: None,
            input_kind: ContentKind::String,
            output_kind: ContentKind::String,
            stored_value: None,
            value_size: 0,
            reply: None,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status)
    }

    /// Record a failure and move to ERROR.
    ///
    /// Only the first failure decides the status and the message, together.
    pub fn fail(&mut self, status: u16, message: Option<String>) {
        if self.is_success() {
            self.status = status;
            self.error_message = message;
        }
        self.state = State::Error;
    }

    pub fn is_finished(&self) -> bool {
        self.reply.is_some()
    }
}
