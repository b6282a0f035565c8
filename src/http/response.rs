//! Response rendering.
//!
//! # Responsibilities
//! - Turn a finished request context into status, content type and body
//! - Render write acknowledgements, item reads and error pages
//! - Render the public console for the root path
//!
//! # Design Decisions
//! - Bodies for errors are the curated message or the standard status text,
//!   never a driver error
//! - Rendering is pure; identity headers are attached by the handler

use axum::body::Body;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::config::ServoConfig;
use crate::content::{encode_value, ContentKind, CONTENT_TYPE_JSON, CONTENT_TYPE_STRING};
use crate::fsm::{ItemRequest, RequestContext};

/// A rendered response, independent of the HTTP stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub content_type: Option<&'static str>,
    pub body: Vec<u8>,
}

impl Reply {
    pub fn new(status: u16, content_type: Option<&'static str>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            content_type,
            body: body.into(),
        }
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (status, Body::from(self.body)).into_response();
        if let Some(content_type) = self.content_type {
            response
                .headers_mut()
                .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
        }
        response
    }
}

/// Standard reason phrase for `status`.
pub fn status_text(status: u16) -> &'static str {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown")
}

/// Plain-text status page: the message if given, else the reason phrase.
pub fn render_status(status: u16, message: Option<&str>) -> Reply {
    let body = message.unwrap_or_else(|| status_text(status));
    Reply::new(status, Some(CONTENT_TYPE_STRING), body)
}

/// Render the terminal ERROR state.
pub fn render_error(ctx: &RequestContext) -> Reply {
    if ctx.is_redirect() {
        return Reply::new(ctx.status, Some(CONTENT_TYPE_STRING), status_text(ctx.status));
    }

    let status = if ctx.is_success() { 500 } else { ctx.status };
    render_status(status, ctx.error_message.as_deref())
}

/// Render the terminal DONE state.
pub fn render_done(ctx: &RequestContext, request: &ItemRequest, config: &ServoConfig) -> Reply {
    if !request.is_item() {
        return if config.access.public_mode {
            render_console(config)
        } else {
            Reply::new(403, None, Vec::new())
        };
    }

    if request.method == Method::POST || request.method == Method::PUT {
        return render_write(ctx, &request.method);
    }

    match &ctx.stored_value {
        Some(value) => match encode_value(value, ctx.output_kind) {
            Ok(encoded) => Reply::new(ctx.status, Some(encoded.content_type), encoded.body),
            Err(err) => render_status(err.status(), err.client_message().as_deref()),
        },
        None => render_status(500, None),
    }
}

fn render_write(ctx: &RequestContext, method: &Method) -> Reply {
    let status = if method == Method::POST { 201 } else { ctx.status };
    let text = status_text(status);

    match ctx.output_kind {
        ContentKind::Blob => Reply::new(status, None, Vec::new()),
        ContentKind::String => Reply::new(status, Some(CONTENT_TYPE_STRING), text),
        ContentKind::Json => Reply::new(status, Some(CONTENT_TYPE_JSON), json!(text).to_string()),
    }
}

/// Summary served on the root path in public mode.
pub fn render_console(config: &ServoConfig) -> Reply {
    let console = json!({
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "public_mode": config.access.public_mode,
        "session": {
            "ttl_secs": config.session.ttl_secs,
            "max_sessions": config.session.max_sessions,
        },
        "limits": {
            "string_size": config.limits.string_size,
            "json_size": config.limits.json_size,
            "blob_size": config.limits.blob_size,
        },
    });
    let body = serde_json::to_vec_pretty(&console).unwrap_or_default();
    Reply::new(200, Some(CONTENT_TYPE_JSON), body)
}
