//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use servo_kv::{HttpServer, MemoryStore, ServoConfig};

/// A router over a fresh memory store, plus a handle on the store.
pub fn app(config: ServoConfig) -> (Router, MemoryStore) {
    let store = MemoryStore::new();
    let server = HttpServer::new(config, store.clone());
    (server.router(), store)
}

/// A response reduced to what the tests assert on.
pub struct Captured {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl Captured {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Builder for one request against the in-process router.
pub struct Call {
    builder: axum::http::request::Builder,
    peer: SocketAddr,
    body: Vec<u8>,
}

impl Call {
    pub fn new(method: &str, path: &str) -> Self {
        Self {
            builder: Request::builder().method(method).uri(path),
            peer: SocketAddr::from(([127, 0, 0, 1], 40000)),
            body: Vec::new(),
        }
    }

    pub fn get(path: &str) -> Self {
        Self::new("GET", path)
    }

    pub fn post(path: &str) -> Self {
        Self::new("POST", path)
    }

    pub fn put(path: &str) -> Self {
        Self::new("PUT", path)
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.builder = self.builder.header(name, value);
        self
    }

    pub fn client(self, token: &str) -> Self {
        self.header("X-Servo-Client", token)
    }

    pub fn peer(mut self, peer: SocketAddr) -> Self {
        self.peer = peer;
        self
    }

    pub fn text(self, body: &str) -> Self {
        let mut call = self.header("Content-Type", "text/plain");
        call.body = body.as_bytes().to_vec();
        call
    }

    pub fn json(self, body: &str) -> Self {
        let mut call = self.header("Content-Type", "application/json");
        call.body = body.as_bytes().to_vec();
        call
    }

    pub fn blob(self, body: &[u8]) -> Self {
        self.raw("application/octet-stream", body)
    }

    pub fn raw(self, content_type: &str, body: &[u8]) -> Self {
        let mut call = self.header("Content-Type", content_type);
        call.body = body.to_vec();
        call
    }

    pub async fn send(self, app: &Router) -> Captured {
        let mut request = self.builder.body(Body::from(self.body)).unwrap();
        request.extensions_mut().insert(ConnectInfo(self.peer));

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec();

        Captured {
            status,
            headers,
            body,
        }
    }
}
