//! Servo key-value item store.
//!
//! An HTTP front end that stores one value per (client, key) pair in a
//! relational datastore. Values are plain text, JSON documents or opaque
//! binary, chosen by the request's `Content-Type`.
//!
//! # Architecture Overview
//!
//! ```text
//!   Client Request
//!   ─────────────▶ http::server ─▶ security (origin, client IP)
//!                       │
//!                       ▼
//!                  identity (header / cookie / new UUID)
//!                       │
//!                       ▼
//!                  fsm::drive ──▶ INIT ─▶ QUERY ─▶ WAIT ⇄ READ
//!                       │                             │
//!                       │          store::Session ◀───┘
//!                       ▼                (memory | postgres)
//!                  DONE / ERROR ─▶ http::response ─▶ Client Response
//!
//!   Cross-cutting: config, content (kinds, ceilings, encoding),
//!                  lifecycle (signals, shutdown), observability (logging)
//! ```

// Core subsystems
pub mod config;
pub mod content;
pub mod fsm;
pub mod http;
pub mod store;

// Request admission
pub mod identity;
pub mod security;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::schema::ServoConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use store::{Datastore, MemoryStore, PgStore};
