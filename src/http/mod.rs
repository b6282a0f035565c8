//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, timeout, trace)
//!     → request.rs (metadata: origin, peer, identity, content kinds)
//!     → [access filter, identity resolution]
//!     → [item lifecycle against the datastore]
//!     → response.rs (status, content type, body)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestMeta, X_REQUEST_ID};
pub use response::Reply;
pub use server::{AppState, HttpServer};
