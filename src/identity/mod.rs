//! Client identity subsystem.
//!
//! # Data Flow
//! ```text
//! X-Servo-Client header ─┐
//! Servo-Client cookie ───┼─▶ resolver.rs ─▶ client_id ─▶ lifecycle
//! fresh UUID v4 ─────────┘                     │
//!                                              ▼
//!                           echoed as header + Secure/HttpOnly cookie
//! ```

pub mod resolver;

pub use resolver::{echo, resolve, resolve_with, ClientIdentity, IdentitySource};

/// Header a client may use to present its token.
pub const CLIENT_HEADER: &str = "x-servo-client";

/// Cookie carrying the token between requests.
pub const CLIENT_COOKIE: &str = "Servo-Client";
