//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via `tracing`)
//!
//! Request correlation:
//!     → x-request-id set on entry, echoed on the response
//!     → TraceLayer span per request
//! ```
//!
//! # Design Decisions
//! - `RUST_LOG` overrides the configured level
//! - Compact output for development, full output with targets for production

pub mod logging;

pub use logging::init;
