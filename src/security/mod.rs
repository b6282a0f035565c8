//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming item request:
//!     → access_control.rs (Origin header, client IP address)
//!     → identity resolution
//!     → lifecycle
//! ```
//!
//! # Design Decisions
//! - Fail closed: a configured policy that cannot be satisfied denies
//! - The root path is never filtered; the renderer decides what it shows

pub mod access_control;

pub use access_control::{check_access, Access};
