//! Request lifecycle state machine.
//!
//! # Data Flow
//! ```text
//! handler (after access filter + identity)
//!     → scheduler.rs::drive(lifecycle, session)
//!         loop:
//!           observe session for the current state → Event
//!           state.rs::Lifecycle::transition(event) → Effect
//!           run the effect (submit, continue, await readiness)
//!     → Reply from the terminal DONE / ERROR state
//! ```
//!
//! ```text
//! INIT ──ready──▶ QUERY ──submit──▶ WAIT ──result──▶ READ
//!  ▲ │              │                ▲ │               │
//!  └─┘retry         │admin           └─┘waiting        │1 row
//!                   ▼                  │complete       ▼
//!                  DONE ◀──────────────┘◀────────── WAIT
//!   any failure ──▶ ERROR
//! ```
//!
//! # Design Decisions
//! - Transitions are synchronous and never touch the session; the scheduler
//!   owns all I/O
//! - `Retry` leaves the state unchanged, so re-running a state cannot
//!   re-submit work
//! - The terminal states release the session exactly once

pub mod context;
pub mod scheduler;
pub mod state;

pub use context::{ItemRequest, RequestContext};
pub use scheduler::{drive, SessionGuard};
pub use state::{Effect, Event, Lifecycle, State};
