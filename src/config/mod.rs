//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServoConfig (validated, immutable)
//!     → shared via Arc to the access filter, negotiator and renderer
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, override_bind_address, parse_config, ConfigError};
pub use schema::{
    AccessConfig, BackendKind, LimitsConfig, ListenerConfig, LogFormat, ObservabilityConfig,
    ServoConfig, SessionConfig, StoreConfig, TimeoutConfig,
};
