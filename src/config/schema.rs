//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the item store.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the item store.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServoConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Admission policy (public mode, origin, client address).
    pub access: AccessConfig,

    /// Client identity settings.
    pub session: SessionConfig,

    /// Per-kind payload ceilings.
    pub limits: LimitsConfig,

    /// Datastore backend selection.
    pub store: StoreConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Request admission policy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AccessConfig {
    /// Serve the console on `/` and skip the `Origin` presence check.
    pub public_mode: bool,

    /// Exact `Origin` header value item requests must carry.
    pub allow_origin: Option<String>,

    /// Exact client IP address allowed to talk to the store.
    pub allow_ipaddr: Option<String>,
}

/// Client identity settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Lifetime of the identity cookie in seconds.
    pub ttl_secs: u64,

    /// Advisory capacity hint, reported at startup only.
    pub max_sessions: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 300,
            max_sessions: 10,
        }
    }
}

/// Payload ceilings in bytes, one per content kind.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub string_size: usize,
    pub json_size: usize,
    pub blob_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            string_size: 255,
            json_size: 1024,
            blob_size: 4096,
        }
    }
}

impl LimitsConfig {
    /// Largest ceiling across all kinds; used to bound body buffering.
    pub fn max_size(&self) -> usize {
        self.string_size.max(self.json_size).max(self.blob_size)
    }
}

/// Which datastore backs the items.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// In-process map, lost on restart.
    #[default]
    Memory,
    /// PostgreSQL via a connection pool.
    Postgres,
}

/// Datastore configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Backend selection.
    pub backend: BackendKind,

    /// Connection string, required for the postgres backend.
    pub database_url: Option<String>,

    /// Pool size.
    pub max_connections: u32,

    /// How long a background pool acquire may take before failing.
    pub acquire_timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Memory,
            database_url: None,
            max_connections: 10,
            acquire_timeout_secs: 5,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Full,
    Compact,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log line format.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Full,
        }
    }
}
