//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (ceilings > 0, ttl > 0)
//! - Check that addresses parse and the chosen backend is usable
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServoConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::{IpAddr, SocketAddr};

use crate::config::schema::{BackendKind, ServoConfig};

/// A single semantic problem with a configuration value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Check a parsed configuration for values serde cannot rule out.
pub fn validate_config(config: &ServoConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    let ceilings = [
        ("limits.string_size", config.limits.string_size),
        ("limits.json_size", config.limits.json_size),
        ("limits.blob_size", config.limits.blob_size),
    ];
    for (field, value) in ceilings {
        if value == 0 {
            errors.push(ValidationError::new(field, "must be greater than zero"));
        }
    }

    if config.session.ttl_secs == 0 {
        errors.push(ValidationError::new("session.ttl_secs", "must be greater than zero"));
    }

    if let Some(addr) = &config.access.allow_ipaddr {
        if addr.parse::<IpAddr>().is_err() {
            errors.push(ValidationError::new(
                "access.allow_ipaddr",
                format!("'{}' is not an IP address", addr),
            ));
        }
    }

    if matches!(&config.access.allow_origin, Some(origin) if origin.is_empty()) {
        errors.push(ValidationError::new("access.allow_origin", "must not be empty"));
    }

    if config.store.backend == BackendKind::Postgres {
        if config.store.database_url.as_deref().map_or(true, str::is_empty) {
            errors.push(ValidationError::new(
                "store.database_url",
                "required for the postgres backend",
            ));
        }
        if config.store.max_connections == 0 {
            errors.push(ValidationError::new(
                "store.max_connections",
                "must be greater than zero",
            ));
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than zero"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ServoConfig::default()).is_ok());
    }

    #[test]
    fn test_postgres_requires_url() {
        let mut config = ServoConfig::default();
        config.store.backend = BackendKind::Postgres;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "store.database_url");
    }

    #[test]
    fn test_reports_every_error() {
        let mut config = ServoConfig::default();
        config.listener.bind_address = "nowhere".into();
        config.access.allow_ipaddr = Some("10.0.0".into());
        config.session.ttl_secs = 0;

        let fields: Vec<_> = validate_config(&config)
            .unwrap_err()
            .into_iter()
            .map(|e| e.field)
            .collect();
        assert_eq!(
            fields,
            vec!["listener.bind_address", "session.ttl_secs", "access.allow_ipaddr"]
        );
    }

    #[test]
    fn test_ipv6_allow_address() {
        let mut config = ServoConfig::default();
        config.access.allow_ipaddr = Some("::1".into());
        assert!(validate_config(&config).is_ok());
    }
}
