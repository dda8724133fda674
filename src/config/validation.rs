//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (worker count > 0, timeout > 0)
//! - Check that addresses and URLs parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: DispatcherConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::DispatcherConfig;
use crate::dispatch::Endpoint;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &DispatcherConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.dispatch.worker_count == 0 {
        errors.push(ValidationError::new(
            "dispatch.worker_count",
            "must be at least 1",
        ));
    }

    if config.dispatch.timeout_ms == 0 {
        errors.push(ValidationError::new(
            "dispatch.timeout_ms",
            "must be greater than 0",
        ));
    }

    if let Some(endpoint) = &config.dispatch.endpoint {
        if let Err(e) = Endpoint::parse(endpoint) {
            errors.push(ValidationError::new("dispatch.endpoint", e.to_string()));
        }
    } else if config.endpoint.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "endpoint.bind_address",
            format!("invalid socket address '{}'", config.endpoint.bind_address),
        ));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!(
                "invalid socket address '{}'",
                config.observability.metrics_address
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
