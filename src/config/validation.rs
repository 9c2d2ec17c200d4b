//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check the SSR endpoint is an absolute http(s) URL
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: InertiaConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system
//! - File existence is not checked here; missing bundles and manifests are
//!   runtime conditions

use std::net::SocketAddr;

use url::Url;

use crate::config::schema::InertiaConfig;

/// One semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
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

/// Check a configuration, collecting every problem.
pub fn validate_config(config: &InertiaConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if config.app.root_view.trim().is_empty() {
        errors.push(ValidationError::new("app.root_view", "must not be empty"));
    }

    if matches!(&config.version.value, Some(v) if v.trim().is_empty()) {
        errors.push(ValidationError::new(
            "version.value",
            "must not be empty when set",
        ));
    }

    if config.pages.ensure_exist {
        if config.pages.paths.is_empty() {
            errors.push(ValidationError::new(
                "pages.paths",
                "at least one path is required when ensure_exist is on",
            ));
        }
        if config.pages.extensions.is_empty() {
            errors.push(ValidationError::new(
                "pages.extensions",
                "at least one extension is required when ensure_exist is on",
            ));
        }
    }

    match Url::parse(&config.ssr.url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::new(
            "ssr.url",
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new("ssr.url", e.to_string())),
    }

    if config.ssr.timeout_secs == 0 {
        errors.push(ValidationError::new("ssr.timeout_secs", "must be > 0"));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be > 0"));
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
                "'{}' is not a socket address",
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
