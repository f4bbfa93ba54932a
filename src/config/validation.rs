//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check upstream names are present and unique
//! - Validate value ranges (zone sizes, timeouts)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: DynamicConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system
//! - Server addresses are checked for presence only; resolution happens at startup

use std::collections::HashSet;

use thiserror::Error;

use crate::admin::STATUS_PATH;
use crate::config::schema::DynamicConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("upstream name must not be empty")]
    EmptyUpstreamName,

    #[error("duplicate upstream \"{0}\"")]
    DuplicateUpstream(String),

    #[error("upstream \"{0}\" has no servers")]
    NoServers(String),

    #[error("upstream \"{0}\" has a zero zone_size")]
    ZeroZoneSize(String),

    #[error("upstream \"{0}\" has a server with an empty address")]
    EmptyServerAddress(String),

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,

    #[error("admin.path must start with '/', got \"{0}\"")]
    InvalidAdminPath(String),

    #[error("admin.path \"{0}\" is reserved")]
    ReservedAdminPath(String),
}

/// Check a parsed configuration, collecting every problem.
pub fn validate_config(config: &DynamicConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for upstream in &config.upstreams {
        if upstream.name.is_empty() {
            errors.push(ValidationError::EmptyUpstreamName);
        } else if !seen.insert(upstream.name.as_str()) {
            errors.push(ValidationError::DuplicateUpstream(upstream.name.clone()));
        }
        if upstream.servers.is_empty() {
            errors.push(ValidationError::NoServers(upstream.name.clone()));
        }
        if upstream.zone_size == 0 {
            errors.push(ValidationError::ZeroZoneSize(upstream.name.clone()));
        }
        if upstream.servers.iter().any(|s| s.address.trim().is_empty()) {
            errors.push(ValidationError::EmptyServerAddress(upstream.name.clone()));
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }
    if !config.admin.path.starts_with('/') {
        errors.push(ValidationError::InvalidAdminPath(config.admin.path.clone()));
    } else if config.admin.path == STATUS_PATH {
        errors.push(ValidationError::ReservedAdminPath(config.admin.path.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
