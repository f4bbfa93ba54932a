//! Startup orchestration.
//!
//! # Responsibilities
//! - Resolve every configured server
//! - Build one zone-backed group per configured upstream
//! - Hand the ready engine to the HTTP layer
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Groups are built in config order, not concurrently
//! - The listener is bound only after this succeeds

use std::sync::Arc;

use thiserror::Error;

use crate::config::{ConfigError, DynamicConfig};
use crate::dynamic::DynamicUpstream;
use crate::upstream::registry::{RegistryError, UpstreamRegistry};
use crate::upstream::resolver::Resolver;

/// Fatal error while bringing the service up.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid metrics address \"{0}\"")]
    MetricsAddress(String),
}

/// Build the dynamic upstream engine from a validated config.
pub fn bootstrap(
    config: &DynamicConfig,
    resolver: Arc<dyn Resolver>,
) -> Result<DynamicUpstream, StartupError> {
    let registry = UpstreamRegistry::from_config(&config.upstreams, resolver.as_ref())?;

    tracing::info!(
        upstreams = registry.groups().len(),
        "Upstream registry initialized"
    );
    Ok(DynamicUpstream::new(Arc::new(registry), resolver))
}
