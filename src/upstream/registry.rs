//! Table of configured upstream groups.
//!
//! # Responsibilities
//! - Build every group from configuration at startup
//! - Map a group name to its handle for each request
//!
//! # Design Decisions
//! - Read-only after construction; passed explicitly, never global
//! - Lookup is an exact, case-sensitive comparison over a short list

use std::sync::Arc;

use thiserror::Error;

use crate::config::UpstreamConfig;
use crate::error::UpstreamError;
use crate::upstream::group::UpstreamGroup;
use crate::upstream::peer::Peer;
use crate::upstream::resolver::{ResolveError, Resolver};
use crate::upstream::zone::ZoneExhausted;

/// Errors raised while populating groups from configuration.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("upstream \"{upstream}\": {source}")]
    Resolve {
        upstream: String,
        #[source]
        source: ResolveError,
    },

    #[error("upstream \"{upstream}\": {source}")]
    Zone {
        upstream: String,
        #[source]
        source: ZoneExhausted,
    },
}

/// Every group mutable through the dynamic API.
#[derive(Debug, Default)]
pub struct UpstreamRegistry {
    groups: Vec<Arc<UpstreamGroup>>,
}

impl UpstreamRegistry {
    pub fn new(groups: Vec<Arc<UpstreamGroup>>) -> Self {
        Self { groups }
    }

    /// Create and populate one group per configured upstream.
    pub fn from_config(
        configs: &[UpstreamConfig],
        resolver: &dyn Resolver,
    ) -> Result<Self, RegistryError> {
        let mut groups = Vec::with_capacity(configs.len());

        for config in configs {
            let group = UpstreamGroup::new(config.name.clone(), config.zone_size);
            {
                let mut peers = group.lock();
                for server in &config.servers {
                    let addr = resolver.resolve(&server.address).map_err(|source| {
                        RegistryError::Resolve {
                            upstream: config.name.clone(),
                            source,
                        }
                    })?;
                    peers
                        .push_back(Peer::new(server.address.clone(), addr, server.params()))
                        .map_err(|source| RegistryError::Zone {
                            upstream: config.name.clone(),
                            source,
                        })?;
                }

                tracing::info!(
                    upstream = %config.name,
                    peers = peers.len(),
                    zone_used = peers.zone_used(),
                    zone_size = peers.zone_size(),
                    "Upstream group ready"
                );
            }
            groups.push(Arc::new(group));
        }

        Ok(Self { groups })
    }

    /// Find a group by its exact name.
    pub fn lookup(&self, name: &str) -> Result<&Arc<UpstreamGroup>, UpstreamError> {
        if name.is_empty() {
            return Err(UpstreamError::GroupNotFound(String::new()));
        }
        self.groups
            .iter()
            .find(|g| g.name() == name)
            .ok_or_else(|| UpstreamError::GroupNotFound(name.to_string()))
    }

    pub fn groups(&self) -> &[Arc<UpstreamGroup>] {
        &self.groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::upstream::resolver::SystemResolver;

    fn upstream(name: &str, servers: &[&str]) -> UpstreamConfig {
        UpstreamConfig {
            name: name.to_string(),
            zone_size: 64 * 1024,
            servers: servers.iter().map(|s| ServerConfig::new(*s)).collect(),
        }
    }

    #[test]
    fn test_from_config_populates_in_order() {
        let configs = vec![
            upstream("backend", &["10.0.0.1:80", "10.0.0.2:80"]),
            upstream("api", &["10.0.1.1:8080"]),
        ];
        let registry = UpstreamRegistry::from_config(&configs, &SystemResolver).unwrap();

        let backend = registry.lookup("backend").unwrap();
        let names: Vec<_> = backend.peers().iter().map(|p| p.name().to_string()).collect();
        assert_eq!(names, ["10.0.0.1:80", "10.0.0.2:80"]);
        assert_eq!(registry.lookup("api").unwrap().peers().len(), 1);
    }

    #[test]
    fn test_lookup_is_exact() {
        let configs = vec![upstream("backend", &["10.0.0.1:80"])];
        let registry = UpstreamRegistry::from_config(&configs, &SystemResolver).unwrap();

        for name in ["", "back", "backend2", "Backend", "backend "] {
            assert!(
                matches!(registry.lookup(name), Err(UpstreamError::GroupNotFound(_))),
                "{name:?} should not match"
            );
        }
        assert!(registry.lookup("backend").is_ok());
    }

    #[test]
    fn test_zone_too_small() {
        let mut config = upstream("backend", &["10.0.0.1:80", "10.0.0.2:80"]);
        config.zone_size = 16;
        let err = UpstreamRegistry::from_config(&[config], &SystemResolver).unwrap_err();
        assert!(matches!(err, RegistryError::Zone { .. }));
    }

    #[test]
    fn test_unresolvable_server() {
        let config = upstream("backend", &["unix:/tmp/backend.sock"]);
        let err = UpstreamRegistry::from_config(&[config], &SystemResolver).unwrap_err();
        assert!(matches!(err, RegistryError::Resolve { .. }));
        assert!(err.to_string().starts_with("upstream \"backend\""));
    }
}
