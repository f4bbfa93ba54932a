//! Request orchestration: decode, look up, mutate under lock, render.

use std::sync::Arc;

use crate::dynamic::listing;
use crate::dynamic::mutator;
use crate::dynamic::operation::{Operation, QueryParams};
use crate::error::UpstreamResult;
use crate::observability::metrics;
use crate::upstream::group::UpstreamGroup;
use crate::upstream::registry::UpstreamRegistry;
use crate::upstream::resolver::Resolver;

/// Entry point of the dynamic upstream API.
#[derive(Debug, Clone)]
pub struct DynamicUpstream {
    registry: Arc<UpstreamRegistry>,
    resolver: Arc<dyn Resolver>,
}

impl DynamicUpstream {
    pub fn new(registry: Arc<UpstreamRegistry>, resolver: Arc<dyn Resolver>) -> Self {
        Self { registry, resolver }
    }

    pub fn registry(&self) -> &UpstreamRegistry {
        &self.registry
    }

    /// Serve one request and return the group's listing.
    ///
    /// Blocks while waiting for the group lock and while resolving servers.
    pub fn execute(&self, params: &QueryParams) -> UpstreamResult<String> {
        let op = Operation::decode(params).map_err(|e| {
            tracing::warn!(error = %e, "Rejected dynamic upstream request");
            metrics::record_rejected(e.kind());
            e
        })?;

        let group = self.registry.lookup(&op.upstream).map_err(|e| {
            tracing::warn!(upstream = %op.upstream, "Upstream not found");
            metrics::record_rejected(e.kind());
            e
        })?;

        if op.backup {
            tracing::debug!(upstream = %op.upstream, "Ignoring backup flag, no backup pool");
        }

        let result = self.mutate(group, &op);
        metrics::record_operation(group.name(), op.action.name(), &result);
        result?;

        // Rendered from the latest snapshot, outside the lock
        Ok(listing::render(&group.peers(), op.verbose))
    }

    fn mutate(&self, group: &UpstreamGroup, op: &Operation) -> UpstreamResult<()> {
        if !op.action.is_mutation() {
            return Ok(());
        }

        let mut peers = group.lock();
        let result = mutator::apply(&mut peers, op, self.resolver.as_ref());
        metrics::record_group_state(group.name(), peers.len(), peers.zone_used());
        result
    }
}
