//! Peer-list mutations.
//!
//! Every function takes `&mut PeerList`, which is only reachable through a
//! group's lock guard. A failing call returns before touching the chain.

use std::sync::Arc;

use crate::dynamic::operation::{Action, Operation, ParamUpdate};
use crate::error::{UpstreamError, UpstreamResult};
use crate::upstream::peer::{Peer, PeerParams};
use crate::upstream::peer_list::PeerList;
use crate::upstream::resolver::Resolver;

/// Run the mutation an operation asks for. `List` is a no-op.
pub fn apply(peers: &mut PeerList, op: &Operation, resolver: &dyn Resolver) -> UpstreamResult<()> {
    match op.action {
        Action::List => Ok(()),
        Action::Add => add(peers, required_server(op)?, resolver).map(|_| ()),
        Action::Remove => remove(peers, required_server(op)?).map(|_| ()),
        Action::UpdateParam(update) => {
            update_param(peers, required_server(op)?, &update).map(|_| ())
        }
    }
}

fn required_server(op: &Operation) -> UpstreamResult<&str> {
    op.server.as_deref().ok_or(UpstreamError::MissingServer)
}

/// Resolve `server` and append it with default policy.
///
/// Duplicate names are accepted and produce separate entries.
pub fn add(peers: &mut PeerList, server: &str, resolver: &dyn Resolver) -> UpstreamResult<Arc<Peer>> {
    let addr = resolver.resolve(server).map_err(|e| {
        tracing::warn!(upstream = %peers.name(), server = %server, error = %e, "Add rejected");
        e
    })?;

    let peer = peers
        .push_back(Peer::new(server, addr, PeerParams::default()))
        .map_err(|e| {
            tracing::error!(upstream = %peers.name(), server = %server, error = %e, "Add failed");
            e
        })?;

    tracing::info!(
        upstream = %peers.name(),
        server = %server,
        addr = %addr,
        peers = peers.len(),
        "Peer added"
    );
    Ok(peer)
}

/// Unlink the first peer named `server` and free its block.
///
/// The last remaining peer is never removed.
pub fn remove(peers: &mut PeerList, server: &str) -> UpstreamResult<Arc<Peer>> {
    if peers.len() < 2 {
        tracing::warn!(upstream = %peers.name(), server = %server, "Refusing to remove last peer");
        return Err(UpstreamError::LastPeer(peers.name().to_string()));
    }

    let removed = peers
        .find(server)
        .and_then(|pos| peers.unlink(pos))
        .ok_or_else(|| not_found(peers, server))?;

    tracing::info!(
        upstream = %peers.name(),
        server = %server,
        peers = peers.len(),
        "Peer removed"
    );
    Ok(removed)
}

/// Overwrite the policy fields present in `update` on the first peer named `server`.
pub fn update_param(
    peers: &mut PeerList,
    server: &str,
    update: &ParamUpdate,
) -> UpstreamResult<Arc<Peer>> {
    let peer = peers
        .find(server)
        .and_then(|pos| peers.peer_at(pos))
        .cloned()
        .ok_or_else(|| not_found(peers, server))?;

    if let Some(weight) = update.weight {
        peer.set_weight(weight);
    }
    if let Some(max_fails) = update.max_fails {
        peer.set_max_fails(max_fails);
    }
    if let Some(fail_timeout) = update.fail_timeout {
        peer.set_fail_timeout(fail_timeout);
    }
    if let Some(down) = update.down {
        peer.set_down(down);
    }

    tracing::info!(
        upstream = %peers.name(),
        server = %server,
        weight = peer.weight(),
        max_fails = peer.max_fails(),
        fail_timeout = peer.fail_timeout(),
        down = peer.is_down(),
        "Peer updated"
    );
    Ok(peer)
}

fn not_found(peers: &PeerList, server: &str) -> UpstreamError {
    tracing::warn!(upstream = %peers.name(), server = %server, "Server not found");
    UpstreamError::ServerNotFound {
        upstream: peers.name().to_string(),
        server: server.to_string(),
    }
}
