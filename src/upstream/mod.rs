//! Upstream groups and their shared state.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     UpstreamConfig[] → registry.rs (resolve servers, build groups)
//!         → group.rs (one lock + zone + chain per group)
//!
//! Mutation (admin request):
//!     registry.lookup(name) → group.lock()
//!         → peer_list.rs (append / find / unlink)
//!         → zone.rs (alloc / free blocks)
//!         → guard drop publishes a new snapshot
//!
//! Traffic:
//!     group.select(now) → snapshot → round_robin.rs → Peer
//! ```
//!
//! # Design Decisions
//! - One mutex per group; groups never contend with each other
//! - Readers never take the mutation lock; they load the latest snapshot
//! - Policy fields are atomics shared between the chain and the snapshots

pub mod group;
pub mod peer;
pub mod peer_list;
pub mod registry;
pub mod resolver;
pub mod round_robin;
pub mod zone;

use std::sync::Arc;

pub use group::UpstreamGroup;
pub use peer::{Peer, PeerParams};
pub use registry::UpstreamRegistry;
pub use resolver::{Resolver, SystemResolver};

/// Result of a request forwarded to a peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

/// Strategy the traffic path uses to pick a peer from a snapshot.
pub trait PeerSelector: Send + Sync + std::fmt::Debug {
    /// Pick the next peer, or `None` when no peer is usable.
    fn select(&self, peers: &[Arc<Peer>], now: u64) -> Option<Arc<Peer>>;

    /// Feed back the result of a request sent to `peer`.
    fn report(&self, peer: &Peer, outcome: Outcome, now: u64);
}
