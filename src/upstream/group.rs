//! A named upstream group: lock, zone-backed chain and published snapshot.

use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use arc_swap::ArcSwap;
use serde::Serialize;

use crate::upstream::peer::Peer;
use crate::upstream::peer_list::PeerList;
use crate::upstream::round_robin::WeightedRoundRobin;
use crate::upstream::{Outcome, PeerSelector};

/// Peers as last published by a mutation, in chain order.
pub type PeerSnapshot = Arc<Vec<Arc<Peer>>>;

/// Byte accounting of a group's zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ZoneUsage {
    pub used: usize,
    pub size: usize,
}

/// One upstream group shared by every worker.
#[derive(Debug)]
pub struct UpstreamGroup {
    name: String,
    peers: Mutex<PeerList>,
    snapshot: ArcSwap<Vec<Arc<Peer>>>,
    selector: Box<dyn PeerSelector>,
}

impl UpstreamGroup {
    /// Create an empty group whose zone holds `zone_size` bytes.
    pub fn new(name: impl Into<String>, zone_size: usize) -> Self {
        let name = name.into();
        Self {
            peers: Mutex::new(PeerList::new(name.clone(), zone_size)),
            snapshot: ArcSwap::from_pointee(Vec::new()),
            selector: Box::new(WeightedRoundRobin::new()),
            name,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Acquire the group's exclusive lock.
    ///
    /// Dropping the guard publishes the chain as the new snapshot before the
    /// lock is released.
    pub fn lock(&self) -> PeersGuard<'_> {
        let list = self.peers.lock().unwrap_or_else(PoisonError::into_inner);
        PeersGuard { group: self, list }
    }

    /// Latest published peers. Does not take the lock.
    pub fn peers(&self) -> PeerSnapshot {
        self.snapshot.load_full()
    }

    pub fn zone_usage(&self) -> ZoneUsage {
        let list = self.peers.lock().unwrap_or_else(PoisonError::into_inner);
        ZoneUsage {
            used: list.zone_used(),
            size: list.zone_size(),
        }
    }

    /// Pick a peer for a request using the latest snapshot.
    pub fn select(&self, now: u64) -> Option<Arc<Peer>> {
        let peers = self.peers();
        self.selector.select(&peers, now)
    }

    /// Record the outcome of a request sent to `peer`.
    pub fn report(&self, peer: &Peer, outcome: Outcome, now: u64) {
        self.selector.report(peer, outcome, now);
    }
}

/// Exclusive access to a group's chain.
pub struct PeersGuard<'a> {
    group: &'a UpstreamGroup,
    list: MutexGuard<'a, PeerList>,
}

impl Deref for PeersGuard<'_> {
    type Target = PeerList;
    fn deref(&self) -> &Self::Target {
        &self.list
    }
}

impl DerefMut for PeersGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.list
    }
}

impl Drop for PeersGuard<'_> {
    fn drop(&mut self) {
        // Still locked here: snapshots are published in lock order
        self.group.snapshot.store(Arc::new(self.list.snapshot()));
    }
}
