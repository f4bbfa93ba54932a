//! Singly-linked peer chain stored inside a group's zone.
//!
//! The chain only changes through `&mut PeerList`, which callers obtain from
//! the group lock. Positions returned by [`PeerList::find`] are the only way
//! to name a block for unlinking.

use std::sync::Arc;

use crate::upstream::peer::Peer;
use crate::upstream::zone::{BlockId, SlabZone, ZoneExhausted};

#[derive(Debug)]
pub struct Link {
    peer: Arc<Peer>,
    next: Option<BlockId>,
}

/// Location of a peer found by name: its block and its predecessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    prev: Option<BlockId>,
    id: BlockId,
}

/// Ordered peers of one group plus the zone they are allocated from.
#[derive(Debug)]
pub struct PeerList {
    zone: SlabZone<Link>,
    head: Option<BlockId>,
    tail: Option<BlockId>,
    count: usize,
}

impl PeerList {
    /// Create an empty chain backed by a zone of `zone_size` bytes.
    pub fn new(zone_name: impl Into<String>, zone_size: usize) -> Self {
        Self {
            zone: SlabZone::new(zone_name, zone_size),
            head: None,
            tail: None,
            count: 0,
        }
    }

    /// Name of the backing zone, which is also the group name.
    pub fn name(&self) -> &str {
        self.zone.name()
    }

    /// Number of peers, as tracked by the chain's counter.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn zone_used(&self) -> usize {
        self.zone.used()
    }

    pub fn zone_size(&self) -> usize {
        self.zone.size()
    }

    /// Walk the chain from head to tail.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            list: self,
            cursor: self.head,
        }
    }

    /// First peer whose name matches exactly.
    pub fn find(&self, name: &str) -> Option<Position> {
        let mut prev = None;
        let mut cursor = self.head;
        while let Some(id) = cursor {
            let link = self.zone.get(id)?;
            if link.peer.name() == name {
                return Some(Position { prev, id });
            }
            prev = Some(id);
            cursor = link.next;
        }
        None
    }

    /// Peer stored at a position returned by [`find`](Self::find).
    pub fn peer_at(&self, pos: Position) -> Option<&Arc<Peer>> {
        self.zone.get(pos.id).map(|link| &link.peer)
    }

    /// Allocate a block for `peer` and link it after the current tail.
    ///
    /// Nothing is linked when the zone is exhausted.
    pub fn push_back(&mut self, peer: Peer) -> Result<Arc<Peer>, ZoneExhausted> {
        let size = Peer::footprint(peer.name());
        let peer = Arc::new(peer);
        let id = self.zone.alloc(
            size,
            Link {
                peer: Arc::clone(&peer),
                next: None,
            },
        )?;

        match self.tail.and_then(|tail| self.zone.get_mut(tail)) {
            Some(last) => last.next = Some(id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);
        self.count += 1;
        Ok(peer)
    }

    /// Unlink the peer at `pos` and return its block to the zone.
    pub fn unlink(&mut self, pos: Position) -> Option<Arc<Peer>> {
        let next = self.zone.get(pos.id)?.next;

        match pos.prev {
            None => self.head = next,
            Some(prev) => {
                if let Some(link) = self.zone.get_mut(prev) {
                    link.next = next;
                }
            }
        }
        if self.tail == Some(pos.id) {
            self.tail = pos.prev;
        }

        let link = self.zone.free(pos.id)?;
        self.count -= 1;
        Some(link.peer)
    }

    /// Shared handles to every peer, in chain order.
    pub fn snapshot(&self) -> Vec<Arc<Peer>> {
        self.iter().cloned().collect()
    }
}

/// Iterator over the chain, head to tail.
pub struct Iter<'a> {
    list: &'a PeerList,
    cursor: Option<BlockId>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Arc<Peer>;

    fn next(&mut self) -> Option<Self::Item> {
        let link = self.list.zone.get(self.cursor?)?;
        self.cursor = link.next;
        Some(&link.peer)
    }
}
