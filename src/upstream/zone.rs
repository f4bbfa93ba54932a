//! Fixed-capacity shared zone backing one upstream group.
//!
//! # Responsibilities
//! - Account every block against the zone's byte capacity
//! - Hand out stable handles (`BlockId`) for stored values
//! - Take values back on free and credit their bytes
//!
//! # Design Decisions
//! - No garbage collection: a block lives until it is explicitly freed
//! - Freed slots are recycled before the slot table grows
//! - Callers serialize access through the owning group's lock

use thiserror::Error;

/// Block sizes are rounded up to this alignment.
pub const ZONE_ALIGNMENT: usize = 8;

/// Handle to a block allocated from a [`SlabZone`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId(u32);

impl BlockId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// The zone has no room left for the requested block.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("zone \"{zone}\" exhausted: requested {requested} bytes, {available} available")]
pub struct ZoneExhausted {
    pub zone: String,
    pub requested: usize,
    pub available: usize,
}

#[derive(Debug)]
struct Block<T> {
    value: T,
    size: usize,
}

/// A region of fixed byte capacity storing values of type `T`.
#[derive(Debug)]
pub struct SlabZone<T> {
    name: String,
    size: usize,
    used: usize,
    slots: Vec<Option<Block<T>>>,
    free_slots: Vec<BlockId>,
}

impl<T> SlabZone<T> {
    /// Create an empty zone of `size` bytes.
    pub fn new(name: impl Into<String>, size: usize) -> Self {
        Self {
            name: name.into(),
            size,
            used: 0,
            slots: Vec::new(),
            free_slots: Vec::new(),
        }
    }

    /// Store `value` in a block of at least `size` bytes.
    pub fn alloc(&mut self, size: usize, value: T) -> Result<BlockId, ZoneExhausted> {
        let size = align_up(size);
        if size > self.available() {
            return Err(ZoneExhausted {
                zone: self.name.clone(),
                requested: size,
                available: self.available(),
            });
        }

        let id = match self.free_slots.pop() {
            Some(id) => id,
            None => {
                let index = u32::try_from(self.slots.len()).map_err(|_| ZoneExhausted {
                    zone: self.name.clone(),
                    requested: size,
                    available: self.available(),
                })?;
                self.slots.push(None);
                BlockId(index)
            }
        };

        self.slots[id.index()] = Some(Block { value, size });
        self.used += size;
        Ok(id)
    }

    /// Release a block, returning the value it held.
    ///
    /// Unknown or already released handles are ignored.
    pub fn free(&mut self, id: BlockId) -> Option<T> {
        let block = self.slots.get_mut(id.index())?.take()?;
        self.used -= block.size;
        self.free_slots.push(id);
        Some(block.value)
    }

    pub fn get(&self, id: BlockId) -> Option<&T> {
        self.slots.get(id.index())?.as_ref().map(|b| &b.value)
    }

    pub fn get_mut(&mut self, id: BlockId) -> Option<&mut T> {
        self.slots.get_mut(id.index())?.as_mut().map(|b| &mut b.value)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Capacity in bytes.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Bytes currently held by live blocks.
    pub fn used(&self) -> usize {
        self.used
    }

    pub fn available(&self) -> usize {
        self.size - self.used
    }

    /// Number of live blocks.
    pub fn blocks(&self) -> usize {
        self.slots.len() - self.free_slots.len()
    }
}

fn align_up(size: usize) -> usize {
    size.max(1).div_ceil(ZONE_ALIGNMENT) * ZONE_ALIGNMENT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_accounts_aligned_size() {
        let mut zone = SlabZone::new("backend", 64);
        let id = zone.alloc(5, "a").unwrap();
        assert_eq!(zone.used(), 8);
        assert_eq!(zone.available(), 56);
        assert_eq!(zone.get(id), Some(&"a"));
        assert_eq!(zone.blocks(), 1);
    }

    #[test]
    fn test_alloc_fails_when_exhausted() {
        let mut zone = SlabZone::new("backend", 16);
        zone.alloc(16, 1u32).unwrap();

        let err = zone.alloc(1, 2u32).unwrap_err();
        assert_eq!(err.zone, "backend");
        assert_eq!(err.requested, 8);
        assert_eq!(err.available, 0);
        assert_eq!(zone.used(), 16);
        assert_eq!(zone.blocks(), 1);
    }

    #[test]
    fn test_free_returns_value_and_recycles_slot() {
        let mut zone = SlabZone::new("backend", 64);
        let a = zone.alloc(8, "a").unwrap();
        let _b = zone.alloc(8, "b").unwrap();

        assert_eq!(zone.free(a), Some("a"));
        assert_eq!(zone.used(), 8);

        let c = zone.alloc(8, "c").unwrap();
        assert_eq!(c, a);
        assert_eq!(zone.get(c), Some(&"c"));
    }

    #[test]
    fn test_double_free_is_ignored() {
        let mut zone = SlabZone::new("backend", 64);
        let a = zone.alloc(8, "a").unwrap();
        assert!(zone.free(a).is_some());
        assert!(zone.free(a).is_none());
        assert_eq!(zone.used(), 0);
        assert_eq!(zone.blocks(), 0);
    }

    #[test]
    fn test_error_display() {
        let err = ZoneExhausted {
            zone: "backend".into(),
            requested: 128,
            available: 64,
        };
        assert_eq!(
            err.to_string(),
            "zone \"backend\" exhausted: requested 128 bytes, 64 available"
        );
    }
}
