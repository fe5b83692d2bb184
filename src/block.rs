//! Blocks and the allocations resident in them.
//!
//! A [`Block`] is one fixed-capacity partition. Its `free` space is kept
//! equal to `capacity` minus the sizes of its resident [`Allocation`]s;
//! only the allocator mutates it, one whole allocation at a time.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique handle of an allocation.
///
/// Minted from a per-allocator counter, so two resident allocations never
/// share a handle even when their sizes (and labels) are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AllocationId(pub u64);

impl AllocationId {
    /// Create a new allocation ID.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// Parse the `#N` form produced by `Display`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bestfit_sim::block::AllocationId;
    ///
    /// assert_eq!(AllocationId::parse("#7"), Some(AllocationId::new(7)));
    /// assert_eq!(AllocationId::parse("7"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        s.strip_prefix('#')?.parse().ok().map(Self)
    }
}

impl fmt::Display for AllocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Display label for an allocation of `size`: `P<size>`.
pub fn label_for(size: u64) -> String {
    format!("P{size}")
}

/// Recover the size from a `P<size>` label.
///
/// # Examples
///
/// ```rust
/// use bestfit_sim::block::{label_for, parse_label};
///
/// assert_eq!(parse_label(&label_for(200)), Some(200));
/// assert_eq!(parse_label("Q200"), None);
/// assert_eq!(parse_label("P0"), None);
/// assert_eq!(parse_label("P0200"), None);
/// ```
pub fn parse_label(label: &str) -> Option<u64> {
    label
        .strip_prefix('P')?
        .parse::<u64>()
        .ok()
        .filter(|&size| size > 0 && label_for(size) == label)
}

/// A process occupying space in exactly one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    id: AllocationId,
    size: u64,
}

impl Allocation {
    pub(crate) const fn new(id: AllocationId, size: u64) -> Self {
        Self { id, size }
    }

    /// Unique handle.
    pub const fn id(&self) -> AllocationId {
        self.id
    }

    /// Space occupied.
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// Size-derived display label.
    pub fn label(&self) -> String {
        label_for(self.size)
    }
}

/// A fixed-capacity partition of the simulated memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    capacity: u64,
    free: u64,
    /// Resident allocations in arrival order.
    resident: Vec<Allocation>,
}

impl Block {
    pub(crate) fn new(capacity: u64) -> Self {
        Self {
            capacity,
            free: capacity,
            resident: Vec::new(),
        }
    }

    /// Total capacity, fixed at construction.
    pub const fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Currently unallocated space.
    pub const fn free(&self) -> u64 {
        self.free
    }

    /// Space taken by resident allocations.
    pub const fn used(&self) -> u64 {
        self.capacity - self.free
    }

    /// Resident allocations in arrival order.
    pub fn residents(&self) -> &[Allocation] {
        &self.resident
    }

    /// Check if nothing is resident.
    pub fn is_empty(&self) -> bool {
        self.resident.is_empty()
    }

    /// Check if a request of `size` fits in the remaining space.
    pub const fn fits(&self, size: u64) -> bool {
        self.free >= size
    }

    /// Place an allocation. The caller has already checked `fits`.
    pub(crate) fn admit(&mut self, allocation: Allocation) {
        debug_assert!(self.fits(allocation.size()));
        self.free -= allocation.size();
        self.resident.push(allocation);
    }

    /// Remove the resident allocation at `position` and return its space.
    pub(crate) fn evict(&mut self, position: usize) -> Allocation {
        let allocation = self.resident.remove(position);
        self.free += allocation.size();
        allocation
    }

    pub(crate) fn position_of(&self, id: AllocationId) -> Option<usize> {
        self.resident.iter().position(|a| a.id() == id)
    }

    pub(crate) fn position_of_label(&self, label: &str) -> Option<usize> {
        self.resident.iter().position(|a| a.label() == label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocation_id() {
        let id = AllocationId::new(42);
        assert_eq!(id.value(), 42);
        assert_eq!(id.to_string(), "#42");
        assert_eq!(AllocationId::parse("#42"), Some(id));
        assert_eq!(AllocationId::parse("#x"), None);
        assert_eq!(AllocationId::parse(""), None);
    }

    #[test]
    fn test_labels() {
        assert_eq!(label_for(200), "P200");
        assert_eq!(parse_label("P200"), Some(200));
        assert_eq!(parse_label("P"), None);
        assert_eq!(parse_label("p200"), None);
        assert_eq!(parse_label("P-1"), None);
        assert_eq!(parse_label("P0200"), None);
        assert_eq!(parse_label("P+200"), None);
        assert_eq!(parse_label("P 200"), None);
        assert_eq!(parse_label("P200 "), None);
    }

    #[test]
    fn test_block_new() {
        let block = Block::new(250);
        assert_eq!(block.capacity(), 250);
        assert_eq!(block.free(), 250);
        assert_eq!(block.used(), 0);
        assert!(block.is_empty());
        assert!(block.fits(250));
        assert!(!block.fits(251));
    }

    #[test]
    fn test_block_admit_evict() {
        let mut block = Block::new(250);
        block.admit(Allocation::new(AllocationId::new(1), 200));
        block.admit(Allocation::new(AllocationId::new(2), 30));

        assert_eq!(block.free(), 20);
        assert_eq!(block.used(), 230);
        assert_eq!(block.residents().len(), 2);

        let pos = block.position_of(AllocationId::new(1)).unwrap();
        let evicted = block.evict(pos);
        assert_eq!(evicted.size(), 200);
        assert_eq!(block.free(), 220);
        assert_eq!(block.residents()[0].id(), AllocationId::new(2));
    }

    #[test]
    fn test_block_position_of_label_first_match() {
        let mut block = Block::new(100);
        block.admit(Allocation::new(AllocationId::new(1), 10));
        block.admit(Allocation::new(AllocationId::new(2), 20));
        block.admit(Allocation::new(AllocationId::new(3), 20));

        assert_eq!(block.position_of_label("P20"), Some(1));
        assert_eq!(block.position_of_label("P30"), None);
        assert_eq!(block.position_of_label("junk"), None);
        assert_eq!(block.position_of_label("P020"), None);
        assert_eq!(block.position_of_label("P+20"), None);
    }
}
