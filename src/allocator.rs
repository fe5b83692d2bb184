//! Best-fit allocator over a fixed block table.
//!
//! The allocator owns an ordered list of fixed-capacity blocks and services
//! two mutations, allocate and release, plus a read-only status query.
//!
//! # Key Concepts
//!
//! ## Best fit
//!
//! Among all blocks whose free space can hold the request, pick the one with
//! the least free space. Ties go to the lowest block index.
//!
//! ## Fixed partitions
//!
//! Blocks are never split, merged, or resized. A process lives in exactly
//! one block, and several processes may share a block while space remains.
//!
//! ## Expected outcomes are not errors
//!
//! "Nothing fits" and "nothing to release" come back as
//! [`Placement::NoFit`] and [`Release::NotFound`]. Errors are reserved for
//! bad configuration and malformed requests. Every call is all-or-nothing.
//!
//! # Examples
//!
//! ```rust
//! use bestfit_sim::allocator::{Allocator, Placement, Release};
//!
//! let mut allocator = Allocator::default();
//!
//! let placed = allocator.allocate(200).unwrap();
//! assert_eq!(placed.block(), Some(1));
//!
//! assert_eq!(allocator.allocate(2000).unwrap(), Placement::NoFit);
//!
//! let id = placed.id().unwrap();
//! assert!(allocator.release(id).is_released());
//! assert_eq!(allocator.release(id), Release::NotFound);
//! ```

use crate::block::{Allocation, AllocationId, Block};
use crate::config::AllocatorConfig;
use crate::scan::{self, ScanTrace};
use crate::status::BlockSummary;
use crate::{Error, Result};
use log::{debug, info};
use serde::Serialize;

/// Outcome of an allocate call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Placement {
    /// The request was admitted.
    Placed {
        /// Index of the chosen block.
        block: usize,
        /// Handle of the new allocation.
        id: AllocationId,
        /// Display label of the new allocation.
        label: String,
    },
    /// No block has enough free space. Nothing changed.
    NoFit,
}

impl Placement {
    /// Check if the request was admitted.
    pub const fn is_placed(&self) -> bool {
        matches!(self, Self::Placed { .. })
    }

    /// Chosen block index.
    pub const fn block(&self) -> Option<usize> {
        match self {
            Self::Placed { block, .. } => Some(*block),
            Self::NoFit => None,
        }
    }

    /// Handle of the new allocation.
    pub const fn id(&self) -> Option<AllocationId> {
        match self {
            Self::Placed { id, .. } => Some(*id),
            Self::NoFit => None,
        }
    }
}

/// An allocation that has just been released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReleasedAllocation {
    /// Block it was resident in.
    pub block: usize,
    /// Its handle.
    pub id: AllocationId,
    /// Space returned to the block.
    pub size: u64,
}

/// Outcome of a release call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Release {
    /// The allocation was removed and its space returned.
    Released(ReleasedAllocation),
    /// Nothing matched. Nothing changed.
    NotFound,
}

impl Release {
    /// Check if something was released.
    pub const fn is_released(&self) -> bool {
        matches!(self, Self::Released(_))
    }

    /// Details of the released allocation.
    pub const fn released(&self) -> Option<ReleasedAllocation> {
        match self {
            Self::Released(r) => Some(*r),
            Self::NotFound => None,
        }
    }
}

/// Best-fit allocator.
///
/// # Examples
///
/// ```rust
/// use bestfit_sim::allocator::Allocator;
///
/// let mut allocator = Allocator::with_capacities(&[150, 150]).unwrap();
///
/// // Both blocks tie at 150 free; the lower index wins.
/// assert_eq!(allocator.allocate(100).unwrap().block(), Some(0));
/// // Block 0 now has 50 free, too small.
/// assert_eq!(allocator.allocate(100).unwrap().block(), Some(1));
/// ```
#[derive(Debug, Clone)]
pub struct Allocator {
    config: AllocatorConfig,

    /// Blocks in physical order.
    blocks: Vec<Block>,

    /// Next handle to mint.
    next_id: u64,
}

impl Default for Allocator {
    fn default() -> Self {
        Self::from_valid(AllocatorConfig::default())
    }
}

impl Allocator {
    /// Create an allocator with one empty block per configured capacity.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfiguration` if the capacity list is empty or
    /// holds a zero.
    pub fn new(config: AllocatorConfig) -> Result<Self> {
        config.validate()?;

        let allocator = Self::from_valid(config);
        info!(
            "allocator ready: {} blocks, {} total capacity",
            allocator.num_blocks(),
            allocator.config.total_capacity()
        );
        Ok(allocator)
    }

    fn from_valid(config: AllocatorConfig) -> Self {
        let blocks = config.capacities.iter().copied().map(Block::new).collect();
        Self {
            config,
            blocks,
            next_id: 1,
        }
    }

    /// Create an allocator from a capacity slice.
    pub fn with_capacities(capacities: &[u64]) -> Result<Self> {
        Self::new(AllocatorConfig::with_capacities(capacities))
    }

    /// Get configuration.
    pub const fn config(&self) -> &AllocatorConfig {
        &self.config
    }

    /// Number of blocks.
    pub fn num_blocks(&self) -> usize {
        self.blocks.len()
    }

    /// All blocks in index order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Get a block by index.
    pub fn block(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    /// Place a process of `size` in the best-fitting block.
    ///
    /// On success exactly one block loses `size` of free space and gains a
    /// resident allocation at the end of its list.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidRequest` if `size` is zero. A request that does
    /// not fit anywhere is `Ok(Placement::NoFit)`.
    pub fn allocate(&mut self, size: u64) -> Result<Placement> {
        if size == 0 {
            return Err(Error::invalid_request("process size must be positive"));
        }

        let Some(index) = scan::best_fit(self.blocks.iter().map(Block::free), size) else {
            debug!("no block fits {}", size);
            return Ok(Placement::NoFit);
        };

        let id = AllocationId::new(self.next_id);
        self.next_id += 1;

        let block = &mut self.blocks[index];
        let allocation = Allocation::new(id, size);
        block.admit(allocation);

        debug!(
            "placed {} ({}) in block {}, {} free",
            id,
            allocation.label(),
            index,
            block.free()
        );

        Ok(Placement::Placed {
            block: index,
            id,
            label: allocation.label(),
        })
    }

    /// Release the allocation with handle `id`.
    pub fn release(&mut self, id: AllocationId) -> Release {
        let found = self
            .blocks
            .iter()
            .enumerate()
            .find_map(|(index, block)| block.position_of(id).map(|pos| (index, pos)));

        self.evict(found, &id.to_string())
    }

    /// Release by display label (`P<size>`).
    ///
    /// Labels are not unique: when several residents share one, the first
    /// in block-index order, then arrival order, is removed.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bestfit_sim::allocator::Allocator;
    ///
    /// let mut allocator = Allocator::default();
    /// let first = allocator.allocate(200).unwrap().id().unwrap();
    ///
    /// let released = allocator.release_label("P200").released().unwrap();
    /// assert_eq!(released.id, first);
    /// assert!(!allocator.release_label("P200").is_released());
    /// ```
    pub fn release_label(&mut self, label: &str) -> Release {
        let found = self
            .blocks
            .iter()
            .enumerate()
            .find_map(|(index, block)| block.position_of_label(label).map(|pos| (index, pos)));

        self.evict(found, label)
    }

    fn evict(&mut self, found: Option<(usize, usize)>, key: &str) -> Release {
        let Some((index, pos)) = found else {
            debug!("release of {} found nothing", key);
            return Release::NotFound;
        };

        let allocation = self.blocks[index].evict(pos);
        debug!(
            "released {} from block {}, {} free",
            allocation.id(),
            index,
            self.blocks[index].free()
        );

        Release::Released(ReleasedAllocation {
            block: index,
            id: allocation.id(),
            size: allocation.size(),
        })
    }

    /// Locate a resident allocation: `(block index, size)`.
    pub fn find(&self, id: AllocationId) -> Option<(usize, u64)> {
        self.blocks.iter().enumerate().find_map(|(index, block)| {
            block
                .residents()
                .iter()
                .find(|a| a.id() == id)
                .map(|a| (index, a.size()))
        })
    }

    /// Snapshot of every block in index order.
    pub fn status(&self) -> Vec<BlockSummary> {
        self.blocks
            .iter()
            .enumerate()
            .map(|(index, block)| BlockSummary::of(index, block))
            .collect()
    }

    /// Replay the best-fit search for `size` without allocating.
    ///
    /// The trace's choice is the block `allocate(size)` would pick now.
    pub fn scan(&self, size: u64) -> ScanTrace {
        scan::trace(&self.blocks, size)
    }

    /// Get memory usage statistics.
    pub fn memory_stats(&self) -> MemoryStats {
        let total_capacity = self.config.total_capacity();
        let free: u64 = self.blocks.iter().map(Block::free).sum();

        MemoryStats {
            total_blocks: self.blocks.len(),
            total_capacity,
            free,
            used: total_capacity - free,
            num_allocations: self.blocks.iter().map(|b| b.residents().len()).sum(),
            largest_free: self.blocks.iter().map(Block::free).max().unwrap_or(0),
            full_blocks: self.blocks.iter().filter(|b| b.free() == 0).count(),
        }
    }
}

/// Memory usage statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemoryStats {
    /// Number of blocks.
    pub total_blocks: usize,
    /// Sum of capacities.
    pub total_capacity: u64,
    /// Sum of free space.
    pub free: u64,
    /// Sum of occupied space.
    pub used: u64,
    /// Resident allocations across all blocks.
    pub num_allocations: usize,
    /// Largest request that would currently fit.
    pub largest_free: u64,
    /// Blocks with no free space left.
    pub full_blocks: usize,
}

impl MemoryStats {
    /// Calculate utilization as a fraction.
    pub fn utilization(&self) -> f64 {
        if self.total_capacity == 0 {
            0.0
        } else {
            self.used as f64 / self.total_capacity as f64
        }
    }

    /// Free space that no single request can use: everything outside the
    /// largest free block.
    pub const fn stranded(&self) -> u64 {
        self.free - self.largest_free
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::block::label_for;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    enum Op {
        Allocate(u64),
        Release(usize),
        ReleaseLabel(u64),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (1u64..400).prop_map(Op::Allocate),
            (0usize..16).prop_map(Op::Release),
        ]
    }

    /// First resident of `size` in block order, then arrival order.
    fn first_of_size(allocator: &Allocator, size: u64) -> Option<(usize, AllocationId)> {
        allocator.blocks().iter().enumerate().find_map(|(index, block)| {
            block
                .residents()
                .iter()
                .find(|a| a.size() == size)
                .map(|a| (index, a.id()))
        })
    }

    fn check_accounting(allocator: &Allocator) -> std::result::Result<(), TestCaseError> {
        for block in allocator.blocks() {
            let resident: u64 = block.residents().iter().map(|a| a.size()).sum();
            prop_assert_eq!(block.free() + resident, block.capacity());
            prop_assert!(block.free() <= block.capacity());
        }
        Ok(())
    }

    proptest! {
        #[test]
        fn prop_free_accounting(capacities in prop::collection::vec(1u64..500, 1..8), ops in prop::collection::vec(op(), 1..40)) {
            let mut allocator = Allocator::with_capacities(&capacities).unwrap();
            let mut live: Vec<AllocationId> = Vec::new();

            for op in ops {
                match op {
                    Op::Allocate(size) => {
                        if let Some(id) = allocator.allocate(size).unwrap().id() {
                            live.push(id);
                        }
                    }
                    Op::Release(n) if !live.is_empty() => {
                        let id = live.remove(n % live.len());
                        prop_assert!(allocator.release(id).is_released());
                    }
                    Op::Release(_) | Op::ReleaseLabel(_) => {}
                }
                check_accounting(&allocator)?;
            }
        }

        #[test]
        fn prop_release_label_first_match(
            capacities in prop::collection::vec(20u64..200, 1..6),
            ops in prop::collection::vec(
                prop_oneof![
                    (1u64..40).prop_map(Op::Allocate),
                    (1u64..40).prop_map(Op::ReleaseLabel),
                ],
                1..60,
            ),
        ) {
            let mut allocator = Allocator::with_capacities(&capacities).unwrap();

            for op in ops {
                match op {
                    Op::Allocate(size) => {
                        allocator.allocate(size).unwrap();
                    }
                    Op::ReleaseLabel(size) => {
                        let expected = first_of_size(&allocator, size);
                        let before = allocator.status();
                        let outcome = allocator.release_label(&label_for(size));

                        match expected {
                            Some((block, id)) => {
                                let released = outcome.released();
                                prop_assert_eq!(
                                    released,
                                    Some(ReleasedAllocation { block, id, size })
                                );
                                prop_assert_eq!(allocator.find(id), None);
                            }
                            None => {
                                prop_assert_eq!(outcome, Release::NotFound);
                                prop_assert_eq!(allocator.status(), before);
                            }
                        }
                    }
                    Op::Release(_) => {}
                }
                check_accounting(&allocator)?;
            }
        }

        #[test]
        fn prop_best_fit_choice(capacities in prop::collection::vec(1u64..500, 1..8), warmup in prop::collection::vec(1u64..200, 0..6), size in 1u64..600) {
            let mut allocator = Allocator::with_capacities(&capacities).unwrap();
            for w in warmup {
                allocator.allocate(w).unwrap();
            }

            let before: Vec<u64> = allocator.blocks().iter().map(Block::free).collect();
            let placement = allocator.allocate(size).unwrap();

            match placement.block() {
                Some(chosen) => {
                    prop_assert!(before[chosen] >= size);
                    for (i, &free) in before.iter().enumerate() {
                        if free >= size {
                            prop_assert!(free > before[chosen] || (free == before[chosen] && i >= chosen));
                        }
                    }
                    prop_assert_eq!(allocator.block(chosen).unwrap().free(), before[chosen] - size);
                }
                None => {
                    prop_assert!(before.iter().all(|&f| f < size));
                    let after: Vec<u64> = allocator.blocks().iter().map(Block::free).collect();
                    prop_assert_eq!(after, before);
                }
            }
        }

        #[test]
        fn prop_allocate_release_round_trip(capacities in prop::collection::vec(1u64..500, 1..8), warmup in prop::collection::vec(1u64..200, 0..6), size in 1u64..500) {
            let mut allocator = Allocator::with_capacities(&capacities).unwrap();
            for w in warmup {
                allocator.allocate(w).unwrap();
            }

            let before = allocator.status();
            if let Some(id) = allocator.allocate(size).unwrap().id() {
                prop_assert!(allocator.release(id).is_released());
            }
            prop_assert_eq!(allocator.status(), before);
        }
    }
}
