//! Best-fit selection and scan replay.
//!
//! [`best_fit`] is the one placement routine; the allocator calls it and so
//! does [`trace`]. A presentation layer that wants to animate the search
//! replays the [`ScanTrace`] at its own pace; the allocator itself never
//! waits.
//!
//! # Examples
//!
//! ```rust
//! use bestfit_sim::scan::best_fit;
//!
//! // Smallest free space that still fits 200 is 250, at index 1.
//! assert_eq!(best_fit([80, 250, 325, 550, 1000, 150], 200), Some(1));
//!
//! // Ties go to the lowest index.
//! assert_eq!(best_fit([150, 150], 100), Some(0));
//!
//! assert_eq!(best_fit([10, 20], 30), None);
//! ```

use crate::block::Block;
use serde::Serialize;

/// Pick the block with the least free space that is still `>= size`.
///
/// Blocks are scanned in index order and the current best is replaced only
/// on a strictly smaller free value, so the lowest index wins ties.
pub fn best_fit(frees: impl IntoIterator<Item = u64>, size: u64) -> Option<usize> {
    let mut best: Option<(usize, u64)> = None;

    for (index, free) in frees.into_iter().enumerate() {
        if free < size {
            continue;
        }
        match best {
            Some((_, best_free)) if free >= best_free => {}
            _ => best = Some((index, free)),
        }
    }

    best.map(|(index, _)| index)
}

/// One block visited during a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScanStep {
    /// Block index.
    pub index: usize,
    /// Free space of the block when visited.
    pub free: u64,
    /// Whether the block could hold the request.
    pub candidate: bool,
    /// Best block found so far, including this one.
    pub best_so_far: Option<usize>,
}

/// Full record of a best-fit search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanTrace {
    /// Requested size.
    pub size: u64,
    /// Steps in index order, one per block.
    pub steps: Vec<ScanStep>,
    /// Final choice, `None` if nothing fits.
    pub chosen: Option<usize>,
}

impl ScanTrace {
    /// Number of blocks that could hold the request.
    pub fn num_candidates(&self) -> usize {
        self.steps.iter().filter(|s| s.candidate).count()
    }

    /// Check if the search found a block.
    pub const fn is_fit(&self) -> bool {
        self.chosen.is_some()
    }
}

/// Replay the search for `size` over `blocks` without changing anything.
pub fn trace(blocks: &[Block], size: u64) -> ScanTrace {
    let mut steps = Vec::with_capacity(blocks.len());
    let mut best: Option<usize> = None;

    for (index, block) in blocks.iter().enumerate() {
        let candidate = block.fits(size);
        if candidate && best.is_none_or(|b| block.free() < blocks[b].free()) {
            best = Some(index);
        }
        steps.push(ScanStep {
            index,
            free: block.free(),
            candidate,
            best_so_far: best,
        });
    }

    let chosen = best_fit(blocks.iter().map(Block::free), size);
    debug_assert_eq!(chosen, best);
    log::trace!("scan for {} visited {} blocks, chose {:?}", size, steps.len(), chosen);

    ScanTrace {
        size,
        steps,
        chosen,
    }
}
