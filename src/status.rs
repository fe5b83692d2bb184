//! Per-block status rows.
//!
//! [`BlockSummary`] is what `Allocator::status` hands to a display: one row
//! per block, in index order. Rendering uses 1-based block numbers.
//!
//! # Examples
//!
//! ```rust
//! use bestfit_sim::Allocator;
//!
//! let mut allocator = Allocator::with_capacities(&[80, 250]).unwrap();
//! allocator.allocate(200).unwrap();
//!
//! let rows: Vec<String> = allocator.status().iter().map(|s| s.to_string()).collect();
//! assert_eq!(rows[0], "Block 1: 80 KB - Free: 80 KB - Empty");
//! assert_eq!(rows[1], "Block 2: 250 KB - Free: 50 KB - P200");
//! ```

use crate::block::{Allocation, AllocationId, Block};
use serde::Serialize;
use std::fmt;

/// One resident allocation as shown in a status row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResidentSummary {
    /// Unique handle.
    pub id: AllocationId,
    /// Display label (`P<size>`).
    pub label: String,
    /// Space occupied.
    pub size: u64,
}

impl From<&Allocation> for ResidentSummary {
    fn from(allocation: &Allocation) -> Self {
        Self {
            id: allocation.id(),
            label: allocation.label(),
            size: allocation.size(),
        }
    }
}

/// Snapshot of one block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockSummary {
    /// 0-based block index.
    pub index: usize,
    /// Total capacity.
    pub capacity: u64,
    /// Free space at snapshot time.
    pub free: u64,
    /// Residents in arrival order.
    pub residents: Vec<ResidentSummary>,
}

impl BlockSummary {
    pub(crate) fn of(index: usize, block: &Block) -> Self {
        Self {
            index,
            capacity: block.capacity(),
            free: block.free(),
            residents: block.residents().iter().map(ResidentSummary::from).collect(),
        }
    }

    /// Resident handles in arrival order.
    pub fn ids(&self) -> Vec<AllocationId> {
        self.residents.iter().map(|r| r.id).collect()
    }

    /// Resident labels in arrival order.
    pub fn labels(&self) -> Vec<&str> {
        self.residents.iter().map(|r| r.label.as_str()).collect()
    }

    /// Check if the block is fully occupied.
    pub const fn is_full(&self) -> bool {
        self.free == 0
    }
}

impl fmt::Display for BlockSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Block {}: {} KB - Free: {} KB - ",
            self.index + 1,
            self.capacity,
            self.free
        )?;
        if self.residents.is_empty() {
            write!(f, "Empty")
        } else {
            write!(f, "{}", self.labels().join(" | "))
        }
    }
}

/// Render rows one per line.
pub fn render(summaries: &[BlockSummary]) -> String {
    summaries
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render rows with resident handles, for callers that release by handle.
pub fn render_detailed(summaries: &[BlockSummary]) -> String {
    let mut out = String::new();
    for summary in summaries {
        out.push_str(&summary.to_string());
        out.push('\n');
        for resident in &summary.residents {
            out.push_str(&format!(
                "    {} {} ({} KB)\n",
                resident.id, resident.label, resident.size
            ));
        }
    }
    out
}

/// Render rows as a JSON array.
pub fn to_json(summaries: &[BlockSummary]) -> String {
    serde_json::to_string_pretty(summaries).unwrap_or_default()
}
