//! Best-Fit Allocation Simulator
//!
//! Simulates best-fit placement of variable-sized processes into a fixed
//! set of fixed-size memory blocks.
//!
//! # Overview
//!
//! - **Allocator**: the block table, best-fit allocate, release, status
//! - **Config**: capacity lists from code, JSON, or a comma separated string
//! - **Scan**: the placement routine and a replayable trace of its search
//! - **Status**: per-block rows for a display
//! - **Session**: a text command front end used by the `bestfit` binary
//!
//! # Model
//!
//! | Concept | Meaning |
//! |---------|---------|
//! | Block | fixed capacity partition, identified by index |
//! | Allocation | one process resident in exactly one block |
//! | Free space | capacity minus the sizes of resident allocations |
//! | Best fit | least free space that still fits, lowest index on ties |
//!
//! Blocks are never split, merged, or resized, and allocations never span
//! blocks. Sizes are unit-agnostic positive integers (the reference layout
//! reads them as KB).
//!
//! # Examples
//!
//! ```rust
//! use bestfit_sim::{Allocator, AllocatorConfig, Placement};
//!
//! let mut allocator = Allocator::new(AllocatorConfig::default()).unwrap();
//!
//! let placed = allocator.allocate(200).unwrap();
//! assert_eq!(placed.block(), Some(1));
//!
//! let placed = allocator.allocate(1000).unwrap();
//! assert_eq!(placed.block(), Some(4));
//!
//! assert_eq!(allocator.allocate(2000).unwrap(), Placement::NoFit);
//!
//! for row in allocator.status() {
//!     println!("{row}");
//! }
//! ```
//!
//! # Logging
//!
//! Decisions are logged through the `log` facade (`debug` per placement and
//! release, `trace` per scan). Install any logger to see them.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::use_self)]
#![allow(clippy::redundant_closure_for_method_calls)]
#![allow(clippy::significant_drop_tightening)]

pub mod allocator;
pub mod block;
pub mod config;
pub mod error;
pub mod scan;
pub mod session;
pub mod status;

pub use allocator::{Allocator, MemoryStats, Placement, Release, ReleasedAllocation};
pub use block::{Allocation, AllocationId, Block};
pub use config::AllocatorConfig;
pub use error::{Error, Result};
pub use status::BlockSummary;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
