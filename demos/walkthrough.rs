//! Best-Fit Walkthrough
//!
//! Runs the reference layout through a few allocations and releases,
//! replaying each search step by step the way a visual front end would.
//!
//! # Run
//!
//! ```bash
//! RUST_LOG=debug cargo run --example walkthrough
//! ```

use std::thread;
use std::time::Duration;

use bestfit_sim::scan::ScanTrace;
use bestfit_sim::{status, Allocator, AllocatorConfig, Placement};

const STEP_DELAY: Duration = Duration::from_millis(150);

fn replay(trace: &ScanTrace) {
    for step in &trace.steps {
        let mark = match (step.candidate, step.best_so_far == Some(step.index)) {
            (true, true) => "best so far",
            (true, false) => "fits",
            (false, _) => "too small",
        };
        println!("    checking block {}: {} KB free ... {}", step.index + 1, step.free, mark);
        thread::sleep(STEP_DELAY);
    }
}

fn main() {
    pretty_env_logger::init();

    println!("=== Best-Fit Allocation Demo ===\n");

    let config = AllocatorConfig::default();
    println!("Blocks: {:?} KB\n", config.capacities);

    let mut allocator = Allocator::new(config).expect("reference layout is valid");
    println!("{}\n", status::render(&allocator.status()));

    let mut first = None;
    for size in [200, 1000, 2000, 120, 70] {
        println!("Allocate {} KB:", size);
        replay(&allocator.scan(size));

        match allocator.allocate(size).expect("sizes are positive") {
            Placement::Placed { block, id, label } => {
                println!("  -> {} ({}) placed in block {}\n", label, id, block + 1);
                first.get_or_insert(id);
            }
            Placement::NoFit => println!("  -> no suitable block for {} KB\n", size),
        }
    }

    println!("{}\n", status::render(&allocator.status()));

    if let Some(id) = first {
        println!("Release {}: {:?}", id, allocator.release(id));
        println!("Release {} again: {:?}\n", id, allocator.release(id));
    }

    println!("{}\n", status::render(&allocator.status()));

    let stats = allocator.memory_stats();
    println!(
        "Utilization: {:.1}% ({} of {} KB), largest free block {} KB",
        stats.utilization() * 100.0,
        stats.used,
        stats.total_capacity,
        stats.largest_free
    );
}
