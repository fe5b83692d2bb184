//! `bestfit`: drive the best-fit simulator from the terminal.
//!
//! ```bash
//! echo -e "alloc 200\nalloc 1000\nstatus" | bestfit
//! bestfit --blocks 150,150 --json
//! ```

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use bestfit_sim::config::{parse_capacities, AllocatorConfig};
use bestfit_sim::session::{Reply, Session};
use bestfit_sim::{status, Allocator};
use clap::Parser;
use log::{info, LevelFilter};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "bestfit")]
#[command(about = "Best-fit memory allocation simulator")]
struct Args {
    /// Block capacities in KB, comma separated (e.g. "80,250,325")
    #[arg(long, conflicts_with = "config")]
    blocks: Option<String>,

    /// JSON file holding `{"capacities": [...]}` or a bare array
    #[arg(long)]
    config: Option<PathBuf>,

    /// Render status, stats and scans as JSON
    #[arg(long)]
    json: bool,
}

impl Args {
    fn allocator_config(&self) -> Result<AllocatorConfig> {
        if let Some(list) = &self.blocks {
            return Ok(parse_capacities(list)?);
        }
        if let Some(path) = &self.config {
            let json = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            return AllocatorConfig::from_json(&json)
                .with_context(|| format!("loading {}", path.display()));
        }
        Ok(AllocatorConfig::default())
    }
}

fn init_logging() {
    let mut builder = pretty_env_logger::formatted_builder();
    builder.filter_level(LevelFilter::Warn);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.init();
}

fn main() -> Result<()> {
    init_logging();

    let args = Args::parse();
    let allocator = Allocator::new(args.allocator_config()?)?;
    info!("starting with {:?}", allocator.config().capacities);

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", status::render(&allocator.status()))?;

    let mut session = Session::new(allocator).json(args.json);
    for line in io::stdin().lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match session.handle_line(&line) {
            Reply::Text(text) => writeln!(stdout, "{text}")?,
            Reply::Quit => break,
        }
    }

    Ok(())
}
