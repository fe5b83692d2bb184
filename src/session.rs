//! Line-oriented command front end.
//!
//! A [`Session`] wraps an [`Allocator`] and turns text commands into calls
//! and human-readable replies. The `bestfit` binary feeds it stdin; tests
//! and demos feed it strings.
//!
//! | Command | Effect |
//! |---------|--------|
//! | `alloc <size>` | best-fit allocate |
//! | `release <#id or P<size>>` | release by handle or by label |
//! | `scan <size>` | show the search without allocating |
//! | `status` | one row per block |
//! | `stats` | totals |
//! | `help` | command list |
//! | `quit` | end the session |
//!
//! # Examples
//!
//! ```rust
//! use bestfit_sim::session::{Reply, Session};
//! use bestfit_sim::Allocator;
//!
//! let mut session = Session::new(Allocator::default());
//!
//! let reply = session.handle_line("alloc 200");
//! assert_eq!(reply, Reply::Text("Allocated P200 (#1) in block 2, 50 KB free.".into()));
//!
//! let reply = session.handle_line("alloc 2000");
//! assert_eq!(reply, Reply::Text("No suitable block for process of size 2000 KB.".into()));
//!
//! assert_eq!(session.handle_line("quit"), Reply::Quit);
//! ```

use crate::allocator::{Allocator, Placement, Release};
use crate::block::{parse_label, AllocationId};
use crate::scan::ScanTrace;
use crate::status;
use crate::{Error, Result};
use log::warn;

/// What a `release` command refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseKey {
    /// A unique handle, written `#N`.
    Id(AllocationId),
    /// A size-derived label, written `P<size>`.
    Label(String),
}

/// A parsed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Allocate a process of the given size.
    Allocate(u64),
    /// Release an allocation.
    Release(ReleaseKey),
    /// Replay the search for a size.
    Scan(u64),
    /// Show block status.
    Status,
    /// Show memory statistics.
    Stats,
    /// Show the command list.
    Help,
    /// End the session.
    Quit,
}

impl Command {
    /// Parse one input line.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidRequest` for an unknown command, a missing
    /// argument, or a size that is not a positive integer.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bestfit_sim::session::{Command, ReleaseKey};
    ///
    /// assert_eq!(Command::parse("alloc 64").unwrap(), Command::Allocate(64));
    /// assert_eq!(
    ///     Command::parse("release P64").unwrap(),
    ///     Command::Release(ReleaseKey::Label("P64".into()))
    /// );
    /// assert!(Command::parse("alloc ten").is_err());
    /// ```
    pub fn parse(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Err(Error::invalid_request("empty command"));
        };
        let arg = words.next();
        if words.next().is_some() {
            return Err(Error::invalid_request(format!("too many arguments to '{verb}'")));
        }

        let command = match (verb.to_ascii_lowercase().as_str(), arg) {
            ("alloc" | "allocate", Some(size)) => Self::Allocate(parse_size(size)?),
            ("release" | "free", Some(key)) => Self::Release(parse_release_key(key)?),
            ("scan", Some(size)) => Self::Scan(parse_size(size)?),
            ("status", None) => Self::Status,
            ("stats", None) => Self::Stats,
            ("help", None) => Self::Help,
            ("quit" | "exit", None) => Self::Quit,
            ("alloc" | "allocate" | "release" | "free" | "scan", None) => {
                return Err(Error::invalid_request(format!("'{verb}' needs an argument")));
            }
            _ => return Err(Error::invalid_request(format!("unknown command '{line}'"))),
        };
        Ok(command)
    }
}

/// Parse a process size typed by a user.
///
/// # Errors
///
/// Returns `Error::InvalidRequest` unless the text is a positive integer.
pub fn parse_size(text: &str) -> Result<u64> {
    match text.trim().parse::<u64>() {
        Ok(size) if size > 0 => Ok(size),
        _ => Err(Error::invalid_request(format!(
            "'{}' is not a valid process size",
            text.trim()
        ))),
    }
}

fn parse_release_key(text: &str) -> Result<ReleaseKey> {
    if let Some(id) = AllocationId::parse(text) {
        return Ok(ReleaseKey::Id(id));
    }
    if parse_label(text).is_some() {
        return Ok(ReleaseKey::Label(text.to_string()));
    }
    Err(Error::invalid_request(format!(
        "'{text}' is neither a handle (#N) nor a label (P<size>)"
    )))
}

/// Result of handling one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Text to show; the session continues.
    Text(String),
    /// The session is over.
    Quit,
}

/// Help text listing the commands.
pub const HELP: &str = "\
commands:
  alloc <size>       allocate a process of <size> KB
  release <#id|P<n>> release by handle or label
  scan <size>        show the best-fit search without allocating
  status             show every block
  stats              show totals
  quit               leave";

/// An allocator driven by text commands.
#[derive(Debug, Clone)]
pub struct Session {
    allocator: Allocator,
    json: bool,
}

impl Session {
    /// Create a session rendering plain text.
    pub fn new(allocator: Allocator) -> Self {
        Self {
            allocator,
            json: false,
        }
    }

    /// Render `status`, `stats` and `scan` as JSON.
    pub fn json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    /// Get the underlying allocator.
    pub const fn allocator(&self) -> &Allocator {
        &self.allocator
    }

    /// Parse and execute one line. Parse errors become text replies.
    pub fn handle_line(&mut self, line: &str) -> Reply {
        match Command::parse(line) {
            Ok(command) => self.execute(command),
            Err(e) => {
                warn!("{}: {}", e.code(), e);
                Reply::Text(format!("Error: {e}"))
            }
        }
    }

    /// Execute a parsed command.
    pub fn execute(&mut self, command: Command) -> Reply {
        let text = match command {
            Command::Allocate(size) => self.allocate(size),
            Command::Release(key) => self.release(&key),
            Command::Scan(size) => self.render_scan(&self.allocator.scan(size)),
            Command::Status => self.render_status(),
            Command::Stats => self.render_stats(),
            Command::Help => HELP.to_string(),
            Command::Quit => return Reply::Quit,
        };
        Reply::Text(text)
    }

    fn allocate(&mut self, size: u64) -> String {
        match self.allocator.allocate(size) {
            Ok(Placement::Placed { block, id, label }) => {
                let free = self.allocator.block(block).map_or(0, |b| b.free());
                format!(
                    "Allocated {} ({}) in block {}, {} KB free.",
                    label,
                    id,
                    block + 1,
                    free
                )
            }
            Ok(Placement::NoFit) => {
                format!("No suitable block for process of size {size} KB.")
            }
            Err(e) => format!("Error: {e}"),
        }
    }

    fn release(&mut self, key: &ReleaseKey) -> String {
        let (outcome, shown) = match key {
            ReleaseKey::Id(id) => (self.allocator.release(*id), id.to_string()),
            ReleaseKey::Label(label) => (self.allocator.release_label(label), label.clone()),
        };

        match outcome {
            Release::Released(r) => format!(
                "Released {} ({} KB) from block {}.",
                r.id,
                r.size,
                r.block + 1
            ),
            Release::NotFound => format!("Process {shown} not found."),
        }
    }

    fn render_scan(&self, trace: &ScanTrace) -> String {
        if self.json {
            return serde_json::to_string_pretty(trace).unwrap_or_default();
        }

        let mut lines: Vec<String> = trace
            .steps
            .iter()
            .map(|step| {
                let verdict = if step.candidate { "fits" } else { "too small" };
                let best = step
                    .best_so_far
                    .map_or_else(|| "none".to_string(), |b| format!("block {}", b + 1));
                format!(
                    "block {}: {} KB free, {}, best so far: {}",
                    step.index + 1,
                    step.free,
                    verdict,
                    best
                )
            })
            .collect();

        lines.push(match trace.chosen {
            Some(index) => format!("-> block {} for {} KB", index + 1, trace.size),
            None => format!("-> no block fits {} KB", trace.size),
        });
        lines.join("\n")
    }

    fn render_status(&self) -> String {
        let summaries = self.allocator.status();
        if self.json {
            status::to_json(&summaries)
        } else {
            status::render_detailed(&summaries).trim_end().to_string()
        }
    }

    fn render_stats(&self) -> String {
        let stats = self.allocator.memory_stats();
        if self.json {
            return serde_json::to_string_pretty(&stats).unwrap_or_default();
        }
        format!(
            "{} blocks, {} KB total, {} KB used, {} KB free ({:.1}% used)\n\
             {} allocations, largest free block {} KB, {} full blocks",
            stats.total_blocks,
            stats.total_capacity,
            stats.used,
            stats.free,
            stats.utilization() * 100.0,
            stats.num_allocations,
            stats.largest_free,
            stats.full_blocks
        )
    }
}
