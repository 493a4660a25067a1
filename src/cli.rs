//! Command-line interface, built on clap derive.
//!
//! Two subcommands: `run` performs the removal batch, `scan` is a
//! read-only pass showing which selected items hold the value.

use clap::{Parser, Subcommand};

/// fixsweep removes a fix version from every JIRA issue matching a
/// JQL query, working around workflow edit restrictions where it can.
#[derive(Debug, Parser)]
#[command(name = "fixsweep", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Stop after this many matching items.
    #[arg(long, global = true)]
    pub max_results: Option<u32>,

    /// Search page size (overrides the configured value).
    #[arg(long, global = true)]
    pub page_size: Option<u32>,

    /// Verbose output (per-item phase trail).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Remove VALUE from the fix versions of every item matching QUERY.
    Run {
        /// JQL query selecting the items to sweep.
        query: String,
        /// The fix version to remove.
        value: String,
    },

    /// List matching items and whether they hold VALUE. No writes.
    Scan {
        /// JQL query selecting the items to inspect.
        query: String,
        /// The fix version to look for.
        value: String,
    },
}
