//! Command-line argument definitions.

use std::path::PathBuf;

use clap::Parser;

/// Presence-tracking playtime bot.
///
/// Reads gateway events from a chat-platform adapter on stdin, accrues
/// per-user playtime for a configured set of games, and writes command
/// replies to stdout.
#[derive(Debug, Parser)]
#[command(name = "ptbot", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
