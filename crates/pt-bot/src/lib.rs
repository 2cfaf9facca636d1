//! Playtime bot runtime.
//!
//! Wires the accrual engine to a chat-platform adapter: gateway events come
//! in as JSON lines, command replies go out the same way, and a periodic
//! ticker checkpoints open sessions.

mod cli;
pub mod commands;
mod config;
pub mod gateway;
pub mod runtime;

pub use cli::Cli;
pub use config::Config;
