//! Core domain logic for the playtime bot.
//!
//! This crate contains the fundamental types and logic for:
//! - Records: per-user playtime totals and open sessions
//! - Accrual: opening, checkpointing, and closing sessions
//! - Roster: resolving display names to user IDs through a narrow seam

pub mod record;
pub mod roster;
pub mod tracker;
mod types;

pub use record::{MILLIS_PER_HOUR, UserRecord};
pub use roster::{MemberDirectory, RosterLookup, RosterMember};
pub use tracker::{AppliedOverride, LeaderboardEntry, PlaytimeTracker, UserNotFound};
pub use types::{UserId, ValidationError};
