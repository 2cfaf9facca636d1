//! Chat command parsing and replies.
//!
//! Two exact-prefix commands: `!scoreboard` and
//! `!setplaytime <username> <hours>`. Anything malformed degrades to a
//! user-visible usage hint; command handling never fails.

use pt_core::{PlaytimeTracker, RosterLookup};

const USAGE: &str = "Usage: !setplaytime <username> <hours>";
const INVALID_HOURS: &str = "Please provide a valid number of hours.";
const NO_DATA: &str = "No playtime data recorded yet!";

/// Result of handling a command message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    /// Text to send back to the originating channel.
    pub reply: String,
    /// Whether tracker state changed, to gate a persistence write.
    pub mutated: bool,
}

impl CommandOutcome {
    fn reply_only(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            mutated: false,
        }
    }
}

/// Handles a raw message, returning a reply if it was a recognized command.
///
/// Non-command messages return `None` and are ignored.
pub fn respond(
    content: &str,
    tracker: &mut PlaytimeTracker,
    roster: &dyn RosterLookup,
) -> Option<CommandOutcome> {
    if content == "!scoreboard" {
        Some(CommandOutcome::reply_only(scoreboard_reply(tracker)))
    } else if content.starts_with("!setplaytime") {
        Some(set_playtime_reply(content, tracker, roster))
    } else {
        None
    }
}

fn scoreboard_reply(tracker: &PlaytimeTracker) -> String {
    let board = tracker.leaderboard();
    if board.is_empty() {
        return NO_DATA.to_string();
    }
    let lines: Vec<String> = board
        .iter()
        .map(|entry| format!("{}. {}: {:.2} hours", entry.rank, entry.name, entry.hours))
        .collect();
    format!("**Top crafters:**\n{}", lines.join("\n"))
}

fn set_playtime_reply(
    content: &str,
    tracker: &mut PlaytimeTracker,
    roster: &dyn RosterLookup,
) -> CommandOutcome {
    let args: Vec<&str> = content.split_whitespace().collect();
    if args.len() != 3 {
        return CommandOutcome::reply_only(USAGE);
    }
    let username = args[1];

    let Ok(hours) = args[2].parse::<f64>() else {
        return CommandOutcome::reply_only(INVALID_HOURS);
    };
    if !hours.is_finite() || hours < 0.0 {
        return CommandOutcome::reply_only(INVALID_HOURS);
    }

    match tracker.set_playtime(username, hours, roster) {
        Ok(applied) if applied.created => CommandOutcome {
            reply: format!("User {username} added with {hours} hours of playtime."),
            mutated: true,
        },
        Ok(_) => CommandOutcome {
            reply: format!("Set {username}'s playtime to {hours} hours."),
            mutated: true,
        },
        Err(_) => {
            CommandOutcome::reply_only(format!("User {username} not found in the server."))
        }
    }
}
