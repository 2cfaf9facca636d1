//! Gateway wire types.
//!
//! The chat platform itself is an external collaborator: a platform adapter
//! feeds the bot one JSON event per line on stdin and relays replies it
//! reads from stdout. Three inbound event shapes cover everything the bot
//! needs: presence changes, chat messages, and roster syncs.

use serde::{Deserialize, Serialize};

use pt_core::{RosterMember, UserId};

/// An inbound event from the platform adapter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GatewayEvent {
    /// A member's activity status changed.
    Presence {
        user_id: UserId,
        display_name: String,
        /// Names of all currently-active activities, may be empty.
        #[serde(default)]
        activities: Vec<String>,
    },
    /// A chat message arrived.
    Message { channel_id: String, content: String },
    /// A roster snapshot or delta for the server's member list.
    Members { members: Vec<RosterMember> },
}

/// An outbound reply to the channel a command arrived on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Reply {
    pub channel_id: String,
    pub text: String,
}
