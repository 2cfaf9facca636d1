//! Server roster lookup.
//!
//! Manual overrides may name users the tracker has never seen. Resolution
//! goes through [`RosterLookup`], a narrow seam the runtime supplies, so the
//! accrual engine never touches platform client state directly.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::UserId;

/// A member of the server roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterMember {
    pub id: UserId,
    pub display_name: String,
}

/// Resolves a display name to a roster member.
pub trait RosterLookup {
    /// Returns the member whose display name exactly matches `name`, if any.
    fn find_by_display_name(&self, name: &str) -> Option<RosterMember>;
}

/// In-memory roster cache.
///
/// Fed by gateway member events and, opportunistically, by presence
/// notifications. Lookup misses simply mean the user is unknown to the
/// cache, not that the server has no such member.
#[derive(Debug, Clone, Default)]
pub struct MemberDirectory {
    members: BTreeMap<UserId, String>,
}

impl MemberDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or refreshes a member's display name.
    pub fn upsert(&mut self, member: RosterMember) {
        self.members.insert(member.id, member.display_name);
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl RosterLookup for MemberDirectory {
    fn find_by_display_name(&self, name: &str) -> Option<RosterMember> {
        self.members
            .iter()
            .find(|(_, display_name)| display_name.as_str() == name)
            .map(|(id, display_name)| RosterMember {
                id: id.clone(),
                display_name: display_name.clone(),
            })
    }
}
