//! Playtime accrual over presence sessions.
//!
//! [`PlaytimeTracker`] owns the per-user record map and the arithmetic for
//! folding "time since session start" into accumulated totals. Sessions are
//! checkpointed periodically rather than only totalled at stop time, so a
//! long-running session loses at most one tick interval on a restart.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::record::{MILLIS_PER_HOUR, UserRecord};
use crate::roster::RosterLookup;
use crate::types::UserId;

/// A manual override named a user that exists neither in the records nor in
/// the server roster.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("user {username} not found")]
pub struct UserNotFound {
    pub username: String,
}

/// Outcome of a successful manual override.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedOverride {
    pub user_id: UserId,
    pub hours: f64,
    /// True if the user was resolved via the roster and a new record was
    /// created for them.
    pub created: bool,
}

/// One row of the playtime leaderboard.
#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardEntry {
    /// 1-based rank, descending by accrued time.
    pub rank: usize,
    /// Display name, falling back to the raw user ID when unknown.
    pub name: String,
    /// Accrued playtime in fractional hours.
    pub hours: f64,
}

/// The accrual engine: per-user session state plus accumulated totals.
#[derive(Debug, Clone, Default)]
pub struct PlaytimeTracker {
    records: BTreeMap<UserId, UserRecord>,
}

/// Elapsed session time, clamped so clock skew can never drive a total
/// negative.
fn elapsed_ms(start: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - start).num_milliseconds().max(0)
}

impl PlaytimeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a tracker from previously persisted records.
    pub fn from_records(records: BTreeMap<UserId, UserRecord>) -> Self {
        Self { records }
    }

    /// The full record map, in `UserId` order.
    pub fn records(&self) -> &BTreeMap<UserId, UserRecord> {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Applies an activity-presence notification.
    ///
    /// Opens a session when the user enters a tracked game and closes one
    /// (folding the elapsed time into the total) when they leave. Repeated
    /// notifications with the same tracked/untracked state are no-ops beyond
    /// a display name refresh; a stop for a user with no open session is
    /// silently ignored, since override logic may have already closed it.
    ///
    /// Returns whether any record changed, to gate a persistence write.
    pub fn observe_activity(
        &mut self,
        user_id: &UserId,
        display_name: &str,
        in_tracked_game: bool,
        now: DateTime<Utc>,
    ) -> bool {
        if in_tracked_game {
            let record = self
                .records
                .entry(user_id.clone())
                .or_insert_with(|| UserRecord::new(None));
            let mut changed = refresh_username(record, display_name);
            if record.session_start.is_none() {
                record.session_start = Some(now);
                changed = true;
                tracing::info!(user = %user_id, name = display_name, "session opened");
            }
            changed
        } else {
            let Some(record) = self.records.get_mut(user_id) else {
                return false;
            };
            let mut changed = refresh_username(record, display_name);
            if let Some(start) = record.session_start.take() {
                let session_ms = elapsed_ms(start, now);
                record.playtime_ms += session_ms;
                changed = true;
                tracing::info!(
                    user = %user_id,
                    name = display_name,
                    session_secs = session_ms / 1000,
                    "session closed"
                );
            }
            changed
        }
    }

    /// Periodic tick: folds elapsed time for every open session into its
    /// total and restarts the session at `now`, so accrued time survives a
    /// process restart.
    ///
    /// Returns whether any record changed, to gate a persistence write.
    pub fn checkpoint(&mut self, now: DateTime<Utc>) -> bool {
        let mut changed = false;
        for record in self.records.values_mut() {
            if let Some(start) = record.session_start {
                record.playtime_ms += elapsed_ms(start, now);
                record.session_start = Some(now);
                changed = true;
            }
        }
        changed
    }

    /// Manually overrides a user's accrued total to `hours`.
    ///
    /// The username resolves against existing records first, then against
    /// the server roster; roster-resolved users get a fresh record. Any open
    /// session is left untouched, so a later tick or stop still adds its
    /// elapsed time on top of the override.
    pub fn set_playtime(
        &mut self,
        username: &str,
        hours: f64,
        roster: &dyn RosterLookup,
    ) -> Result<AppliedOverride, UserNotFound> {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "override hours are user-entered small values"
        )]
        let playtime_ms = (hours * MILLIS_PER_HOUR).round() as i64;

        if let Some((user_id, record)) = self
            .records
            .iter_mut()
            .find(|(_, record)| record.username.as_deref() == Some(username))
        {
            record.playtime_ms = playtime_ms;
            tracing::info!(user = %user_id, name = username, hours, "playtime overridden");
            return Ok(AppliedOverride {
                user_id: user_id.clone(),
                hours,
                created: false,
            });
        }

        let member = roster
            .find_by_display_name(username)
            .ok_or_else(|| UserNotFound {
                username: username.to_string(),
            })?;
        tracing::info!(user = %member.id, name = username, hours, "user added via override");
        self.records.insert(
            member.id.clone(),
            UserRecord {
                username: Some(member.display_name),
                playtime_ms,
                session_start: None,
            },
        );
        Ok(AppliedOverride {
            user_id: member.id,
            hours,
            created: true,
        })
    }

    /// Ranked leaderboard, descending by accrued time.
    ///
    /// Ties keep `UserId` order, so repeated calls with no intervening
    /// mutation produce identical output.
    pub fn leaderboard(&self) -> Vec<LeaderboardEntry> {
        let mut entries: Vec<(&UserId, &UserRecord)> = self.records.iter().collect();
        entries.sort_by(|a, b| b.1.playtime_ms.cmp(&a.1.playtime_ms));
        entries
            .into_iter()
            .enumerate()
            .map(|(index, (id, record))| LeaderboardEntry {
                rank: index + 1,
                name: record
                    .username
                    .clone()
                    .unwrap_or_else(|| id.as_str().to_string()),
                hours: record.hours(),
            })
            .collect()
    }
}

/// Opportunistic display name refresh; returns whether the name changed.
fn refresh_username(record: &mut UserRecord, display_name: &str) -> bool {
    if record.username.as_deref() == Some(display_name) {
        return false;
    }
    record.username = Some(display_name.to_string());
    true
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::roster::{MemberDirectory, RosterMember};

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).unwrap()
    }

    fn user(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    fn empty_roster() -> MemberDirectory {
        MemberDirectory::new()
    }

    #[test]
    fn start_then_stop_accrues_session_time() {
        let mut tracker = PlaytimeTracker::new();
        let alice = user("a");

        assert!(tracker.observe_activity(&alice, "Alice", true, at(0)));
        assert!(tracker.observe_activity(&alice, "Alice", false, at(120_000)));

        let record = &tracker.records()[&alice];
        assert_eq!(record.username.as_deref(), Some("Alice"));
        assert_eq!(record.playtime_ms, 120_000);
        assert!(record.session_start.is_none());
    }

    #[test]
    fn repeated_tracked_notifications_are_noops() {
        let mut tracker = PlaytimeTracker::new();
        let alice = user("a");

        assert!(tracker.observe_activity(&alice, "Alice", true, at(0)));
        // Same state again: only a name refresh could change anything.
        assert!(!tracker.observe_activity(&alice, "Alice", true, at(5_000)));

        // Session start must not have been moved by the repeat.
        assert_eq!(tracker.records()[&alice].session_start, Some(at(0)));
    }

    #[test]
    fn stop_without_open_session_is_silent_noop() {
        let mut tracker = PlaytimeTracker::new();
        let alice = user("a");

        // Unknown user: no record created.
        assert!(!tracker.observe_activity(&alice, "Alice", false, at(0)));
        assert!(tracker.is_empty());

        // Known user with a closed session: no error, nothing accrued.
        tracker.observe_activity(&alice, "Alice", true, at(0));
        tracker.observe_activity(&alice, "Alice", false, at(60_000));
        assert!(!tracker.observe_activity(&alice, "Alice", false, at(90_000)));
        assert_eq!(tracker.records()[&alice].playtime_ms, 60_000);
    }

    #[test]
    fn untracked_notification_refreshes_name_of_existing_record() {
        let mut tracker = PlaytimeTracker::new();
        let alice = user("a");
        tracker.observe_activity(&alice, "Alice", true, at(0));
        tracker.observe_activity(&alice, "Alice", false, at(1_000));

        assert!(tracker.observe_activity(&alice, "AliceRenamed", false, at(2_000)));
        assert_eq!(
            tracker.records()[&alice].username.as_deref(),
            Some("AliceRenamed")
        );
    }

    #[test]
    fn checkpoint_preserves_total_across_stop() {
        // Tick-then-stop must not double-count or lose time.
        let mut tracker = PlaytimeTracker::new();
        let alice = user("a");

        tracker.observe_activity(&alice, "Alice", true, at(0));
        assert!(tracker.checkpoint(at(60_000)));
        assert_eq!(tracker.records()[&alice].playtime_ms, 60_000);
        assert_eq!(tracker.records()[&alice].session_start, Some(at(60_000)));

        tracker.observe_activity(&alice, "Alice", false, at(90_000));
        assert_eq!(tracker.records()[&alice].playtime_ms, 90_000);
    }

    #[test]
    fn many_checkpoints_equal_one_fold_over_same_interval() {
        let mut ticked = PlaytimeTracker::new();
        let mut untouched = PlaytimeTracker::new();
        let alice = user("a");

        for tracker in [&mut ticked, &mut untouched] {
            tracker.observe_activity(&alice, "Alice", true, at(0));
        }
        for i in 1..=10 {
            ticked.checkpoint(at(i * 30_000));
        }
        for tracker in [&mut ticked, &mut untouched] {
            tracker.observe_activity(&alice, "Alice", false, at(300_000));
        }

        assert_eq!(ticked.records()[&alice].playtime_ms, 300_000);
        assert_eq!(
            ticked.records()[&alice].playtime_ms,
            untouched.records()[&alice].playtime_ms
        );
    }

    #[test]
    fn checkpoint_with_no_open_sessions_reports_no_change() {
        let mut tracker = PlaytimeTracker::new();
        let alice = user("a");
        tracker.observe_activity(&alice, "Alice", true, at(0));
        tracker.observe_activity(&alice, "Alice", false, at(1_000));

        assert!(!tracker.checkpoint(at(60_000)));
        assert_eq!(tracker.records()[&alice].playtime_ms, 1_000);
    }

    #[test]
    fn alternating_sessions_accrue_sum_of_tracked_intervals() {
        let mut tracker = PlaytimeTracker::new();
        let alice = user("a");

        // [0, 10s] and [30s, 45s] tracked, checkpoint in the middle of each.
        tracker.observe_activity(&alice, "Alice", true, at(0));
        tracker.checkpoint(at(4_000));
        tracker.observe_activity(&alice, "Alice", false, at(10_000));
        tracker.observe_activity(&alice, "Alice", true, at(30_000));
        tracker.checkpoint(at(40_000));
        tracker.observe_activity(&alice, "Alice", false, at(45_000));

        assert_eq!(tracker.records()[&alice].playtime_ms, 25_000);
    }

    #[test]
    fn clock_skew_never_drives_total_negative() {
        let mut tracker = PlaytimeTracker::new();
        let alice = user("a");

        tracker.observe_activity(&alice, "Alice", true, at(100_000));
        // Stop timestamp before the session start: clamp, don't subtract.
        tracker.observe_activity(&alice, "Alice", false, at(40_000));

        assert_eq!(tracker.records()[&alice].playtime_ms, 0);
    }

    #[test]
    fn override_on_existing_record_sets_total_directly() {
        let mut tracker = PlaytimeTracker::new();
        let alice = user("a");
        tracker.observe_activity(&alice, "Alice", true, at(0));
        tracker.observe_activity(&alice, "Alice", false, at(120_000));

        let applied = tracker.set_playtime("Alice", 2.0, &empty_roster()).unwrap();
        assert_eq!(applied.user_id, alice);
        assert!(!applied.created);

        let record = &tracker.records()[&alice];
        assert_eq!(record.playtime_ms, 7_200_000);
        assert!(record.session_start.is_none());
    }

    #[test]
    fn override_leaves_open_session_running() {
        let mut tracker = PlaytimeTracker::new();
        let alice = user("a");
        tracker.observe_activity(&alice, "Alice", true, at(0));

        tracker.set_playtime("Alice", 1.0, &empty_roster()).unwrap();
        assert_eq!(tracker.records()[&alice].session_start, Some(at(0)));

        // The live session keeps accruing on top of the override.
        tracker.observe_activity(&alice, "Alice", false, at(60_000));
        assert_eq!(tracker.records()[&alice].playtime_ms, 3_600_000 + 60_000);
    }

    #[test]
    fn override_resolves_unknown_user_via_roster() {
        let mut tracker = PlaytimeTracker::new();
        let mut roster = MemberDirectory::new();
        roster.upsert(RosterMember {
            id: user("b"),
            display_name: "Bob".to_string(),
        });

        let applied = tracker.set_playtime("Bob", 0.5, &roster).unwrap();
        assert!(applied.created);
        assert_eq!(applied.user_id, user("b"));

        let record = &tracker.records()[&user("b")];
        assert_eq!(record.username.as_deref(), Some("Bob"));
        assert_eq!(record.playtime_ms, 1_800_000);
        assert!(record.session_start.is_none());
    }

    #[test]
    fn override_on_unresolvable_user_changes_nothing() {
        let mut tracker = PlaytimeTracker::new();
        let alice = user("a");
        tracker.observe_activity(&alice, "Alice", true, at(0));
        let before = tracker.records().clone();

        let err = tracker
            .set_playtime("Nobody", 1.0, &empty_roster())
            .unwrap_err();
        assert_eq!(err.username, "Nobody");
        assert_eq!(tracker.records(), &before);
    }

    #[test]
    fn leaderboard_sorts_descending_with_stable_ties() {
        let mut tracker = PlaytimeTracker::new();
        let mut roster = MemberDirectory::new();
        for (id, name) in [("1", "Alice"), ("2", "Bob"), ("3", "Carol")] {
            roster.upsert(RosterMember {
                id: user(id),
                display_name: name.to_string(),
            });
        }
        tracker.set_playtime("Alice", 1.0, &roster).unwrap();
        tracker.set_playtime("Bob", 2.0, &roster).unwrap();
        tracker.set_playtime("Carol", 1.0, &roster).unwrap();

        let board = tracker.leaderboard();
        let names: Vec<&str> = board.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["Bob", "Alice", "Carol"]);
        assert_eq!(board[0].rank, 1);
        assert_eq!(board[2].rank, 3);

        // Stable across repeated calls with no intervening mutation.
        assert_eq!(tracker.leaderboard(), board);
    }

    #[test]
    fn leaderboard_falls_back_to_user_id_when_name_unknown() {
        let tracker =
            PlaytimeTracker::from_records(BTreeMap::from([(user("9001"), UserRecord::new(None))]));

        let board = tracker.leaderboard();
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].name, "9001");
    }

    #[test]
    fn empty_tracker_has_empty_leaderboard() {
        assert!(PlaytimeTracker::new().leaderboard().is_empty());
    }
}
