//! Per-user playtime records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Milliseconds in one hour, for hours <-> playtime conversions.
pub const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Accumulated playtime for one tracked user.
///
/// Maps directly onto the persisted wire format:
/// `{ "username": string, "playtime": number (ms), "startTime"?: epoch ms }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Last-known display name. Best effort; may lag behind renames or be
    /// absent entirely. Never used as a primary key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Total accumulated playtime in milliseconds. Never negative;
    /// monotonically non-decreasing except for explicit manual overrides.
    #[serde(rename = "playtime")]
    pub playtime_ms: i64,

    /// Start of the open accrual session. Present iff the user is
    /// currently in a tracked game.
    #[serde(
        rename = "startTime",
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub session_start: Option<DateTime<Utc>>,
}

impl UserRecord {
    /// Creates a fresh record with no accrued time and no open session.
    pub fn new(username: Option<String>) -> Self {
        Self {
            username,
            playtime_ms: 0,
            session_start: None,
        }
    }

    /// Whether the user currently has an open accrual session.
    pub fn is_active(&self) -> bool {
        self.session_start.is_some()
    }

    /// Accrued playtime in fractional hours.
    #[expect(
        clippy::cast_precision_loss,
        reason = "realistic playtime totals are far below f64's exact integer range"
    )]
    pub fn hours(&self) -> f64 {
        self.playtime_ms as f64 / MILLIS_PER_HOUR
    }
}
