//! The event loop: gateway events in, replies out, periodic checkpoints.
//!
//! All state mutation happens on one logical thread in arrival order, so no
//! record is ever observed half-updated and no locking is needed.

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::MissedTickBehavior;

use pt_core::{MemberDirectory, PlaytimeTracker, RosterMember};
use pt_store::{JsonStore, StoreError};

use crate::commands;
use crate::config::Config;
use crate::gateway::{GatewayEvent, Reply};

/// The bot: accrual engine, roster cache, and persistence glued together.
#[derive(Debug)]
pub struct Bot {
    tracker: PlaytimeTracker,
    roster: MemberDirectory,
    tracked_games: Vec<String>,
    store: JsonStore,
}

impl Bot {
    /// Loads persisted state and builds the bot.
    ///
    /// A missing data file starts empty; an unparseable one is fatal.
    pub fn new(config: &Config) -> Result<Self, StoreError> {
        let store = JsonStore::new(&config.data_file);
        let tracker = PlaytimeTracker::from_records(store.load()?);
        Ok(Self {
            tracker,
            roster: MemberDirectory::new(),
            tracked_games: config.tracked_games.clone(),
            store,
        })
    }

    pub fn tracker(&self) -> &PlaytimeTracker {
        &self.tracker
    }

    /// Applies one gateway event, persisting after any mutation.
    ///
    /// Returns a reply to send when the event was a recognized command.
    pub fn handle_event(&mut self, event: GatewayEvent, now: DateTime<Utc>) -> Option<Reply> {
        match event {
            GatewayEvent::Presence {
                user_id,
                display_name,
                activities,
            } => {
                // Presence traffic keeps the roster cache warm for overrides.
                self.roster.upsert(RosterMember {
                    id: user_id.clone(),
                    display_name: display_name.clone(),
                });
                let tracked = is_tracked(&activities, &self.tracked_games);
                if self
                    .tracker
                    .observe_activity(&user_id, &display_name, tracked, now)
                {
                    self.persist();
                }
                None
            }
            GatewayEvent::Members { members } => {
                for member in members {
                    self.roster.upsert(member);
                }
                None
            }
            GatewayEvent::Message {
                channel_id,
                content,
            } => {
                let outcome = commands::respond(&content, &mut self.tracker, &self.roster)?;
                if outcome.mutated {
                    self.persist();
                }
                Some(Reply {
                    channel_id,
                    text: outcome.reply,
                })
            }
        }
    }

    /// Folds elapsed time for all open sessions and persists if anything
    /// changed.
    pub fn checkpoint(&mut self, now: DateTime<Utc>) {
        if self.tracker.checkpoint(now) {
            tracing::info!("playtime updated for active players");
            self.persist();
        }
    }

    /// Writes the full record map. Failures are logged, not fatal: the
    /// in-memory state remains the source of truth until the next write.
    fn persist(&self) {
        if let Err(err) = self.store.save(self.tracker.records()) {
            tracing::warn!(error = %err, "failed to write playtime data");
        }
    }
}

/// Whether any reported activity name matches a tracked game,
/// case-insensitively.
pub fn is_tracked(activities: &[String], tracked_games: &[String]) -> bool {
    activities
        .iter()
        .any(|activity| tracked_games.iter().any(|game| game.eq_ignore_ascii_case(activity)))
}

/// Runs the bot until the gateway stream closes.
///
/// Selects between gateway lines and the checkpoint ticker; both are handled
/// synchronously, one event at a time. Malformed lines are skipped with a
/// warning. EOF performs a final checkpoint so in-flight sessions are not
/// lost across a clean shutdown.
pub async fn run<R, W>(
    mut bot: Bot,
    input: R,
    mut output: W,
    tick_interval: Duration,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut ticker = tokio::time::interval(tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first interval tick completes immediately; consume it so ticks
    // start one full interval from now.
    ticker.tick().await;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read gateway stream")? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                let event: GatewayEvent = match serde_json::from_str(&line) {
                    Ok(event) => event,
                    Err(err) => {
                        tracing::warn!(error = %err, "skipping malformed gateway event");
                        continue;
                    }
                };
                if let Some(reply) = bot.handle_event(event, Utc::now()) {
                    let mut json =
                        serde_json::to_vec(&reply).context("failed to serialize reply")?;
                    json.push(b'\n');
                    output
                        .write_all(&json)
                        .await
                        .context("failed to write reply")?;
                    output.flush().await.context("failed to flush reply")?;
                }
            }
            _ = ticker.tick() => {
                bot.checkpoint(Utc::now());
            }
        }
    }

    tracing::info!("gateway stream closed, shutting down");
    bot.checkpoint(Utc::now());
    Ok(())
}
