//! Claim filing deadline
//!
//! The server seeds the remaining hours once, when the claim is created.
//! From then on a background [`DeadlineClock`] ticks the [`Deadline`]
//! every minute. Two decay modes exist:
//!
//! - [`DeadlineMode::WallClock`] recomputes from the seed time, so a
//!   suspended process or a delayed tick never makes the countdown drift.
//! - [`DeadlineMode::TickAccumulated`] subtracts one minute per tick
//!   regardless of how much time really passed.
//!
//! Either way the remaining value never increases and never drops below
//! zero.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

use core_kernel::TimeSource;

/// Window granted to file a claim when the server does not say otherwise
pub const DEFAULT_DEADLINE_HOURS: f64 = 72.0;

/// Below this many hours the countdown is shown as urgent
pub const URGENT_THRESHOLD_HOURS: f64 = 24.0;

/// Default tick period
pub const TICK_INTERVAL: Duration = Duration::from_secs(60);

const MINUTES_PER_HOUR: f64 = 60.0;
const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// How the deadline decays between ticks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeadlineMode {
    #[default]
    WallClock,
    TickAccumulated,
}

/// True when fewer than `threshold_hours` remain
pub fn is_urgent(remaining_hours: f64, threshold_hours: f64) -> bool {
    remaining_hours < threshold_hours
}

/// Countdown for one claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deadline {
    seeded_hours: f64,
    seeded_at: DateTime<Utc>,
    remaining_hours: f64,
    ticks: u64,
    last_tick: Option<DateTime<Utc>>,
}

impl Deadline {
    /// Starts a countdown; negative or non-finite seeds count as expired
    pub fn seed(hours: f64, at: DateTime<Utc>) -> Self {
        let hours = if hours.is_finite() { hours.max(0.0) } else { 0.0 };
        Self {
            seeded_hours: hours,
            seeded_at: at,
            remaining_hours: hours,
            ticks: 0,
            last_tick: None,
        }
    }

    pub fn seeded_hours(&self) -> f64 {
        self.seeded_hours
    }

    pub fn seeded_at(&self) -> DateTime<Utc> {
        self.seeded_at
    }

    pub fn remaining_hours(&self) -> f64 {
        self.remaining_hours
    }

    pub fn last_tick(&self) -> Option<DateTime<Utc>> {
        self.last_tick
    }

    pub fn is_expired(&self) -> bool {
        self.remaining_hours <= 0.0
    }

    pub fn is_urgent(&self, threshold_hours: f64) -> bool {
        is_urgent(self.remaining_hours, threshold_hours)
    }

    /// Advances the countdown to `now`
    pub fn tick(&mut self, mode: DeadlineMode, now: DateTime<Utc>) {
        if self.is_expired() {
            return;
        }
        self.ticks += 1;
        let candidate = match mode {
            DeadlineMode::WallClock => {
                let elapsed_ms = (now - self.seeded_at).num_milliseconds().max(0) as f64;
                self.seeded_hours - elapsed_ms / MILLIS_PER_HOUR
            }
            DeadlineMode::TickAccumulated => {
                self.seeded_hours - self.ticks as f64 / MINUTES_PER_HOUR
            }
        };
        self.remaining_hours = candidate.max(0.0).min(self.remaining_hours);
        self.last_tick = Some(now);
    }

    pub fn status(&self, threshold_hours: f64) -> DeadlineStatus {
        DeadlineStatus {
            remaining_hours: self.remaining_hours,
            urgent: self.is_urgent(threshold_hours),
            expired: self.is_expired(),
        }
    }
}

/// What the countdown view renders
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeadlineStatus {
    pub remaining_hours: f64,
    pub urgent: bool,
    pub expired: bool,
}

impl DeadlineStatus {
    /// Whole hours and minutes left, rounded down
    pub fn hours_minutes(&self) -> (u64, u64) {
        let total_minutes = (self.remaining_hours * MINUTES_PER_HOUR).floor().max(0.0) as u64;
        (total_minutes / 60, total_minutes % 60)
    }
}

/// Periodic task driving a deadline
///
/// The clock owns no state; `on_tick` applies each tick and decides whether
/// to keep going. Dropping the clock cancels the task.
#[derive(Debug)]
pub struct DeadlineClock {
    handle: JoinHandle<()>,
}

impl DeadlineClock {
    pub fn spawn<F>(period: Duration, time: Arc<dyn TimeSource>, mut on_tick: F) -> Self
    where
        F: FnMut(DateTime<Utc>) -> ControlFlow<()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if on_tick(time.now()).is_break() {
                    debug!("Deadline clock stopped");
                    break;
                }
            }
        });
        Self { handle }
    }

    pub fn stop(&self) {
        self.handle.abort();
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for DeadlineClock {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
