//! Time sources
//!
//! Deadline arithmetic is computed from wall-clock readings rather than from
//! accumulated ticks. Routing every reading through [`TimeSource`] lets tests
//! and replays drive the clock deterministically.

use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex};

/// Source of the current wall-clock time
pub trait TimeSource: Send + Sync + 'static {
    /// Returns the current instant in UTC
    fn now(&self) -> DateTime<Utc>;
}

/// Reads the operating system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to
///
/// Clones share the same underlying instant.
#[derive(Debug, Clone)]
pub struct ManualTimeSource {
    current: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualTimeSource {
    /// Creates a manual clock starting at `start`
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            current: Arc::new(Mutex::new(start)),
        }
    }

    /// Moves the clock forward (or backward, for skew tests) by `delta`
    pub fn advance(&self, delta: Duration) {
        let mut current = self.current.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *current += delta;
    }

    /// Sets the clock to an absolute instant
    pub fn set(&self, instant: DateTime<Utc>) {
        let mut current = self.current.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *current = instant;
    }
}

impl Default for ManualTimeSource {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> DateTime<Utc> {
        *self.current.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_advances_shared_instant() {
        let start = Utc::now();
        let clock = ManualTimeSource::new(start);
        let shared = clock.clone();

        clock.advance(Duration::minutes(5));

        assert_eq!(shared.now(), start + Duration::minutes(5));
    }

    #[test]
    fn test_manual_clock_set() {
        let clock = ManualTimeSource::default();
        let target = Utc::now() + Duration::hours(3);
        clock.set(target);
        assert_eq!(clock.now(), target);
    }
}
