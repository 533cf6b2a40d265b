//! Liveness record for one participant.

use std::time::Duration;
use tokio::time::Instant;

/// Tracks when a client was last seen.
///
/// Uses `tokio::time::Instant` so paused-clock tests drive the sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientRecord {
    last_access_time: Instant,
}

impl ClientRecord {
    /// Record stamped with the current time.
    pub fn new() -> Self {
        Self::seen_at(Instant::now())
    }

    /// Record stamped with `at`.
    pub fn seen_at(at: Instant) -> Self {
        Self {
            last_access_time: at,
        }
    }

    /// When the client was last seen.
    pub fn last_access_time(&self) -> Instant {
        self.last_access_time
    }

    /// Marks the client as seen at `at`.
    pub fn touch_at(&mut self, at: Instant) {
        self.last_access_time = at;
    }

    /// True if more than `timeout` has elapsed between the last access and `now`.
    pub fn is_stale(&self, now: Instant, timeout: Duration) -> bool {
        now.saturating_duration_since(self.last_access_time) > timeout
    }
}

impl Default for ClientRecord {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staleness_boundary() {
        let start = Instant::now();
        let record = ClientRecord::seen_at(start);
        let timeout = Duration::from_secs(30);
        assert!(!record.is_stale(start + timeout, timeout));
        assert!(record.is_stale(start + timeout + Duration::from_millis(1), timeout));
    }

    #[test]
    fn test_touch_extends_liveness() {
        let start = Instant::now();
        let mut record = ClientRecord::seen_at(start);
        record.touch_at(start + Duration::from_secs(20));
        assert!(!record.is_stale(start + Duration::from_secs(45), Duration::from_secs(30)));
    }
}
