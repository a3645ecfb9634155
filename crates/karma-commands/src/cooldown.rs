//! Per-user command cooldown tracking
//!
//! Entries carry an explicit expiry instant and are removed lazily when an
//! expired entry is read, plus by a periodic sweep. There are no per-entry
//! timers, so tests can drive a virtual clock through the `*_at` methods.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::debug;

/// Key for one cooldown window: (command name, user ID)
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
struct CooldownKey {
    command: String,
    user_id: u64,
}

/// Tracker for per-user command cooldowns
#[derive(Debug, Default)]
pub struct CooldownTracker {
    /// Expiry instant per (command, user)
    entries: DashMap<CooldownKey, Instant>,
}

impl CooldownTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Remaining cooldown for a user on a command, or `None` when the gate
    /// is open. Checking never refreshes the window.
    pub fn check(&self, command: &str, user_id: u64) -> Option<Duration> {
        self.check_at(command, user_id, Instant::now())
    }

    /// [`check`](Self::check) against an explicit clock reading
    pub fn check_at(&self, command: &str, user_id: u64, now: Instant) -> Option<Duration> {
        let key = CooldownKey {
            command: command.to_string(),
            user_id,
        };

        match self.entries.get(&key).map(|entry| *entry.value()) {
            Some(expires_at) if now < expires_at => Some(expires_at - now),
            Some(_) => {
                // Expired entry observed on read; drop it
                self.entries.remove(&key);
                None
            }
            None => None,
        }
    }

    /// Open a new cooldown window for a user on a command
    pub fn hit(&self, command: &str, user_id: u64, window: Duration) {
        self.hit_at(command, user_id, window, Instant::now());
    }

    /// [`hit`](Self::hit) against an explicit clock reading
    pub fn hit_at(&self, command: &str, user_id: u64, window: Duration, now: Instant) {
        let key = CooldownKey {
            command: command.to_string(),
            user_id,
        };
        self.entries.insert(key, now + window);
    }

    /// Remove every expired entry; returns the number removed
    pub fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    /// [`sweep`](Self::sweep) against an explicit clock reading
    pub fn sweep_at(&self, now: Instant) -> usize {
        let stale: Vec<CooldownKey> = self
            .entries
            .iter()
            .filter(|entry| *entry.value() <= now)
            .map(|entry| entry.key().clone())
            .collect();

        let removed = stale.len();
        for key in stale {
            self.entries.remove(&key);
        }

        if removed > 0 {
            debug!("Swept {} expired cooldown entries", removed);
        }
        removed
    }

    /// Number of live entries, expired ones included until swept
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the tracker holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_gate_without_entry() {
        let tracker = CooldownTracker::new();
        assert_eq!(tracker.check_at("ping", 1, Instant::now()), None);
    }

    #[test]
    fn test_remaining_window() {
        let tracker = CooldownTracker::new();
        let base = Instant::now();

        tracker.hit_at("ping", 1, Duration::from_secs(3), base);

        // One second in, roughly two seconds remain
        let remaining = tracker
            .check_at("ping", 1, base + Duration::from_secs(1))
            .expect("still cooling down");
        assert!(remaining > Duration::from_millis(1900));
        assert!(remaining <= Duration::from_secs(2));

        // Checking twice does not reset the timer
        let remaining = tracker
            .check_at("ping", 1, base + Duration::from_millis(1500))
            .expect("still cooling down");
        assert!(remaining <= Duration::from_millis(1500));
    }

    #[test]
    fn test_expiry_reopens_gate() {
        let tracker = CooldownTracker::new();
        let base = Instant::now();

        tracker.hit_at("ping", 1, Duration::from_secs(3), base);
        assert!(tracker
            .check_at("ping", 1, base + Duration::from_millis(2900))
            .is_some());
        assert_eq!(
            tracker.check_at("ping", 1, base + Duration::from_millis(3100)),
            None
        );
        // The expired entry was dropped by the read
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_per_user_and_per_command_isolation() {
        let tracker = CooldownTracker::new();
        let base = Instant::now();

        tracker.hit_at("ping", 1, Duration::from_secs(3), base);

        // Another user on the same command is unaffected
        assert_eq!(tracker.check_at("ping", 2, base), None);
        // The same user on another command is unaffected
        assert_eq!(tracker.check_at("help", 1, base), None);
        assert!(tracker.check_at("ping", 1, base).is_some());
    }

    #[test]
    fn test_refresh_extends_window() {
        let tracker = CooldownTracker::new();
        let base = Instant::now();

        tracker.hit_at("ping", 1, Duration::from_secs(3), base);
        tracker.hit_at("ping", 1, Duration::from_secs(3), base + Duration::from_secs(2));

        // The second hit re-anchored the window
        let remaining = tracker
            .check_at("ping", 1, base + Duration::from_secs(4))
            .expect("still cooling down");
        assert!(remaining <= Duration::from_secs(1));
    }

    #[test]
    fn test_sweep_removes_only_expired() {
        let tracker = CooldownTracker::new();
        let base = Instant::now();

        tracker.hit_at("ping", 1, Duration::from_secs(1), base);
        tracker.hit_at("ping", 2, Duration::from_secs(10), base);
        tracker.hit_at("help", 3, Duration::from_secs(2), base);

        let removed = tracker.sweep_at(base + Duration::from_secs(5));
        assert_eq!(removed, 2);
        assert_eq!(tracker.len(), 1);
        assert!(tracker.check_at("ping", 2, base + Duration::from_secs(5)).is_some());
    }
}
