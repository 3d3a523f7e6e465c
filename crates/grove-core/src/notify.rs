//! Transient notifications: at most one live message, newest wins.
//!
//! No queueing. Volume and seek feedback post with `emphasize` set, which
//! the renderer draws as the inverted progress-style bar.

use serde::{Deserialize, Serialize};

use crate::clock::MS_PER_SEC;

/// Default time-to-live for informational messages.
pub const DEFAULT_TTL_MS: u64 = 5 * MS_PER_SEC;
/// Shorter TTL for the volume/seek feedback bar.
pub const BAR_TTL_MS: u64 = 2 * MS_PER_SEC;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub text: String,
    pub expires_at: u64,
    pub emphasize: bool,
}

#[derive(Debug, Clone, Default)]
pub struct NotificationCenter {
    current: Option<Notification>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace whatever is showing, unconditionally.
    pub fn post(&mut self, text: impl Into<String>, ttl_ms: u64, emphasize: bool, now_ms: u64) {
        self.current = Some(Notification {
            text: text.into(),
            expires_at: now_ms + ttl_ms,
            emphasize,
        });
    }

    /// Clear once expired. A message posted with ttl 3s is still visible at
    /// +3s exactly and gone strictly after.
    pub fn tick(&mut self, now_ms: u64) {
        if let Some(n) = &self.current {
            if now_ms > n.expires_at {
                self.current = None;
            }
        }
    }

    pub fn current(&self) -> Option<&Notification> {
        self.current.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_then_expire() {
        let mut nc = NotificationCenter::new();
        nc.post("Hello", 3 * MS_PER_SEC, false, 1_000);

        nc.tick(1_000 + 2 * MS_PER_SEC);
        assert_eq!(nc.current().unwrap().text, "Hello");

        nc.tick(1_000 + 4 * MS_PER_SEC);
        assert!(nc.current().is_none());
    }

    #[test]
    fn newest_wins() {
        let mut nc = NotificationCenter::new();
        nc.post("first", DEFAULT_TTL_MS, false, 0);
        nc.post("second", DEFAULT_TTL_MS, true, 100);
        let n = nc.current().unwrap();
        assert_eq!(n.text, "second");
        assert!(n.emphasize);
    }

    #[test]
    fn visible_at_exact_expiry() {
        let mut nc = NotificationCenter::new();
        nc.post("edge", 1_000, false, 0);
        nc.tick(1_000);
        assert!(nc.current().is_some());
        nc.tick(1_001);
        assert!(nc.current().is_none());
    }
}
