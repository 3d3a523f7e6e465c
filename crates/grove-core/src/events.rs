use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::growth::Tier;
use crate::timer::Phase;

/// Every externally visible state change produces an Event. The session
/// consumes them to fan out side effects (cues, notifications, audio
/// pause/resume); front ends may also subscribe for their own chrome.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        work_secs: u64,
        break_secs: u64,
        at: DateTime<Utc>,
    },
    /// Work period elapsed; the break countdown is running.
    BreakStarted {
        break_secs: u64,
        at: DateTime<Utc>,
    },
    /// Break elapsed; waiting for the user to start a new timer.
    BreakEnded {
        at: DateTime<Utc>,
    },
    TimerCancelled {
        from: Phase,
        at: DateTime<Utc>,
    },
    TimerSuspended {
        at: DateTime<Utc>,
    },
    TimerResumed {
        /// How long the timer sat suspended; deadlines shifted by this.
        suspended_ms: u64,
        at: DateTime<Utc>,
    },
    /// A new track was adopted as the live handle.
    TrackStarted {
        title: String,
        at: DateTime<Utc>,
    },
    /// A background resolution came back unusable.
    ResolutionFailed {
        reason: String,
        at: DateTime<Utc>,
    },
    /// Radio mode spent its retry budget and stopped.
    RadioStopped {
        attempts: u32,
        at: DateTime<Utc>,
    },
    /// The tree aged one growth unit.
    GrowthAdvanced {
        age: f64,
        tier: Tier,
        at: DateTime<Utc>,
    },
}

/// Timestamp for events raised from a `tick(now_ms)` path, so event
/// construction stays a pure function of the caller's clock.
pub fn at(now_ms: u64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(now_ms as i64).unwrap_or_else(Utc::now)
}
