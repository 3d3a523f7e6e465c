//! Pomodoro timer engine.
//!
//! A wall-clock state machine with no internal thread -- the control loop
//! calls `tick(now_ms)` once per frame and fans out the returned events.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Working -> OnBreak -> BreakOver -> Working (explicit restart)
//! ```
//!
//! `BreakOver` is terminal until the user re-starts; `cancel()` drops any
//! phase back to `Idle`. Suspension freezes the machine and shifts the
//! active deadline forward by the suspended duration on resume, so the
//! remaining time survives a pause exactly.

use serde::{Deserialize, Serialize};

use crate::clock::MS_PER_SEC;
use crate::events::{at, Event};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Working,
    OnBreak,
    BreakOver,
}

/// Core timer engine.
///
/// `work_end_at` is meaningful only in `Working`, `break_end_at` only in
/// `OnBreak`; `Idle` has neither.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerEngine {
    phase: Phase,
    work_duration_ms: u64,
    break_duration_ms: u64,
    work_end_at: u64,
    break_end_at: u64,
    /// Set while suspended; deadlines are frozen until `resume`.
    suspended_at: Option<u64>,
}

impl TimerEngine {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            work_duration_ms: 0,
            break_duration_ms: 0,
            work_end_at: 0,
            break_end_at: 0,
            suspended_at: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended_at.is_some()
    }

    pub fn work_secs(&self) -> u64 {
        self.work_duration_ms / MS_PER_SEC
    }

    pub fn break_secs(&self) -> u64 {
        self.break_duration_ms / MS_PER_SEC
    }

    /// Whole seconds until the active deadline; 0 outside `Working`/`OnBreak`.
    pub fn seconds_left(&self, now_ms: u64) -> u64 {
        let frozen = self.suspended_at.unwrap_or(now_ms);
        let reference = frozen.min(now_ms);
        let deadline = match self.phase {
            Phase::Working => self.work_end_at,
            Phase::OnBreak => self.break_end_at,
            Phase::Idle | Phase::BreakOver => return 0,
        };
        deadline.saturating_sub(reference) / MS_PER_SEC
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start (or restart) a work period. Allowed from every phase -- a new
    /// timer simply replaces whatever was running.
    pub fn start(&mut self, work_secs: u64, break_secs: u64, now_ms: u64) -> Event {
        self.work_duration_ms = work_secs.saturating_mul(MS_PER_SEC);
        self.break_duration_ms = break_secs.saturating_mul(MS_PER_SEC);
        self.work_end_at = now_ms + self.work_duration_ms;
        self.break_end_at = 0;
        self.suspended_at = None;
        self.phase = Phase::Working;
        Event::TimerStarted {
            work_secs,
            break_secs,
            at: at(now_ms),
        }
    }

    /// Drop back to `Idle` from any phase. The session attaches no side
    /// effects to the returned event.
    pub fn cancel(&mut self, now_ms: u64) -> Option<Event> {
        if self.phase == Phase::Idle {
            return None;
        }
        let from = self.phase;
        self.phase = Phase::Idle;
        self.suspended_at = None;
        Some(Event::TimerCancelled {
            from,
            at: at(now_ms),
        })
    }

    /// Freeze the countdown. No-op outside `Working`/`OnBreak` or when
    /// already suspended.
    pub fn suspend(&mut self, now_ms: u64) -> Option<Event> {
        if self.suspended_at.is_some() {
            return None;
        }
        match self.phase {
            Phase::Working | Phase::OnBreak => {
                self.suspended_at = Some(now_ms);
                Some(Event::TimerSuspended { at: at(now_ms) })
            }
            _ => None,
        }
    }

    /// Unfreeze, shifting the active deadline forward by exactly the
    /// suspended duration.
    pub fn resume(&mut self, now_ms: u64) -> Option<Event> {
        let since = self.suspended_at.take()?;
        let suspended_ms = now_ms.saturating_sub(since);
        self.work_end_at = self.work_end_at.saturating_add(suspended_ms);
        self.break_end_at = self.break_end_at.saturating_add(suspended_ms);
        Some(Event::TimerResumed {
            suspended_ms,
            at: at(now_ms),
        })
    }

    /// Advance the state machine. At most one transition per call.
    pub fn tick(&mut self, now_ms: u64) -> Option<Event> {
        if self.suspended_at.is_some() {
            return None;
        }
        match self.phase {
            Phase::Working if now_ms >= self.work_end_at => {
                self.phase = Phase::OnBreak;
                self.break_end_at = now_ms + self.break_duration_ms;
                Some(Event::BreakStarted {
                    break_secs: self.break_duration_ms / MS_PER_SEC,
                    at: at(now_ms),
                })
            }
            Phase::OnBreak if now_ms >= self.break_end_at => {
                self.phase = Phase::BreakOver;
                Some(Event::BreakEnded { at: at(now_ms) })
            }
            _ => None,
        }
    }
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: u64 = 1_700_000_000_000;

    #[test]
    fn start_enters_working() {
        let mut engine = TimerEngine::new();
        engine.start(1500, 300, T0);
        assert_eq!(engine.phase(), Phase::Working);
        assert_eq!(engine.seconds_left(T0), 1500);
    }

    #[test]
    fn work_deadline_fires_exactly_once() {
        let mut engine = TimerEngine::new();
        engine.start(1500, 300, T0);

        let eps = T0 + 1500 * MS_PER_SEC - 1;
        assert!(engine.tick(eps).is_none());
        assert_eq!(engine.phase(), Phase::Working);

        let deadline = T0 + 1500 * MS_PER_SEC;
        assert!(matches!(
            engine.tick(deadline),
            Some(Event::BreakStarted { break_secs: 300, .. })
        ));
        assert_eq!(engine.phase(), Phase::OnBreak);
        // Same instant again: no second transition.
        assert!(engine.tick(deadline).is_none());
    }

    #[test]
    fn break_deadline_ends_in_break_over() {
        let mut engine = TimerEngine::new();
        engine.start(10, 5, T0);
        engine.tick(T0 + 10_000);
        assert!(matches!(
            engine.tick(T0 + 15_000),
            Some(Event::BreakEnded { .. })
        ));
        assert_eq!(engine.phase(), Phase::BreakOver);
        // Terminal until restarted.
        assert!(engine.tick(T0 + 60_000).is_none());
        engine.start(10, 5, T0 + 60_000);
        assert_eq!(engine.phase(), Phase::Working);
    }

    #[test]
    fn suspend_shifts_deadline_by_suspended_duration() {
        let mut engine = TimerEngine::new();
        engine.start(100, 10, T0);
        engine.suspend(T0 + 40_000);
        // Frozen: no transition even long past the original deadline.
        assert!(engine.tick(T0 + 500_000).is_none());
        assert_eq!(engine.seconds_left(T0 + 500_000), 60);

        let resumed = engine.resume(T0 + 40_000 + 7_000).unwrap();
        assert!(matches!(resumed, Event::TimerResumed { suspended_ms: 7_000, .. }));
        // Deadline moved forward by exactly the pause.
        assert!(engine.tick(T0 + 107_000 - 1).is_none());
        assert!(engine.tick(T0 + 107_000).is_some());
    }

    #[test]
    fn cancel_returns_to_idle_from_any_phase() {
        let mut engine = TimerEngine::new();
        assert!(engine.cancel(T0).is_none());

        engine.start(10, 5, T0);
        engine.tick(T0 + 10_000);
        assert_eq!(engine.phase(), Phase::OnBreak);
        assert!(matches!(
            engine.cancel(T0 + 11_000),
            Some(Event::TimerCancelled { from: Phase::OnBreak, .. })
        ));
        assert_eq!(engine.phase(), Phase::Idle);
        assert_eq!(engine.seconds_left(T0 + 11_000), 0);
    }

    #[test]
    fn zero_length_timer_rings_immediately() {
        let mut engine = TimerEngine::new();
        engine.start(0, 0, T0);
        assert!(matches!(engine.tick(T0), Some(Event::BreakStarted { .. })));
        assert!(matches!(engine.tick(T0), Some(Event::BreakEnded { .. })));
        assert_eq!(engine.phase(), Phase::BreakOver);
    }
}
