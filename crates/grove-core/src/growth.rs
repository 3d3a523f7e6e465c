//! The growth counter and its visual tier mapping.
//!
//! `age` climbs by exactly one growth unit per wall-clock interval while
//! the session is running, and is persisted across sessions (default 1 on
//! a missing or corrupt record). The nine tiers partition `[0, inf)` into
//! half-open bands -- total and monotonic, so every age renders as exactly
//! one stage of the tree.

use serde::{Deserialize, Serialize};

use crate::clock::MS_PER_SEC;
use crate::events::{at, Event};

/// Discrete visual growth stage, ordered youngest to oldest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Sprout,
    Seedling,
    Sapling,
    Young,
    Grown,
    Mature,
    Elder,
    Venerable,
    Ancient,
}

impl Tier {
    /// Band lower bounds; band `i` is `[BOUNDS[i], BOUNDS[i+1])`, the last
    /// extending to infinity.
    const BOUNDS: [f64; 9] = [0.0, 5.0, 10.0, 20.0, 30.0, 40.0, 70.0, 120.0, 200.0];

    const ALL: [Tier; 9] = [
        Tier::Sprout,
        Tier::Seedling,
        Tier::Sapling,
        Tier::Young,
        Tier::Grown,
        Tier::Mature,
        Tier::Elder,
        Tier::Venerable,
        Tier::Ancient,
    ];

    pub fn for_age(age: f64) -> Tier {
        let age = if age.is_finite() && age > 0.0 { age } else { 0.0 };
        let idx = Self::BOUNDS
            .iter()
            .rposition(|&lo| age >= lo)
            .unwrap_or(0);
        Self::ALL[idx]
    }

    /// Position in the ordered band list, 0-based.
    pub fn index(self) -> usize {
        Self::ALL.iter().position(|&t| t == self).unwrap_or(0)
    }
}

#[derive(Debug, Clone)]
pub struct GrowthCounter {
    age: f64,
    interval_ms: u64,
    next_growth_at: u64,
}

impl GrowthCounter {
    pub fn new(age: f64, interval_secs: u64, now_ms: u64) -> Self {
        let interval_ms = interval_secs.max(1) * MS_PER_SEC;
        Self {
            age: if age.is_finite() && age >= 0.0 { age } else { 1.0 },
            interval_ms,
            next_growth_at: now_ms + interval_ms,
        }
    }

    pub fn age(&self) -> f64 {
        self.age
    }

    pub fn tier(&self) -> Tier {
        Tier::for_age(self.age)
    }

    /// One growth unit per elapsed interval. A single late tick grows at
    /// most once; the deadline re-arms from `now`, not from the missed
    /// schedule, since age must not advance while the process is down.
    pub fn tick(&mut self, now_ms: u64) -> Option<Event> {
        if now_ms < self.next_growth_at {
            return None;
        }
        self.age += 1.0;
        self.next_growth_at = now_ms + self.interval_ms;
        Some(Event::GrowthAdvanced {
            age: self.age,
            tier: self.tier(),
            at: at(now_ms),
        })
    }
}
