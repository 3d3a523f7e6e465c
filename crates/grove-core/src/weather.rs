//! Deterministic daily weather overlay.
//!
//! The season is a pure function of the calendar day: seed a PCG with the
//! day index and pick one of five variants, so every session on the same
//! day sees the same weather. The particle field reseeds from a coarse time
//! window (`now / speed`) each frame -- constant within the window, so the
//! drops appear to drift rather than flicker.
//!
//! Consumed only by the renderer; nothing here mutates session state.

use rand::prelude::*;
use rand_pcg::Mcg128Xsl64;
use serde::{Deserialize, Serialize};

use crate::clock::{self, MS_PER_SEC};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Rain,
    LightRain,
    HeavyRain,
    Snow,
    Windy,
}

impl Season {
    const ALL: [Season; 5] = [
        Season::Rain,
        Season::LightRain,
        Season::HeavyRain,
        Season::Snow,
        Season::Windy,
    ];

    pub fn for_day(day_index: u64) -> Season {
        let mut rng = Mcg128Xsl64::seed_from_u64(day_index);
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    /// (particle count, reseed window in seconds, glyph)
    fn params(self) -> (usize, u64, char) {
        match self {
            Season::Rain => (30, 30, '/'),
            Season::LightRain => (30, 60, '`'),
            Season::HeavyRain => (40, 20, '/'),
            Season::Snow => (30, 30, '.'),
            Season::Windy => (20, 30, '-'),
        }
    }
}

/// One particle, positioned in render-area coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Particle {
    pub row: u16,
    pub col: u16,
    pub glyph: char,
}

#[derive(Debug, Clone)]
pub struct WeatherOverlay {
    season: Season,
    day: u64,
}

impl WeatherOverlay {
    pub fn new(now_ms: u64) -> Self {
        let day = clock::day_index(now_ms);
        Self {
            season: Season::for_day(day),
            day,
        }
    }

    pub fn season(&self) -> Season {
        self.season
    }

    /// Re-derive the season when the session runs across midnight.
    pub fn tick(&mut self, now_ms: u64) {
        let day = clock::day_index(now_ms);
        if day != self.day {
            self.day = day;
            self.season = Season::for_day(day);
        }
    }

    /// Particle field for this frame. Falls within the middle band of the
    /// area: rows `[h/4, 3h/4)`, columns `[w/3, 2w/3)`.
    pub fn particles(&self, now_ms: u64, cols: u16, rows: u16) -> Vec<Particle> {
        let (count, window_secs, glyph) = self.season.params();
        let row_lo = rows / 4;
        let row_hi = rows * 3 / 4;
        let col_lo = cols / 3;
        let col_hi = cols * 2 / 3;
        if row_lo >= row_hi || col_lo >= col_hi {
            return Vec::new();
        }

        let seed = clock::drift_window(now_ms, window_secs * MS_PER_SEC);
        let mut rng = Mcg128Xsl64::seed_from_u64(seed);
        (0..count)
            .map(|_| Particle {
                row: rng.gen_range(row_lo..row_hi),
                col: rng.gen_range(col_lo..col_hi),
                glyph,
            })
            .collect()
    }
}
