//! The media-playback service boundary.
//!
//! The orchestrator owns exactly one `Player` handle at a time and swaps
//! it whole -- handles are never shared. All calls are synchronous device
//! operations that must not block.
//!
//! `SoftPlayer` is the shipped state-only implementation: it tracks
//! position against the wall clock and honors pause/seek/volume, so the
//! whole session (and its tests) runs without an audio device. A
//! device-backed player plugs in at the same trait.

use std::path::PathBuf;

use crate::clock;
use crate::error::PlaybackError;

/// One-shot effect sounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    TimerStart,
    Alarm,
    Growth,
}

/// What a player handle is opened from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackSource {
    LocalFile(PathBuf),
    Stream { uri: String },
}

impl TrackSource {
    /// Human-readable name for "Playing: ..." notifications.
    pub fn display_name(&self) -> String {
        match self {
            TrackSource::LocalFile(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            TrackSource::Stream { uri } => uri.clone(),
        }
    }
}

pub trait Player: Send {
    fn play(&mut self);
    fn pause(&mut self);
    fn stop(&mut self);
    fn is_playing(&self) -> bool;
    /// Current position in milliseconds.
    fn position_ms(&self) -> u64;
    /// Track length in milliseconds; 0 when unknown.
    fn length_ms(&self) -> u64;
    fn seek_ms(&mut self, position_ms: u64);
    fn set_volume(&mut self, volume: u8);
    fn volume(&self) -> u8;
}

pub trait MediaBackend: Send {
    fn open(&self, source: &TrackSource) -> Result<Box<dyn Player>, PlaybackError>;

    /// Fire-and-forget effect sound. Default no-op for backends without a
    /// cue device.
    fn play_cue(&self, _cue: Cue, _volume: u8) {}
}

/// Nominal length `SoftPlayer` assigns when the source cannot tell us.
const SOFT_TRACK_LENGTH_MS: u64 = 180 * 1_000;

/// State-only player: position advances with the wall clock while playing.
pub struct SoftPlayer {
    playing: bool,
    /// Position accumulated up to the last play/pause/seek edge.
    base_ms: u64,
    /// Wall clock at the last resume; only meaningful while playing.
    resumed_at: u64,
    length_ms: u64,
    volume: u8,
}

impl SoftPlayer {
    pub fn new(length_ms: u64, volume: u8) -> Self {
        Self {
            playing: false,
            base_ms: 0,
            resumed_at: 0,
            length_ms,
            volume,
        }
    }
}

impl Player for SoftPlayer {
    fn play(&mut self) {
        if !self.playing {
            self.playing = true;
            self.resumed_at = clock::now_ms();
        }
    }

    fn pause(&mut self) {
        if self.playing {
            self.base_ms = self.position_ms();
            self.playing = false;
        }
    }

    fn stop(&mut self) {
        self.playing = false;
        self.base_ms = 0;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn position_ms(&self) -> u64 {
        let pos = if self.playing {
            self.base_ms + clock::now_ms().saturating_sub(self.resumed_at)
        } else {
            self.base_ms
        };
        pos.min(self.length_ms)
    }

    fn length_ms(&self) -> u64 {
        self.length_ms
    }

    fn seek_ms(&mut self, position_ms: u64) {
        self.base_ms = position_ms.min(self.length_ms);
        if self.playing {
            self.resumed_at = clock::now_ms();
        }
    }

    fn set_volume(&mut self, volume: u8) {
        self.volume = volume.min(100);
    }

    fn volume(&self) -> u8 {
        self.volume
    }
}

/// Backend producing `SoftPlayer` handles. Cues are logged, not audible.
pub struct SoftBackend;

impl MediaBackend for SoftBackend {
    fn open(&self, _source: &TrackSource) -> Result<Box<dyn Player>, PlaybackError> {
        Ok(Box::new(SoftPlayer::new(SOFT_TRACK_LENGTH_MS, 100)))
    }

    fn play_cue(&self, cue: Cue, volume: u8) {
        tracing::debug!(?cue, volume, "cue");
    }
}
