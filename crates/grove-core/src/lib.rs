//! # Grove Core Library
//!
//! Core logic for Grove, a terminal Pomodoro companion: a growing bonsai,
//! ambient audio (local files, resolved remote streams, rotating radio
//! playlists), transient notifications, and a deterministic daily weather
//! overlay.
//!
//! ## Architecture
//!
//! - **Session orchestrator**: one single-threaded cooperative loop owns
//!   all mutable state; front ends issue [`Action`]s and render immutable
//!   [`SessionSnapshot`]s
//! - **Timer engine**: a wall-clock state machine; the caller invokes
//!   `tick(now_ms)` once per frame
//! - **Audio**: one live playback handle; network-bound stream resolution
//!   runs on a single worker thread and lands through a one-slot handoff
//!   cell
//! - **Storage**: SQLite-backed persistence for the growth counter and
//!   TOML-based configuration
//!
//! ## Key Components
//!
//! - [`SessionOrchestrator`]: the composition root
//! - [`TimerEngine`]: Pomodoro phase machine
//! - [`AudioOrchestrator`]: playback modes and resolution lifecycle
//! - [`Config`] / [`Database`]: configuration and persistence

pub mod art;
pub mod audio;
pub mod clock;
pub mod error;
pub mod events;
pub mod growth;
pub mod menu;
pub mod notify;
pub mod quotes;
pub mod session;
pub mod storage;
pub mod timer;
pub mod weather;

pub use art::{ArtSource, BuiltinArtSource, FileArtSource};
pub use audio::{
    AudioMode, AudioOrchestrator, Cue, MediaBackend, Player, PlaylistRef, SoftBackend,
    StreamResolver, TrackSource, YoutubeResolver,
};
pub use error::{ConfigError, CoreError, PlaybackError, ResolutionError, StorageError};
pub use events::Event;
pub use growth::{GrowthCounter, Tier};
pub use menu::{MenuList, MenuModel};
pub use notify::{Notification, NotificationCenter};
pub use quotes::QuoteSource;
pub use session::{Action, InputPrompt, SessionOrchestrator, SessionSnapshot};
pub use storage::{Config, Database};
pub use timer::{Phase, TimerEngine, TimerPreset};
pub use weather::{Particle, Season, WeatherOverlay};
