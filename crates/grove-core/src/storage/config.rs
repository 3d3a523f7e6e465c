//! TOML-based application configuration.
//!
//! Stores user preferences:
//! - Timer presets (work/break minute pairs)
//! - Audio defaults (volume, loop, local music directory, retry bound)
//! - Radio playlists
//! - Growth cadence and UI toggles
//!
//! Configuration is stored at `~/.config/grove/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::audio::PlaylistRef;
use crate::error::ConfigError;
use crate::timer::{presets_from_pairs, TimerPreset};

/// One work/break pair, in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetPair {
    pub work_min: u64,
    pub break_min: u64,
}

/// Timer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_preset_pairs")]
    pub presets: Vec<PresetPair>,
}

/// Audio configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    #[serde(default = "default_100")]
    pub volume: u32,
    #[serde(default = "default_100")]
    pub effect_volume: u32,
    #[serde(default)]
    pub loop_enabled: bool,
    /// Directory scanned for local ambience tracks. Defaults to
    /// `<data_dir>/music`.
    #[serde(default)]
    pub music_dir: Option<PathBuf>,
    #[serde(default = "default_resolve_attempts")]
    pub max_resolve_attempts: u32,
}

/// Growth configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrowthConfig {
    /// Seconds of session time per growth unit (and per quote rotation).
    #[serde(default = "default_growth_interval")]
    pub interval_secs: u64,
}

/// UI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_true")]
    pub weather_enabled: bool,
    /// Override for the quote file; defaults to `<data_dir>/qts.txt`.
    #[serde(default)]
    pub quote_file: Option<PathBuf>,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/grove/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub growth: GrowthConfig,
    #[serde(default)]
    pub ui: UiConfig,
    /// Radio playlists, shown on the feature menu in order.
    #[serde(default = "default_radio_playlists")]
    pub radio: Vec<PlaylistRef>,
}

// Default functions
fn default_preset_pairs() -> Vec<PresetPair> {
    vec![
        PresetPair { work_min: 20, break_min: 20 },
        PresetPair { work_min: 20, break_min: 10 },
        PresetPair { work_min: 40, break_min: 20 },
        PresetPair { work_min: 50, break_min: 10 },
    ]
}
fn default_radio_playlists() -> Vec<PlaylistRef> {
    vec![
        PlaylistRef {
            name: "LOFI RADIO 1".into(),
            url: "https://www.youtube.com/playlist?list=PL6fhs6TSspZvN45CPJApnMYVsWhkt55h7".into(),
        },
        PlaylistRef {
            name: "LOFI RADIO 2".into(),
            url: "https://www.youtube.com/playlist?list=PL0ONFXpPDe_mtm3ciwL-v7EE-7yLHDlP8".into(),
        },
        PlaylistRef {
            name: "LOFI RADIO 3".into(),
            url: "https://www.youtube.com/playlist?list=PLKYTmz7SemaqVDF6XJ15bv_8-j7ckkNgb".into(),
        },
    ]
}
fn default_100() -> u32 {
    100
}
fn default_resolve_attempts() -> u32 {
    3
}
fn default_growth_interval() -> u64 {
    600
}
fn default_true() -> bool {
    true
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            presets: default_preset_pairs(),
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            volume: 100,
            effect_volume: 100,
            loop_enabled: false,
            music_dir: None,
            max_resolve_attempts: default_resolve_attempts(),
        }
    }
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_growth_interval(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            weather_enabled: true,
            quote_file: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timer: TimerConfig::default(),
            audio: AudioConfig::default(),
            growth: GrowthConfig::default(),
            ui: UiConfig::default(),
            radio: default_radio_playlists(),
        }
    }
}

impl Config {
    fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config/grove"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from disk, writing the defaults out on first run.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }

    /// Load from disk, returning defaults on any error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// The timer menu: configured pairs plus the custom and end-now
    /// entries.
    pub fn timer_presets(&self) -> Vec<TimerPreset> {
        presets_from_pairs(
            self.timer
                .presets
                .iter()
                .map(|p| (p.work_min, p.break_min)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::PresetKind;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.audio.volume, 100);
        assert_eq!(parsed.radio.len(), 3);
        assert_eq!(parsed.growth.interval_secs, 600);
        assert!(parsed.ui.weather_enabled);
    }

    #[test]
    fn empty_toml_fills_every_default() {
        let parsed: Config = toml::from_str("").unwrap();
        assert_eq!(parsed.timer.presets.len(), 4);
        assert_eq!(parsed.audio.max_resolve_attempts, 3);
    }

    #[test]
    fn timer_presets_end_with_custom_and_end_now() {
        let presets = Config::default().timer_presets();
        assert_eq!(presets.len(), 6);
        assert_eq!(presets[0].label(), "POMODORO 20+20");
        assert!(matches!(presets[4].kind, PresetKind::Custom));
        assert!(matches!(presets[5].kind, PresetKind::EndNow));
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let parsed: Config = toml::from_str("[audio]\nvolume = 40\n").unwrap();
        assert_eq!(parsed.audio.volume, 40);
        assert_eq!(parsed.audio.effect_volume, 100);
        assert!(!parsed.audio.loop_enabled);
    }
}
