//! Session orchestration.
//!
//! One cooperative control loop owns every piece of mutable state. Each
//! frame the front end calls `tick(now_ms)` -- which advances the children
//! in a fixed order (timer, audio, menu, notification, weather, growth) --
//! applies at most one queued `Action`, and renders the immutable
//! [`SessionSnapshot`]. Front ends never reach into session fields; they
//! issue intents and draw snapshots, so a second front end is a new key
//! map and renderer, not a fork of this module.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::art::ArtSource;
use crate::audio::{
    AudioMode, AudioOrchestrator, Cue, MediaBackend, PlaylistRef, StreamResolver,
};
use crate::error::{ConfigError, CoreError};
use crate::events::Event;
use crate::growth::{GrowthCounter, Tier};
use crate::menu::{MenuList, MenuModel};
use crate::notify::{Notification, NotificationCenter, BAR_TTL_MS, DEFAULT_TTL_MS};
use crate::quotes::QuoteSource;
use crate::storage::Config;
use crate::timer::{Phase, PresetKind, TimerEngine, TimerPreset};
use crate::weather::{Particle, Season, WeatherOverlay};

const BREAK_OVER_BANNER: &str = "BREAK IS OVER, PRESS ENTER TO START NEW TIMER";
const TIMER_OVER_BANNER: &str = "TIMER IS OVER, PRESS ENTER";
const VALUE_ERROR_TEXT: &str = "VALUE ERROR, PLEASE ENTER AN INTEGER";
const INVALID_LINK_TEXT: &str = "INVALID PLAYLIST LINK, PLEASE PASTE A FULL URL";
const RESOLVE_ERROR_TEXT: &str = "ERROR GETTING AUDIO, PLEASE TRY AGAIN";
const RADIO_DEAD_TEXT: &str = "UNABLE TO CONNECT, PLEASE CHECK INTERNET CONNECTION";

const SEEK_STEP_MS: i64 = 10_000;
pub const SPINNER_FRAMES: usize = 15;

/// Logical input intents. Front ends map their own key bindings onto
/// these; the core never sees raw key codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    MenuUp,
    MenuDown,
    MenuLeft,
    MenuRight,
    Confirm,
    /// Pause/resume the whole session: media and timer together.
    TogglePause,
    /// Pause/resume the media only.
    ToggleMedia,
    VolumeUp,
    VolumeDown,
    EffectVolumeUp,
    EffectVolumeDown,
    SeekForward,
    SeekBackward,
    /// Jump to `n/10` of the current track.
    SeekTenth(u8),
    ToggleLoop,
    ToggleEffectMute,
    /// Restart radio on the most recent playlist.
    StartRadio,
    /// Line entered in the modal prompt.
    SubmitInput(String),
    CancelInput,
    Quit,
}

/// Modal text-entry states. While one is open, navigation actions are
/// ignored but the tick/render loop keeps running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputPrompt {
    WorkMinutes,
    BreakMinutes { work_secs: u64 },
    RemoteQuery,
    PlaylistUrl,
}

impl InputPrompt {
    pub fn label(&self) -> &'static str {
        match self {
            InputPrompt::WorkMinutes => "ENTER WORK LENGTH (min) : ",
            InputPrompt::BreakMinutes { .. } => "ENTER BREAK LENGTH (min) : ",
            InputPrompt::RemoteQuery => "SEARCH or PASTE URL [type 'q' to exit]: ",
            InputPrompt::PlaylistUrl => "ENTER PLAYLIST LINK : ",
        }
    }
}

/// What the feature menu's entries do, derived from the config playlists.
enum FeatureEntry {
    RemotePrompt,
    Playlist(usize),
    CustomPlaylist,
}

/// Read-only render state for one frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub age: f64,
    pub tier: Tier,
    pub art: String,
    pub quote: String,
    pub phase: Phase,
    pub seconds_left: u64,
    /// Countdown line, present in `Working`/`OnBreak`.
    pub timer_line: Option<String>,
    /// Blinking banner, present in `OnBreak` (end-early hint) and
    /// `BreakOver`.
    pub banner: Option<String>,
    pub paused: bool,
    pub menu_visible: bool,
    pub active_list: MenuList,
    pub timer_items: Vec<String>,
    pub feature_items: Vec<String>,
    pub selected: usize,
    pub notification: Option<Notification>,
    pub loading: bool,
    pub spinner_frame: usize,
    pub volume: u8,
    pub looping: bool,
    pub radio: bool,
    pub track_title: String,
    pub input_prompt: Option<String>,
    pub season: Season,
    pub weather: Vec<Particle>,
}

pub struct SessionOrchestrator {
    timer: TimerEngine,
    menu: MenuModel,
    audio: AudioOrchestrator,
    notifications: NotificationCenter,
    weather: WeatherOverlay,
    growth: GrowthCounter,
    quotes: QuoteSource,
    art: Box<dyn ArtSource>,
    presets: Vec<TimerPreset>,
    playlists: Vec<PlaylistRef>,
    current_playlist: Option<PlaylistRef>,
    /// Durations of the last started timer, for the break-over restart.
    last_durations: Option<(u64, u64)>,
    break_over_banner: &'static str,
    quote: String,
    input: Option<InputPrompt>,
    effect_volume: u8,
    effects_muted: bool,
    paused: bool,
    weather_enabled: bool,
    tick_count: u64,
    quit: bool,
}

impl SessionOrchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: &Config,
        age: f64,
        backend: Box<dyn MediaBackend>,
        resolver: Arc<dyn StreamResolver>,
        art: Box<dyn ArtSource>,
        quotes: QuoteSource,
        local_tracks: Vec<std::path::PathBuf>,
        now_ms: u64,
    ) -> Result<Self, ConfigError> {
        let presets = config.timer_presets();
        let playlists = config.radio.clone();

        let timer_items: Vec<String> = presets.iter().map(|p| p.label()).collect();
        let mut feature_items = vec!["PLAY MUSIC FROM YOUTUBE".to_string()];
        feature_items.extend(playlists.iter().map(|p| p.name.clone()));
        feature_items.push("CUSTOM PLAYLIST".to_string());
        let menu = MenuModel::new(timer_items, feature_items)?;

        let mut audio = AudioOrchestrator::new(
            backend,
            resolver,
            local_tracks,
            config.audio.volume.min(100) as u8,
            config.audio.max_resolve_attempts,
        );
        if config.audio.loop_enabled {
            audio.toggle_loop();
        }

        let quote = quotes.random_quote();
        let current_playlist = playlists.first().cloned();
        let effect_volume = config.audio.effect_volume.min(100) as u8;

        let mut session = Self {
            timer: TimerEngine::new(),
            menu,
            audio,
            notifications: NotificationCenter::new(),
            weather: WeatherOverlay::new(now_ms),
            growth: GrowthCounter::new(age, config.growth.interval_secs, now_ms),
            quotes,
            art,
            presets,
            playlists,
            current_playlist,
            last_durations: None,
            break_over_banner: BREAK_OVER_BANNER,
            quote,
            input: None,
            effect_volume,
            effects_muted: false,
            paused: false,
            weather_enabled: config.ui.weather_enabled,
            tick_count: 0,
            quit: false,
        };

        // The session opens with ambience running and the growth chime,
        // same as a fresh planting.
        session.cue(Cue::Growth);
        if let Some(event) = session.audio.play_local(0, now_ms) {
            session.consume(event, now_ms);
        }
        Ok(session)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn age(&self) -> f64 {
        self.growth.age()
    }

    pub fn phase(&self) -> Phase {
        self.timer.phase()
    }

    pub fn input_prompt(&self) -> Option<&InputPrompt> {
        self.input.as_ref()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    // ── Tick ─────────────────────────────────────────────────────────

    /// Advance every child once, in a fixed order.
    pub fn tick(&mut self, now_ms: u64) {
        self.tick_count += 1;

        if let Some(event) = self.timer.tick(now_ms) {
            self.consume(event, now_ms);
        }
        for event in self.audio.tick(now_ms) {
            self.consume(event, now_ms);
        }
        self.menu.tick(now_ms);
        self.notifications.tick(now_ms);
        self.weather.tick(now_ms);
        if !self.paused {
            if let Some(event) = self.growth.tick(now_ms) {
                self.consume(event, now_ms);
            }
        }
    }

    /// Fan an event out into cues, notifications, and audio control.
    fn consume(&mut self, event: Event, now_ms: u64) {
        match event {
            Event::BreakStarted { .. } => {
                self.cue(Cue::Alarm);
                self.audio.pause_media();
            }
            Event::BreakEnded { .. } => {
                self.cue(Cue::Alarm);
                self.audio.resume_media();
            }
            Event::TrackStarted { title, .. } => {
                self.notifications
                    .post(format!("Playing: {title}"), DEFAULT_TTL_MS, false, now_ms);
            }
            Event::ResolutionFailed { reason, .. } => {
                debug!(%reason, "resolution failed");
                self.notifications
                    .post(RESOLVE_ERROR_TEXT, DEFAULT_TTL_MS, false, now_ms);
            }
            Event::RadioStopped { attempts, .. } => {
                info!(attempts, "radio gave up");
                self.notifications
                    .post(RADIO_DEAD_TEXT, 2 * DEFAULT_TTL_MS, false, now_ms);
            }
            Event::GrowthAdvanced { age, tier, .. } => {
                debug!(age, ?tier, "tree grew");
                self.cue(Cue::Growth);
                self.quote = self.quotes.random_quote();
            }
            Event::TimerStarted { .. }
            | Event::TimerCancelled { .. }
            | Event::TimerSuspended { .. }
            | Event::TimerResumed { .. } => {}
        }
    }

    // ── Input dispatch ───────────────────────────────────────────────

    /// Apply one logical action. The dispatch is flat; front ends decide
    /// which keys produce which actions.
    pub fn apply(&mut self, action: Action, now_ms: u64) {
        // Modal entry suspends navigation but not the loop.
        if self.input.is_some() {
            match action {
                Action::SubmitInput(text) => self.submit_input(text, now_ms),
                Action::CancelInput => self.input = None,
                Action::Quit => self.quit = true,
                _ => {}
            }
            return;
        }

        match action {
            Action::MenuUp => self.menu.move_selection(-1, now_ms),
            Action::MenuDown => self.menu.move_selection(1, now_ms),
            Action::MenuLeft => {
                if self.menu.is_visible() {
                    self.menu.show(MenuList::Timer, now_ms);
                } else if let Some(event) = self.audio.advance(-1, now_ms) {
                    self.consume(event, now_ms);
                }
            }
            Action::MenuRight => {
                if self.menu.is_visible() {
                    self.menu.show(MenuList::Feature, now_ms);
                } else if let Some(event) = self.audio.advance(1, now_ms) {
                    self.consume(event, now_ms);
                }
            }
            Action::Confirm => self.confirm(now_ms),
            Action::TogglePause => self.toggle_pause(now_ms),
            Action::ToggleMedia => self.audio.toggle_media(),
            Action::VolumeUp => self.bump_volume(1, now_ms),
            Action::VolumeDown => self.bump_volume(-1, now_ms),
            Action::EffectVolumeUp => self.bump_effect_volume(1, now_ms),
            Action::EffectVolumeDown => self.bump_effect_volume(-1, now_ms),
            Action::SeekForward => self.seek_by(SEEK_STEP_MS, now_ms),
            Action::SeekBackward => self.seek_by(-SEEK_STEP_MS, now_ms),
            Action::SeekTenth(n) => {
                if let Some((pos, len)) = self.audio.seek_tenth(n) {
                    self.post_position_bar(pos, len, now_ms);
                }
            }
            Action::ToggleLoop => {
                let looping = self.audio.toggle_loop();
                self.notifications
                    .post(format!("REPEAT: {looping}"), BAR_TTL_MS, false, now_ms);
            }
            Action::ToggleEffectMute => {
                self.effects_muted = !self.effects_muted;
                info!(muted = self.effects_muted, "effect sounds toggled");
            }
            Action::StartRadio => {
                if let Some(playlist) = self.current_playlist.clone() {
                    self.start_radio(playlist);
                }
            }
            Action::SubmitInput(_) | Action::CancelInput => {}
            Action::Quit => self.quit = true,
        }
    }

    fn confirm(&mut self, now_ms: u64) {
        if self.menu.is_visible() {
            let (list, index) = self.menu.confirm();
            match list {
                MenuList::Timer => self.confirm_timer(index, now_ms),
                MenuList::Feature => self.confirm_feature(index, now_ms),
            }
            self.menu.hide();
            return;
        }
        if self.timer.phase() == Phase::BreakOver {
            if let Some((work, brk)) = self.last_durations {
                self.start_timer(work, brk, now_ms);
            }
        }
    }

    fn confirm_timer(&mut self, index: usize, now_ms: u64) {
        let Some(preset) = self.presets.get(index).cloned() else {
            return;
        };
        match preset.kind {
            PresetKind::Custom => self.input = Some(InputPrompt::WorkMinutes),
            _ => {
                if let Some((work, brk)) = preset.durations_secs() {
                    self.break_over_banner = match preset.kind {
                        PresetKind::EndNow => TIMER_OVER_BANNER,
                        _ => BREAK_OVER_BANNER,
                    };
                    self.start_timer(work, brk, now_ms);
                }
            }
        }
    }

    fn feature_entry(&self, index: usize) -> FeatureEntry {
        if index == 0 {
            FeatureEntry::RemotePrompt
        } else if index <= self.playlists.len() {
            FeatureEntry::Playlist(index - 1)
        } else {
            FeatureEntry::CustomPlaylist
        }
    }

    fn confirm_feature(&mut self, index: usize, _now_ms: u64) {
        match self.feature_entry(index) {
            FeatureEntry::RemotePrompt => self.input = Some(InputPrompt::RemoteQuery),
            FeatureEntry::Playlist(i) => {
                if let Some(playlist) = self.playlists.get(i).cloned() {
                    self.start_radio(playlist);
                }
            }
            FeatureEntry::CustomPlaylist => self.input = Some(InputPrompt::PlaylistUrl),
        }
        self.cue(Cue::TimerStart);
    }

    fn start_timer(&mut self, work_secs: u64, break_secs: u64, now_ms: u64) {
        self.last_durations = Some((work_secs, break_secs));
        let event = self.timer.start(work_secs, break_secs, now_ms);
        self.consume(event, now_ms);
        self.cue(Cue::TimerStart);
    }

    fn start_radio(&mut self, playlist: PlaylistRef) {
        self.current_playlist = Some(playlist.clone());
        match self.audio.start_radio(playlist) {
            Ok(()) => {}
            // Already resolving: same as the original, the request is
            // simply ignored until the pending one lands.
            Err(CoreError::Busy) => debug!("radio request while busy"),
            Err(err) => debug!(%err, "radio request failed"),
        }
    }

    fn toggle_pause(&mut self, now_ms: u64) {
        if self.paused {
            self.paused = false;
            if let Some(event) = self.timer.resume(now_ms) {
                self.consume(event, now_ms);
            }
            self.audio.resume_media();
            return;
        }
        // During a break, the pause key dismisses the break instead:
        // music comes back and the timer goes idle.
        if self.timer.phase() == Phase::OnBreak {
            if let Some(event) = self.timer.cancel(now_ms) {
                self.consume(event, now_ms);
            }
            self.audio.resume_media();
            return;
        }
        self.paused = true;
        if let Some(event) = self.timer.suspend(now_ms) {
            self.consume(event, now_ms);
        }
        self.audio.pause_media();
    }

    fn bump_volume(&mut self, delta: i64, now_ms: u64) {
        let volume = self.audio.set_volume(delta);
        self.notifications
            .post(format!("VOLUME: {volume}%"), BAR_TTL_MS, true, now_ms);
    }

    fn bump_effect_volume(&mut self, delta: i64, now_ms: u64) {
        self.effect_volume = (self.effect_volume as i64 + delta).clamp(0, 100) as u8;
        let volume = self.effect_volume;
        self.notifications
            .post(format!("EFFECT VOLUME: {volume}%"), BAR_TTL_MS, true, now_ms);
    }

    fn seek_by(&mut self, delta_ms: i64, now_ms: u64) {
        if let Some((pos, len)) = self.audio.seek(delta_ms) {
            self.post_position_bar(pos, len, now_ms);
        }
    }

    fn post_position_bar(&mut self, position_ms: u64, _length_ms: u64, now_ms: u64) {
        let secs = position_ms / 1_000;
        let text = format!("{:02}:{:02}", secs / 60, secs % 60);
        self.notifications.post(text, BAR_TTL_MS, true, now_ms);
    }

    fn submit_input(&mut self, text: String, now_ms: u64) {
        let Some(prompt) = self.input.clone() else {
            return;
        };
        match prompt {
            InputPrompt::WorkMinutes => match parse_minutes(&text) {
                Ok(mins) => {
                    self.input = Some(InputPrompt::BreakMinutes { work_secs: mins * 60 });
                }
                Err(_) => self.reject_duration(now_ms),
            },
            InputPrompt::BreakMinutes { work_secs } => match parse_minutes(&text) {
                Ok(mins) => {
                    self.input = None;
                    self.break_over_banner = BREAK_OVER_BANNER;
                    self.start_timer(work_secs, mins * 60, now_ms);
                }
                Err(_) => self.reject_duration(now_ms),
            },
            InputPrompt::RemoteQuery => {
                self.input = None;
                let text = text.trim().to_string();
                if text.is_empty() || text == "q" {
                    return;
                }
                let is_url = text.starts_with("http://") || text.starts_with("https://");
                match self.audio.play_remote(&text, is_url) {
                    Ok(()) => {}
                    Err(CoreError::Busy) => debug!("remote request while busy"),
                    Err(err) => debug!(%err, "remote request failed"),
                }
            }
            InputPrompt::PlaylistUrl => {
                let raw = text.trim().to_string();
                if raw.is_empty() {
                    self.input = None;
                    return;
                }
                // Reject garbage here instead of burning the radio's
                // retry budget on it.
                if url::Url::parse(&raw).is_err() {
                    self.notifications
                        .post(INVALID_LINK_TEXT, DEFAULT_TTL_MS, false, now_ms);
                    return;
                }
                self.input = None;
                self.start_radio(PlaylistRef {
                    name: "CUSTOM PLAYLIST".into(),
                    url: raw,
                });
            }
        }
    }

    /// Invalid duration: notify and leave the prompt open for another try.
    fn reject_duration(&mut self, now_ms: u64) {
        self.notifications
            .post(VALUE_ERROR_TEXT, DEFAULT_TTL_MS, false, now_ms);
    }

    fn cue(&self, cue: Cue) {
        // The alarm always sounds; the mute toggle only covers the
        // decorative cues.
        if self.effects_muted && cue != Cue::Alarm {
            return;
        }
        self.audio.play_cue(cue, self.effect_volume);
    }

    // ── Snapshot ─────────────────────────────────────────────────────

    /// Immutable render state for this frame. `cols`/`rows` size the
    /// weather field to the render area.
    pub fn snapshot(&self, now_ms: u64, cols: u16, rows: u16) -> SessionSnapshot {
        let phase = self.timer.phase();
        let seconds_left = self.timer.seconds_left(now_ms);
        let timer_line = match phase {
            Phase::Working => Some(format!(
                "Break in: {:02}:{:02}",
                seconds_left / 60,
                seconds_left % 60
            )),
            Phase::OnBreak => Some(format!(
                "Break ends in: {:02}:{:02}",
                seconds_left / 60,
                seconds_left % 60
            )),
            _ => None,
        };
        let banner = match phase {
            Phase::OnBreak => Some("PRESS SPACE TO END BREAK".to_string()),
            Phase::BreakOver => Some(self.break_over_banner.to_string()),
            _ => None,
        };
        let weather = if self.weather_enabled {
            self.weather.particles(now_ms, cols, rows)
        } else {
            Vec::new()
        };

        SessionSnapshot {
            age: self.growth.age(),
            tier: self.growth.tier(),
            art: self.art.art(self.growth.tier()),
            quote: self.quote.clone(),
            phase,
            seconds_left,
            timer_line,
            banner,
            paused: self.paused,
            menu_visible: self.menu.is_visible(),
            active_list: self.menu.active_list(),
            timer_items: self.menu.items(MenuList::Timer).to_vec(),
            feature_items: self.menu.items(MenuList::Feature).to_vec(),
            selected: self.menu.selected(),
            notification: self.notifications.current().cloned(),
            loading: self.audio.is_loading(),
            spinner_frame: (self.tick_count / 2) as usize % SPINNER_FRAMES,
            volume: self.audio.volume(),
            looping: self.audio.is_looping(),
            radio: matches!(self.audio.mode(), AudioMode::Radio(_)),
            track_title: self.audio.title().to_string(),
            input_prompt: self.input.as_ref().map(|p| p.label().to_string()),
            season: self.weather.season(),
            weather,
        }
    }
}

fn parse_minutes(text: &str) -> Result<u64, CoreError> {
    text.trim()
        .parse::<u64>()
        .map_err(|_| CoreError::InvalidDuration {
            input: text.to_string(),
        })
}
