//! Audio orchestration: one live handle, three source modes, and the
//! background resolution lifecycle.
//!
//! The orchestrator owns the only playable handle and swaps it whole;
//! volume, loop flag, and the pending-resolution state live here instead of
//! in process globals. Local playback is synchronous. Remote playback and
//! radio rotation resolve on the single worker thread and adopt the result
//! from the handoff cell on a later tick, so the control loop never waits
//! on the network.
//!
//! Radio mode keeps the next track pre-resolved: as soon as a track is
//! adopted a prefetch for the following one starts, and the end-of-track
//! check swaps to it once the remaining playtime drops under the gapless
//! threshold.

mod handoff;
mod player;
mod resolver;

pub use handoff::HandoffCell;
pub use player::{Cue, MediaBackend, Player, SoftBackend, SoftPlayer, TrackSource};
pub use resolver::{
    PlaylistRef, ResolveRequest, ResolvedStream, StreamResolver, YoutubeResolver,
};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use crate::error::{CoreError, Result};
use crate::events::{at, Event};

/// Remaining playtime under which the next track is swapped in.
pub const GAPLESS_THRESHOLD_MS: u64 = 1_000;

/// Audio source mode. The local playlist position survives mode switches,
/// so it lives beside the mode rather than inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioMode {
    LocalPlaylist,
    SingleStream,
    Radio(PlaylistRef),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResolvePurpose {
    /// Adopt the resolved stream as the live handle.
    Adopt,
    /// Park it as the radio's next track.
    Prefetch,
}

pub struct AudioOrchestrator {
    backend: Box<dyn MediaBackend>,
    resolver: Arc<dyn StreamResolver>,
    local_tracks: Vec<PathBuf>,
    local_index: usize,
    mode: AudioMode,
    handle: Option<Box<dyn Player>>,
    title: String,
    loop_track: bool,
    volume: u8,
    cell: HandoffCell,
    pending: Option<ResolvePurpose>,
    prefetched: Option<ResolvedStream>,
    attempts: u32,
    max_attempts: u32,
}

impl AudioOrchestrator {
    pub fn new(
        backend: Box<dyn MediaBackend>,
        resolver: Arc<dyn StreamResolver>,
        local_tracks: Vec<PathBuf>,
        volume: u8,
        max_resolve_attempts: u32,
    ) -> Self {
        Self {
            backend,
            resolver,
            local_tracks,
            local_index: 0,
            mode: AudioMode::LocalPlaylist,
            handle: None,
            title: String::new(),
            loop_track: false,
            volume: volume.min(100),
            cell: HandoffCell::new(),
            pending: None,
            prefetched: None,
            attempts: 0,
            max_attempts: max_resolve_attempts.max(1),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> &AudioMode {
        &self.mode
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn is_looping(&self) -> bool {
        self.loop_track
    }

    /// A background resolution is in flight; the UI shows the spinner.
    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn has_prefetch(&self) -> bool {
        self.prefetched.is_some()
    }

    pub fn is_playing(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| h.is_playing())
    }

    pub fn position_ms(&self) -> u64 {
        self.handle.as_ref().map_or(0, |h| h.position_ms())
    }

    pub fn length_ms(&self) -> u64 {
        self.handle.as_ref().map_or(0, |h| h.length_ms())
    }

    pub fn local_track_count(&self) -> usize {
        self.local_tracks.len()
    }

    pub fn local_index(&self) -> usize {
        self.local_index
    }

    // ── Local playback ───────────────────────────────────────────────

    /// Synchronous swap to a local playlist entry. The prior handle is
    /// stopped and released first; no two handles are ever alive.
    pub fn play_local(&mut self, index: usize, now_ms: u64) -> Option<Event> {
        if self.local_tracks.is_empty() {
            return None;
        }
        let index = index.min(self.local_tracks.len() - 1);
        let source = TrackSource::LocalFile(self.local_tracks[index].clone());
        self.local_index = index;
        self.mode = AudioMode::LocalPlaylist;
        self.adopt_source(&source, source.display_name(), now_ms)
    }

    /// Step the local playlist. Clamps at either end rather than wrapping,
    /// and always leaves radio/stream mode.
    pub fn advance(&mut self, direction: i64, now_ms: u64) -> Option<Event> {
        if self.local_tracks.is_empty() {
            return None;
        }
        let last = self.local_tracks.len() as i64 - 1;
        let next = (self.local_index as i64 + direction).clamp(0, last) as usize;
        self.play_local(next, now_ms)
    }

    // ── Remote playback ──────────────────────────────────────────────

    /// Resolve a URL or search query in the background and adopt the
    /// result. Rejects with `Busy` while another resolution is in flight.
    pub fn play_remote(&mut self, input: &str, is_url: bool) -> Result<()> {
        if self.pending.is_some() {
            return Err(CoreError::Busy);
        }
        self.stop_handle();
        self.mode = AudioMode::SingleStream;
        self.prefetched = None;
        self.attempts = 0;
        let request = if is_url {
            ResolveRequest::Url(input.to_string())
        } else {
            ResolveRequest::Query(input.to_string())
        };
        self.spawn(ResolvePurpose::Adopt, request);
        Ok(())
    }

    /// Start rotating random tracks out of `playlist`.
    pub fn start_radio(&mut self, playlist: PlaylistRef) -> Result<()> {
        if self.pending.is_some() {
            return Err(CoreError::Busy);
        }
        self.stop_handle();
        self.mode = AudioMode::Radio(playlist.clone());
        self.prefetched = None;
        self.attempts = 0;
        self.spawn(ResolvePurpose::Adopt, ResolveRequest::PlaylistPick(playlist));
        Ok(())
    }

    // ── Transport ────────────────────────────────────────────────────

    /// Clamped volume step; idempotent at both bounds.
    pub fn set_volume(&mut self, delta: i64) -> u8 {
        self.volume = (self.volume as i64 + delta).clamp(0, 100) as u8;
        if let Some(h) = self.handle.as_mut() {
            h.set_volume(self.volume);
        }
        self.volume
    }

    /// Relative seek, clamped into `[0, length]`. Returns the new
    /// position and the track length for the feedback bar.
    pub fn seek(&mut self, delta_ms: i64) -> Option<(u64, u64)> {
        let h = self.handle.as_mut()?;
        let length = h.length_ms();
        let target = (h.position_ms() as i64 + delta_ms).clamp(0, length as i64) as u64;
        h.seek_ms(target);
        Some((target, length))
    }

    /// Jump to `tenths/10` of the track (the digit keys).
    pub fn seek_tenth(&mut self, tenths: u8) -> Option<(u64, u64)> {
        let h = self.handle.as_mut()?;
        let length = h.length_ms();
        let target = length.saturating_mul(tenths.min(10) as u64) / 10;
        h.seek_ms(target);
        Some((target, length))
    }

    pub fn toggle_loop(&mut self) -> bool {
        self.loop_track = !self.loop_track;
        self.loop_track
    }

    /// Media-only pause toggle (the timer keeps running).
    pub fn toggle_media(&mut self) {
        if let Some(h) = self.handle.as_mut() {
            if h.is_playing() {
                h.pause();
            } else {
                h.play();
            }
        }
    }

    pub fn pause_media(&mut self) {
        if let Some(h) = self.handle.as_mut() {
            if h.is_playing() {
                h.pause();
            }
        }
    }

    pub fn resume_media(&mut self) {
        if let Some(h) = self.handle.as_mut() {
            h.play();
        }
    }

    pub fn play_cue(&self, cue: Cue, volume: u8) {
        self.backend.play_cue(cue, volume);
    }

    // ── Tick ─────────────────────────────────────────────────────────

    /// Drain the handoff cell, then run the end-of-track policy. Called
    /// once per frame by the session.
    pub fn tick(&mut self, now_ms: u64) -> Vec<Event> {
        let mut events = Vec::new();

        if let Some(result) = self.cell.take() {
            // A deposit with no pending marker is a stale resolution that
            // was never superseded; adopt it like the original would.
            let purpose = self.pending.take().unwrap_or(ResolvePurpose::Adopt);
            match result {
                Ok(stream) => {
                    self.attempts = 0;
                    match purpose {
                        ResolvePurpose::Adopt => {
                            events.extend(self.adopt_stream(stream, now_ms));
                            self.request_prefetch();
                        }
                        ResolvePurpose::Prefetch => self.prefetched = Some(stream),
                    }
                }
                Err(err) => events.extend(self.on_resolution_failure(purpose, err, now_ms)),
            }
        }

        if self.at_end_of_track() {
            events.extend(self.on_end_of_track(now_ms));
        }

        events
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn spawn(&mut self, purpose: ResolvePurpose, request: ResolveRequest) {
        self.pending = Some(purpose);
        handoff::spawn_resolution(Arc::clone(&self.resolver), request, self.cell.clone());
    }

    /// Keep the radio's next track resolved at all times.
    fn request_prefetch(&mut self) {
        if self.pending.is_some() || self.prefetched.is_some() {
            return;
        }
        if let AudioMode::Radio(playlist) = &self.mode {
            let request = ResolveRequest::PlaylistPick(playlist.clone());
            self.spawn(ResolvePurpose::Prefetch, request);
        }
    }

    fn on_resolution_failure(
        &mut self,
        purpose: ResolvePurpose,
        err: crate::error::ResolutionError,
        now_ms: u64,
    ) -> Vec<Event> {
        if let AudioMode::Radio(playlist) = self.mode.clone() {
            self.attempts += 1;
            if self.attempts >= self.max_attempts {
                warn!(attempts = self.attempts, %err, "radio retry budget spent");
                let attempts = self.attempts;
                self.attempts = 0;
                self.mode = AudioMode::LocalPlaylist;
                return vec![Event::RadioStopped {
                    attempts,
                    at: at(now_ms),
                }];
            }
            // Same playlist, fresh random pick.
            self.spawn(purpose, ResolveRequest::PlaylistPick(playlist));
            return Vec::new();
        }
        vec![Event::ResolutionFailed {
            reason: err.to_string(),
            at: at(now_ms),
        }]
    }

    fn adopt_stream(&mut self, stream: ResolvedStream, now_ms: u64) -> Option<Event> {
        let source = TrackSource::Stream {
            uri: stream.uri.clone(),
        };
        self.adopt_source(&source, stream.title, now_ms)
    }

    fn adopt_source(&mut self, source: &TrackSource, title: String, now_ms: u64) -> Option<Event> {
        self.stop_handle();
        match self.backend.open(source) {
            Ok(mut handle) => {
                handle.set_volume(self.volume);
                handle.play();
                self.handle = Some(handle);
                self.title = title.clone();
                info!(%title, "track started");
                Some(Event::TrackStarted {
                    title,
                    at: at(now_ms),
                })
            }
            Err(err) => {
                warn!(%err, "backend rejected source");
                Some(Event::ResolutionFailed {
                    reason: err.to_string(),
                    at: at(now_ms),
                })
            }
        }
    }

    fn stop_handle(&mut self) {
        if let Some(mut h) = self.handle.take() {
            h.stop();
        }
    }

    fn at_end_of_track(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| {
            h.is_playing()
                && h.length_ms() > 0
                && h.length_ms().saturating_sub(h.position_ms()) < GAPLESS_THRESHOLD_MS
        })
    }

    fn on_end_of_track(&mut self, now_ms: u64) -> Vec<Event> {
        match &self.mode {
            AudioMode::Radio(_) => {
                if let Some(next) = self.prefetched.take() {
                    let events: Vec<Event> =
                        self.adopt_stream(next, now_ms).into_iter().collect();
                    self.request_prefetch();
                    events
                } else {
                    // Prefetch never landed; fall back to a fresh fetch.
                    if self.pending.is_none() {
                        if let AudioMode::Radio(playlist) = self.mode.clone() {
                            self.spawn(
                                ResolvePurpose::Adopt,
                                ResolveRequest::PlaylistPick(playlist),
                            );
                        }
                    }
                    Vec::new()
                }
            }
            _ if self.loop_track => {
                if let Some(h) = self.handle.as_mut() {
                    h.seek_ms(0);
                }
                Vec::new()
            }
            _ => {
                // Stream or local track ran out: move on to the next
                // playlist entry, wrapping so the ambience never stops.
                if self.local_tracks.is_empty() {
                    self.stop_handle();
                    return Vec::new();
                }
                let next = match self.mode {
                    AudioMode::LocalPlaylist => (self.local_index + 1) % self.local_tracks.len(),
                    _ => self.local_index,
                };
                self.play_local(next, now_ms).into_iter().collect()
            }
        }
    }
}

/// Local ambience files, sorted by name for a stable playlist order.
pub fn scan_local_tracks(dir: &Path) -> Vec<PathBuf> {
    const AUDIO_EXTENSIONS: [&str; 6] = ["ogg", "mp3", "wav", "flac", "opus", "m4a"];
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut tracks: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .map(|e| AUDIO_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
                .unwrap_or(false)
        })
        .collect();
    tracks.sort();
    tracks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResolutionError;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::mpsc;
    use std::sync::Mutex;
    use std::time::Duration;

    const T0: u64 = 1_700_000_000_000;

    struct InstantResolver {
        calls: AtomicU32,
    }

    impl InstantResolver {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicU32::new(0),
            })
        }
    }

    impl StreamResolver for InstantResolver {
        fn resolve(&self, _r: &ResolveRequest) -> Result<ResolvedStream, ResolutionError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ResolvedStream {
                uri: format!("https://example.com/watch?v={n}"),
                title: format!("track {n}"),
            })
        }
    }

    struct FailingResolver {
        calls: AtomicU32,
    }

    impl FailingResolver {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicU32::new(0),
            })
        }
    }

    impl StreamResolver for FailingResolver {
        fn resolve(&self, _r: &ResolveRequest) -> Result<ResolvedStream, ResolutionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(ResolutionError::Network("down".into()))
        }
    }

    /// Blocks until the test releases it, to hold `pending` open.
    struct GatedResolver {
        gate: Mutex<mpsc::Receiver<()>>,
    }

    impl StreamResolver for GatedResolver {
        fn resolve(&self, _r: &ResolveRequest) -> Result<ResolvedStream, ResolutionError> {
            let _ = self.gate.lock().unwrap().recv();
            Ok(ResolvedStream {
                uri: "https://example.com/watch?v=gated".into(),
                title: "gated".into(),
            })
        }
    }

    fn orchestrator(resolver: Arc<dyn StreamResolver>) -> AudioOrchestrator {
        AudioOrchestrator::new(
            Box::new(SoftBackend),
            resolver,
            vec![PathBuf::from("a.ogg"), PathBuf::from("b.ogg")],
            100,
            3,
        )
    }

    /// Tick until `pred` holds or the deadline passes, collecting events.
    fn drain_until(
        orch: &mut AudioOrchestrator,
        pred: impl Fn(&AudioOrchestrator, &[Event]) -> bool,
    ) -> Vec<Event> {
        let mut all = Vec::new();
        for _ in 0..400 {
            all.extend(orch.tick(T0));
            if pred(orch, &all) {
                return all;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        panic!("condition never reached; events: {all:?}");
    }

    fn has_track_started(events: &[Event]) -> bool {
        events.iter().any(|e| matches!(e, Event::TrackStarted { .. }))
    }

    #[test]
    fn volume_clamps_idempotently_at_bounds() {
        let mut orch = orchestrator(InstantResolver::new());
        orch.play_local(0, T0);
        assert_eq!(orch.set_volume(1), 100);
        assert_eq!(orch.set_volume(1), 100);
        for _ in 0..300 {
            orch.set_volume(-1);
        }
        assert_eq!(orch.volume(), 0);
        assert_eq!(orch.set_volume(-1), 0);
    }

    #[test]
    fn advance_clamps_at_playlist_ends() {
        let mut orch = orchestrator(InstantResolver::new());
        orch.play_local(0, T0);
        assert!(orch.advance(-1, T0).is_some());
        assert_eq!(orch.local_index(), 0);
        orch.advance(1, T0);
        assert_eq!(orch.local_index(), 1);
        orch.advance(1, T0);
        assert_eq!(orch.local_index(), 1);
        assert_eq!(orch.mode(), &AudioMode::LocalPlaylist);
    }

    #[test]
    fn second_remote_request_is_busy() {
        let (tx, rx) = mpsc::channel();
        let resolver = Arc::new(GatedResolver {
            gate: Mutex::new(rx),
        });
        let mut orch = orchestrator(resolver);

        orch.play_remote("lofi", false).unwrap();
        assert!(orch.is_loading());
        let err = orch.play_remote("other", false).unwrap_err();
        assert!(matches!(err, CoreError::Busy));
        // State unchanged: still one pending resolution.
        assert!(orch.is_loading());

        tx.send(()).unwrap();
        let events = drain_until(&mut orch, |o, ev| !o.is_loading() && has_track_started(ev));
        assert!(events.iter().any(
            |e| matches!(e, Event::TrackStarted { title, .. } if title == "gated")
        ));
    }

    #[test]
    fn radio_adoption_always_rearms_a_prefetch() {
        let resolver = InstantResolver::new();
        let mut orch = orchestrator(resolver);
        orch.start_radio(PlaylistRef {
            name: "lofi 1".into(),
            url: "https://example.com/playlist?list=PL1".into(),
        })
        .unwrap();

        drain_until(&mut orch, |_, ev| has_track_started(ev));
        // No-gap invariant: right after adoption either the prefetch has
        // landed or its fetch is still in flight.
        assert!(orch.has_prefetch() || orch.is_loading());
        drain_until(&mut orch, |o, _| o.has_prefetch());

        // Push the track to its end: the prefetched stream is swapped in
        // and a fresh prefetch re-arms.
        orch.seek(i64::MAX / 2);
        let events = drain_until(&mut orch, |_, ev| has_track_started(ev));
        assert!(has_track_started(&events));
        assert!(orch.has_prefetch() || orch.is_loading());
    }

    #[test]
    fn radio_failure_retries_then_stops() {
        let resolver = FailingResolver::new();
        let calls = Arc::clone(&resolver);
        let mut orch = orchestrator(resolver);
        orch.start_radio(PlaylistRef {
            name: "dead".into(),
            url: "https://example.com/playlist?list=PL0".into(),
        })
        .unwrap();

        let events = drain_until(&mut orch, |_, ev| {
            ev.iter().any(|e| matches!(e, Event::RadioStopped { .. }))
        });
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::RadioStopped { attempts: 3, .. })));
        assert_eq!(calls.calls.load(Ordering::SeqCst), 3);
        assert_eq!(orch.mode(), &AudioMode::LocalPlaylist);
    }

    #[test]
    fn single_stream_failure_does_not_retry() {
        let resolver = FailingResolver::new();
        let calls = Arc::clone(&resolver);
        let mut orch = orchestrator(resolver);
        orch.play_remote("lofi", false).unwrap();

        let events = drain_until(&mut orch, |_, ev| {
            ev.iter().any(|e| matches!(e, Event::ResolutionFailed { .. }))
        });
        assert_eq!(calls.calls.load(Ordering::SeqCst), 1);
        assert!(!events.iter().any(|e| matches!(e, Event::RadioStopped { .. })));
        assert!(!orch.is_loading());
    }

    #[test]
    fn looped_track_rewinds_at_end() {
        let mut orch = orchestrator(InstantResolver::new());
        orch.play_local(0, T0);
        orch.toggle_loop();
        orch.seek(i64::MAX / 2);
        orch.tick(T0);
        assert!(orch.position_ms() < GAPLESS_THRESHOLD_MS);
        assert_eq!(orch.mode(), &AudioMode::LocalPlaylist);
    }

    #[test]
    fn finished_local_track_advances_to_next() {
        let mut orch = orchestrator(InstantResolver::new());
        orch.play_local(1, T0); // last entry
        orch.seek(i64::MAX / 2);
        orch.tick(T0);
        assert_eq!(orch.local_index(), 0, "wraps to keep ambience going");
        assert_eq!(orch.title(), "a.ogg");
    }

    #[test]
    fn finished_stream_falls_back_to_local_playlist() {
        let resolver = InstantResolver::new();
        let mut orch = orchestrator(resolver);
        orch.play_remote("lofi", false).unwrap();
        drain_until(&mut orch, |_, ev| has_track_started(ev));
        assert_eq!(orch.mode(), &AudioMode::SingleStream);

        orch.seek(i64::MAX / 2);
        drain_until(&mut orch, |o, _| o.mode() == &AudioMode::LocalPlaylist);
        assert_eq!(orch.title(), "a.ogg");
    }

    #[test]
    fn scan_skips_non_audio_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.ogg"), b"x").unwrap();
        std::fs::write(dir.path().join("a.mp3"), b"x").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        let tracks = scan_local_tracks(dir.path());
        assert_eq!(tracks.len(), 2);
        assert!(tracks[0].ends_with("a.mp3"));
        assert!(tracks[1].ends_with("b.ogg"));
    }
}
