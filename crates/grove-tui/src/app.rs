//! The terminal event loop.
//!
//! Draw a frame, tick the session, translate key presses into logical
//! actions. The core never sees key codes, and this module never touches
//! session internals -- it submits `Action`s and renders `SessionSnapshot`s.
//! While a modal prompt is open the line is edited here and handed to the
//! core whole on Enter, so the tick/render loop keeps running through
//! text entry.

use std::io::Stdout;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{backend::CrosstermBackend, Terminal};

use grove_core::{clock, Action, SessionOrchestrator};

use crate::ui;

/// Frame cadence, roughly 15 Hz.
const TICK_INTERVAL: Duration = Duration::from_millis(66);

pub struct App {
    session: SessionOrchestrator,
    /// Line buffer for the modal prompt.
    input_buffer: String,
}

impl App {
    pub fn new(session: SessionOrchestrator) -> Self {
        Self {
            session,
            input_buffer: String::new(),
        }
    }

    /// Run until quit; returns the final age for persistence.
    pub fn run(
        mut self,
        terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    ) -> Result<f64, Box<dyn std::error::Error>> {
        loop {
            let now_ms = clock::now_ms();
            self.session.tick(now_ms);
            if self.session.should_quit() {
                return Ok(self.session.age());
            }

            let size = terminal.size()?;
            let snapshot = self.session.snapshot(now_ms, size.width, size.height);
            terminal.draw(|frame| ui::draw(frame, &snapshot, &self.input_buffer))?;

            if event::poll(TICK_INTERVAL)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key, clock::now_ms());
                    }
                }
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent, now_ms: u64) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.session.apply(Action::Quit, now_ms);
            return;
        }

        if self.session.input_prompt().is_some() {
            match key.code {
                KeyCode::Enter => {
                    let line = std::mem::take(&mut self.input_buffer);
                    self.session.apply(Action::SubmitInput(line), now_ms);
                }
                KeyCode::Esc => {
                    self.input_buffer.clear();
                    self.session.apply(Action::CancelInput, now_ms);
                }
                KeyCode::Backspace => {
                    self.input_buffer.pop();
                }
                KeyCode::Char(c) => self.input_buffer.push(c),
                _ => {}
            }
            return;
        }

        if let Some(action) = map_key(key.code) {
            self.session.apply(action, now_ms);
        }
    }
}

/// The classic bindings: arrows or hjkl navigate, space pauses, brackets
/// set volume, digits scrub.
fn map_key(code: KeyCode) -> Option<Action> {
    match code {
        KeyCode::Up | KeyCode::Char('k') => Some(Action::MenuUp),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::MenuDown),
        KeyCode::Left | KeyCode::Char('h') => Some(Action::MenuLeft),
        KeyCode::Right | KeyCode::Char('l') => Some(Action::MenuRight),
        KeyCode::Enter => Some(Action::Confirm),
        KeyCode::Char(' ') => Some(Action::TogglePause),
        KeyCode::Char('m') => Some(Action::ToggleMedia),
        KeyCode::Char('n') => Some(Action::StartRadio),
        KeyCode::Char(']') => Some(Action::VolumeUp),
        KeyCode::Char('[') => Some(Action::VolumeDown),
        KeyCode::Char('}') => Some(Action::EffectVolumeUp),
        KeyCode::Char('{') => Some(Action::EffectVolumeDown),
        KeyCode::Char('=') => Some(Action::SeekForward),
        KeyCode::Char('-') => Some(Action::SeekBackward),
        KeyCode::Char('r') => Some(Action::ToggleLoop),
        KeyCode::Char('u') => Some(Action::ToggleEffectMute),
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Char(c) if c.is_ascii_digit() => {
            Some(Action::SeekTenth(c.to_digit(10).unwrap_or(0) as u8))
        }
        _ => None,
    }
}
