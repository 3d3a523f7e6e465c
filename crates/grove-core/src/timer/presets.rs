//! Timer preset table.
//!
//! The menu's left-hand list: fixed work+break pairs, a custom entry that
//! opens the modal duration prompt, and an immediate end-timer entry
//! (modeled as a zero-length timer that rings on the next tick).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresetKind {
    /// Fixed work/break pair in minutes.
    Pomodoro { work_min: u64, break_min: u64 },
    /// Prompt the user for work and break lengths.
    Custom,
    /// Ring immediately and show the timer-over banner.
    EndNow,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerPreset {
    pub kind: PresetKind,
}

impl TimerPreset {
    pub fn pomodoro(work_min: u64, break_min: u64) -> Self {
        Self {
            kind: PresetKind::Pomodoro { work_min, break_min },
        }
    }

    pub fn label(&self) -> String {
        match self.kind {
            PresetKind::Pomodoro { work_min, break_min } => {
                format!("POMODORO {work_min}+{break_min}")
            }
            PresetKind::Custom => "CUSTOM TIMER".to_string(),
            PresetKind::EndNow => "END TIMER NOW".to_string(),
        }
    }

    /// Work/break durations in seconds, `None` for the custom prompt.
    pub fn durations_secs(&self) -> Option<(u64, u64)> {
        match self.kind {
            PresetKind::Pomodoro { work_min, break_min } => {
                Some((work_min * 60, break_min * 60))
            }
            PresetKind::EndNow => Some((0, 0)),
            PresetKind::Custom => None,
        }
    }
}

/// Build the menu list from configured pairs; the custom and end-now
/// entries always close the list.
pub fn presets_from_pairs(pairs: impl IntoIterator<Item = (u64, u64)>) -> Vec<TimerPreset> {
    let mut presets: Vec<TimerPreset> = pairs
        .into_iter()
        .map(|(work_min, break_min)| TimerPreset::pomodoro(work_min, break_min))
        .collect();
    presets.push(TimerPreset { kind: PresetKind::Custom });
    presets.push(TimerPreset { kind: PresetKind::EndNow });
    presets
}

/// The stock preset list when the config does not override it.
pub fn default_presets() -> Vec<TimerPreset> {
    presets_from_pairs([(20, 20), (20, 10), (40, 20), (50, 10)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stock_list_matches_menu_order() {
        let presets = default_presets();
        assert_eq!(presets.len(), 6);
        assert_eq!(presets[0].label(), "POMODORO 20+20");
        assert_eq!(presets[4].kind, PresetKind::Custom);
        assert_eq!(presets[5].kind, PresetKind::EndNow);
    }

    #[test]
    fn durations_convert_minutes_to_seconds() {
        assert_eq!(
            TimerPreset::pomodoro(25, 5).durations_secs(),
            Some((1500, 300))
        );
        assert_eq!(
            TimerPreset { kind: PresetKind::EndNow }.durations_secs(),
            Some((0, 0))
        );
        assert_eq!(TimerPreset { kind: PresetKind::Custom }.durations_secs(), None);
    }
}
