mod engine;
mod presets;

pub use engine::{Phase, TimerEngine};
pub use presets::{default_presets, presets_from_pairs, PresetKind, TimerPreset};
