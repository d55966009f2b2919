use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lowest and highest value of either manual slider.
pub const SLIDER_MIN: u8 = 1;
pub const SLIDER_MAX: u8 = 20;

/// Difficulty selection. `Manual` hands the tunables to the sliders.
///
/// Config files may hold any name; unknown names load as `Medium`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
    Manual,
}

impl Difficulty {
    /// Returns all difficulties in panel order.
    pub fn all() -> &'static [Difficulty] {
        &[
            Difficulty::Easy,
            Difficulty::Medium,
            Difficulty::Hard,
            Difficulty::Manual,
        ]
    }

    pub fn name(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Manual => "manual",
        }
    }

    /// Parse a difficulty name, treating anything unrecognized as `Medium`.
    pub fn from_name_lenient(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            log::warn!("Unknown difficulty {name:?}, using medium");
            Difficulty::Medium
        })
    }

    /// Preset table entry, or `None` for `Manual`.
    pub fn preset(self) -> Option<Preset> {
        match self {
            Difficulty::Easy => Some(Preset {
                increment: 10,
                drain_slider: 3,
            }),
            Difficulty::Medium => Some(Preset {
                increment: 6,
                drain_slider: 6,
            }),
            Difficulty::Hard => Some(Preset {
                increment: 4,
                drain_slider: 10,
            }),
            Difficulty::Manual => None,
        }
    }

    /// Resolve the active tunables.
    ///
    /// For a preset, `manual` is overwritten with the preset values so that
    /// switching to `Manual` later starts from the last preset.
    pub fn resolve(self, manual: &mut ManualControls) -> GameParams {
        if let Some(preset) = self.preset() {
            *manual = ManualControls::new(preset.increment, preset.drain_slider);
        }
        manual.params()
    }
}

impl From<String> for Difficulty {
    fn from(name: String) -> Self {
        Self::from_name_lenient(&name)
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown difficulty: {0}")]
pub struct UnknownDifficulty(pub String);

impl FromStr for Difficulty {
    type Err = UnknownDifficulty;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::all()
            .iter()
            .copied()
            .find(|d| d.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownDifficulty(s.to_string()))
    }
}

/// Preset values expressed in slider units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    pub increment: u8,
    /// Drain rate times ten.
    pub drain_slider: u8,
}

/// The two tunables that govern a round.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GameParams {
    /// Progress added per accepted action.
    pub increment: f64,
    /// Progress removed per decay tick.
    pub drain_rate: f64,
}

impl Default for GameParams {
    fn default() -> Self {
        Difficulty::Medium.resolve(&mut ManualControls::default())
    }
}

/// Manual tuning sliders, both in 1..=20.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawManualControls")]
pub struct ManualControls {
    pub increment: u8,
    pub drain_slider: u8,
}

/// Slider values as written in a config file, before clamping.
#[derive(Deserialize)]
#[serde(default)]
struct RawManualControls {
    increment: u8,
    drain_slider: u8,
}

impl Default for RawManualControls {
    fn default() -> Self {
        let manual = ManualControls::default();
        Self {
            increment: manual.increment,
            drain_slider: manual.drain_slider,
        }
    }
}

impl From<RawManualControls> for ManualControls {
    fn from(raw: RawManualControls) -> Self {
        Self::new(raw.increment, raw.drain_slider)
    }
}

impl ManualControls {
    pub fn new(increment: u8, drain_slider: u8) -> Self {
        Self {
            increment: clamp_slider(increment),
            drain_slider: clamp_slider(drain_slider),
        }
    }

    pub fn set_increment(&mut self, value: u8) {
        self.increment = clamp_slider(value);
    }

    pub fn set_drain_slider(&mut self, value: u8) {
        self.drain_slider = clamp_slider(value);
    }

    pub fn drain_rate(&self) -> f64 {
        f64::from(clamp_slider(self.drain_slider)) / 10.0
    }

    /// Drain rate as the panel shows it, e.g. `0.6`.
    pub fn drain_rate_label(&self) -> String {
        format!("{:.1}", self.drain_rate())
    }

    pub fn params(&self) -> GameParams {
        GameParams {
            increment: f64::from(clamp_slider(self.increment)),
            drain_rate: self.drain_rate(),
        }
    }
}

impl Default for ManualControls {
    fn default() -> Self {
        Self::new(6, 6)
    }
}

fn clamp_slider(value: u8) -> u8 {
    value.clamp(SLIDER_MIN, SLIDER_MAX)
}
