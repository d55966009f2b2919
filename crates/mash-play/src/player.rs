//! Player identity, binding and per-round state.

use std::fmt;

use mash_input::{GamepadIndex, InputSource, KeyId};
use serde::{Deserialize, Serialize};

/// Progress needed to win a round.
pub const MAX_PROGRESS: f64 = 100.0;

/// Hard upper bound on the roster size.
pub const MAX_PLAYERS: usize = 4;

/// Stable player slot, 1-based (`PlayerId(1)` is "Player 1").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u8);

impl PlayerId {
    pub const fn new(slot: u8) -> Self {
        Self(slot)
    }

    /// Zero-based index into the slot pool.
    pub const fn index(self) -> usize {
        (self.0 as usize).saturating_sub(1)
    }

    /// Style class used for this player's win announcement.
    pub fn win_style(self) -> String {
        format!("player{}-win", self.0)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Player {}", self.0)
    }
}

/// Which concrete input currently drives a player.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum ControllerBinding {
    #[default]
    Unbound,
    Keyboard(KeyId),
    Gamepad(GamepadIndex),
}

impl ControllerBinding {
    pub fn source(&self) -> Option<InputSource> {
        match self {
            ControllerBinding::Unbound => None,
            ControllerBinding::Keyboard(key) => Some(InputSource::Keyboard(key.clone())),
            ControllerBinding::Gamepad(index) => Some(InputSource::Gamepad(*index)),
        }
    }

    pub fn is_gamepad(&self) -> bool {
        matches!(self, ControllerBinding::Gamepad(_))
    }

    /// Text shown under the player's meter.
    pub fn label(&self) -> String {
        match self {
            ControllerBinding::Unbound => "Press a key or button to join".to_string(),
            ControllerBinding::Keyboard(key) => format!("Keyboard: {}", key.label()),
            ControllerBinding::Gamepad(index) => index.to_string(),
        }
    }
}

impl From<InputSource> for ControllerBinding {
    fn from(source: InputSource) -> Self {
        match source {
            InputSource::Keyboard(key) => ControllerBinding::Keyboard(key),
            InputSource::Gamepad(index) => ControllerBinding::Gamepad(index),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub id: PlayerId,
    pub display_name: String,
    progress: f64,
    pub score: u32,
    pub binding: ControllerBinding,
    /// Time of the last accepted keyboard action (ms).
    pub last_action_ms: Option<u64>,
}

impl Player {
    pub fn new(id: PlayerId, display_name: impl Into<String>, binding: ControllerBinding) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            progress: 0.0,
            score: 0,
            binding,
            last_action_ms: None,
        }
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// Progress as a share of [`MAX_PROGRESS`], in percent.
    pub fn percent(&self) -> f64 {
        self.progress / MAX_PROGRESS * 100.0
    }

    /// Set progress, clamped into `0..=MAX_PROGRESS`.
    pub fn set_progress(&mut self, value: f64) {
        self.progress = if value.is_nan() {
            0.0
        } else {
            value.clamp(0.0, MAX_PROGRESS)
        };
    }

    pub fn add_progress(&mut self, amount: f64) {
        self.set_progress(self.progress + amount);
    }

    /// Drain an idle meter; a meter already at zero stays there.
    pub fn drain(&mut self, amount: f64) {
        if self.progress > 0.0 {
            self.set_progress(self.progress - amount);
        }
    }

    pub fn has_finished(&self) -> bool {
        self.progress >= MAX_PROGRESS
    }

    /// Zero progress and cooldown for a new round; score is kept.
    pub fn reset_round(&mut self) {
        self.progress = 0.0;
        self.last_action_ms = None;
    }
}
