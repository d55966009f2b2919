use anyhow::{Context, Result};
use mash_input::PressCooldown;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::difficulty::{Difficulty, ManualControls};
use crate::engine::{DEFAULT_AUTO_RESTART_DELAY_MS, DEFAULT_DRAIN_INTERVAL_MS, MatchTiming};
use crate::registry::{DisconnectPolicy, PlayerRegistry, SeatSlot};

/// Config file used when no path is given.
pub const CONFIG_FILE: &str = "mash-race.json";

/// Roster shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RosterVariant {
    /// Two players seated from the start on W and ArrowUp.
    #[default]
    FixedPair,
    /// Up to four players joining by key or gamepad.
    OpenFour,
}

impl RosterVariant {
    pub fn seat_count(self) -> usize {
        match self {
            RosterVariant::FixedPair => 2,
            RosterVariant::OpenFour => 4,
        }
    }

    pub fn default_policy(self) -> DisconnectPolicy {
        match self {
            RosterVariant::FixedPair => DisconnectPolicy::RevertToKeyboard,
            RosterVariant::OpenFour => DisconnectPolicy::Unbind,
        }
    }
}

/// Color theme preference; opaque to the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    pub variant: RosterVariant,
    /// Overrides the variant's disconnect policy when set.
    pub disconnect_policy: Option<DisconnectPolicy>,
    pub difficulty: Difficulty,
    pub manual: ManualControls,
    pub press_cooldown_ms: u64,
    pub drain_interval_ms: u64,
    pub auto_restart_delay_ms: u64,
    /// Slot pool in join order; only the first `seat_count` are used.
    pub slots: Vec<SeatSlot>,
    pub theme: Theme,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            variant: RosterVariant::default(),
            disconnect_policy: None,
            difficulty: Difficulty::default(),
            manual: ManualControls::default(),
            press_cooldown_ms: mash_input::DEFAULT_PRESS_COOLDOWN_MS,
            drain_interval_ms: DEFAULT_DRAIN_INTERVAL_MS,
            auto_restart_delay_ms: DEFAULT_AUTO_RESTART_DELAY_MS,
            slots: SeatSlot::default_pool(),
            theme: Theme::default(),
        }
    }
}

impl GameConfig {
    /// Loads config from a specified path.
    /// Returns default config if file doesn't exist.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Saves config to a specified path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }

    pub fn effective_policy(&self) -> DisconnectPolicy {
        self.disconnect_policy
            .unwrap_or_else(|| self.variant.default_policy())
    }

    /// Slots actually seated by the variant.
    pub fn active_slots(&self) -> Vec<SeatSlot> {
        self.slots
            .iter()
            .take(self.variant.seat_count())
            .cloned()
            .collect()
    }

    pub fn build_registry(&self) -> PlayerRegistry {
        let slots = self.active_slots();
        match self.variant {
            RosterVariant::FixedPair => PlayerRegistry::seeded(slots, self.effective_policy()),
            RosterVariant::OpenFour => PlayerRegistry::new(slots, self.effective_policy()),
        }
    }

    pub fn timing(&self) -> MatchTiming {
        MatchTiming {
            drain_interval_ms: self.drain_interval_ms,
            auto_restart_delay_ms: self.auto_restart_delay_ms,
        }
    }

    pub fn cooldown(&self) -> PressCooldown {
        PressCooldown::new(self.press_cooldown_ms)
    }
}
