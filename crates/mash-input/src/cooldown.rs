/// Minimum gap between two accepted key presses from the same player.
pub const DEFAULT_PRESS_COOLDOWN_MS: u64 = 100;

/// Debounce window for discrete key-down events.
///
/// Keyboards auto-repeat a held key; the cooldown turns that stream into a
/// bounded press rate. Timestamps are milliseconds from an arbitrary epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PressCooldown {
    window_ms: u64,
}

impl PressCooldown {
    pub fn new(window_ms: u64) -> Self {
        Self { window_ms }
    }

    /// Whether a press at `now_ms` is accepted given the last accepted press.
    ///
    /// The gap must be strictly greater than the window. A player with no
    /// accepted press yet is always accepted.
    pub fn permits(&self, last_ms: Option<u64>, now_ms: u64) -> bool {
        last_ms.is_none_or(|last| now_ms.saturating_sub(last) > self.window_ms)
    }
}

impl Default for PressCooldown {
    fn default() -> Self {
        Self::new(DEFAULT_PRESS_COOLDOWN_MS)
    }
}
