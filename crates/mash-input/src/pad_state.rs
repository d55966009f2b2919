use std::collections::HashMap;

use crate::source::GamepadIndex;

/// Face buttons 0..4 (A/B/X/Y in standard gamepad order) drive the game.
pub const FACE_BUTTON_COUNT: usize = 4;

/// Pressed state of the face buttons, one bit per button.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ButtonBits(u8);

impl ButtonBits {
    const MASK: u8 = (1 << FACE_BUTTON_COUNT) - 1;

    pub const NONE: ButtonBits = ButtonBits(0);

    /// Build from raw bits; bits past the face buttons are discarded.
    pub fn from_bits(bits: u8) -> Self {
        Self(bits & Self::MASK)
    }

    pub fn from_pressed(pressed: [bool; FACE_BUTTON_COUNT]) -> Self {
        let bits = pressed
            .iter()
            .enumerate()
            .fold(0u8, |acc, (i, &down)| if down { acc | (1 << i) } else { acc });
        Self(bits)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of buttons set.
    pub fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// Buttons pressed now that were not pressed in `previous`.
    pub fn rising_since(self, previous: ButtonBits) -> ButtonBits {
        ButtonBits(self.0 & !previous.0)
    }
}

/// One pad's button vector as sampled in a single poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PadSnapshot {
    pub index: GamepadIndex,
    pub buttons: ButtonBits,
}

impl PadSnapshot {
    pub fn new(index: GamepadIndex, buttons: ButtonBits) -> Self {
        Self { index, buttons }
    }
}

/// Rising edges observed on one pad during one poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PadEdges {
    pub index: GamepadIndex,
    pub rising: ButtonBits,
}

/// Remembers the previous poll of every pad to detect rising edges.
#[derive(Debug, Default)]
pub struct GamepadTracker {
    previous: HashMap<GamepadIndex, ButtonBits>,
}

impl GamepadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare a poll against the previous one and store it as the new
    /// previous state. Only pads with at least one rising edge are returned,
    /// in poll order.
    pub fn observe(&mut self, frame: &[PadSnapshot]) -> Vec<PadEdges> {
        let mut edges = Vec::new();
        for snapshot in frame {
            let previous = self
                .previous
                .insert(snapshot.index, snapshot.buttons)
                .unwrap_or_default();
            let rising = snapshot.buttons.rising_since(previous);
            if !rising.is_empty() {
                edges.push(PadEdges {
                    index: snapshot.index,
                    rising,
                });
            }
        }
        edges
    }

    /// Drop the stored state of a disconnected pad.
    pub fn forget(&mut self, index: GamepadIndex) {
        self.previous.remove(&index);
    }
}
