//! Input handling for keyboard and gamepad players.
//!
//! This crate provides:
//! - [`KeyId`], [`GamepadIndex`], [`InputSource`]: the concrete inputs a player can own
//! - [`PressCooldown`]: debounce window for key-down events (absorbs auto-repeat)
//! - [`GamepadTracker`]: per-pad rising-edge detection across polls
//! - [`GamepadSource`]: polled gamepad backend, with [`GilrsSource`] for real hardware
//! - [`Clock`]: millisecond clock, with [`ManualClock`] for tests

mod clock;
mod cooldown;
mod gamepad;
mod pad_state;
mod source;

pub use clock::{Clock, ManualClock, SystemClock};
pub use cooldown::{DEFAULT_PRESS_COOLDOWN_MS, PressCooldown};
pub use gamepad::{GamepadSource, GilrsSource, PadConnection, ScriptedPads};
pub use pad_state::{ButtonBits, FACE_BUTTON_COUNT, GamepadTracker, PadEdges, PadSnapshot};
pub use source::{GamepadIndex, InputSource, KeyId};
