use std::collections::VecDeque;

use gilrs::{Button, Event, EventType, Gilrs};
use log::{debug, warn};

use crate::pad_state::{ButtonBits, FACE_BUTTON_COUNT, PadSnapshot};
use crate::source::GamepadIndex;

/// Face buttons in standard gamepad order: A, B, X, Y.
const FACE_BUTTONS: [Button; FACE_BUTTON_COUNT] =
    [Button::South, Button::East, Button::West, Button::North];

/// Pad hot-plug notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadConnection {
    Connected(GamepadIndex),
    Disconnected(GamepadIndex),
}

/// Polled gamepad backend.
///
/// Implementations: [`GilrsSource`] (hardware), [`ScriptedPads`] (testing).
/// Call [`GamepadSource::connection_events`] once per frame before
/// [`GamepadSource::poll_connected`]; backends update their button state
/// while draining events.
pub trait GamepadSource {
    /// Connection changes since the last call.
    fn connection_events(&mut self) -> Vec<PadConnection>;

    /// Current face-button state of every connected pad.
    fn poll_connected(&self) -> Vec<PadSnapshot>;
}

/// Gamepad backend using gilrs.
pub struct GilrsSource {
    gilrs: Gilrs,
}

impl GilrsSource {
    /// Returns `None` when the platform has no gamepad support; callers fall
    /// back to keyboard-only play.
    pub fn new() -> Option<Self> {
        match Gilrs::new() {
            Ok(gilrs) => Some(Self { gilrs }),
            Err(e) => {
                warn!("Failed to initialize gamepad support: {}", e);
                None
            }
        }
    }
}

impl GamepadSource for GilrsSource {
    fn connection_events(&mut self) -> Vec<PadConnection> {
        let mut changes = Vec::new();
        while let Some(Event { id, event, .. }) = self.gilrs.next_event() {
            let index = GamepadIndex(usize::from(id));
            match event {
                EventType::Connected => {
                    debug!("Gamepad connected: {:?}", id);
                    changes.push(PadConnection::Connected(index));
                }
                EventType::Disconnected => {
                    debug!("Gamepad disconnected: {:?}", id);
                    changes.push(PadConnection::Disconnected(index));
                }
                _ => {}
            }
        }
        changes
    }

    fn poll_connected(&self) -> Vec<PadSnapshot> {
        self.gilrs
            .gamepads()
            .map(|(id, pad)| {
                let pressed = FACE_BUTTONS.map(|button| pad.is_pressed(button));
                PadSnapshot::new(
                    GamepadIndex(usize::from(id)),
                    ButtonBits::from_pressed(pressed),
                )
            })
            .collect()
    }
}

/// Deterministic gamepad source fed from a script of frames.
///
/// Each queued frame is returned by one `poll_connected` call after the
/// following `connection_events` call; an exhausted script repeats its last
/// frame so held buttons stay held.
#[derive(Debug, Default)]
pub struct ScriptedPads {
    connections: VecDeque<PadConnection>,
    frames: VecDeque<Vec<PadSnapshot>>,
    current: Vec<PadSnapshot>,
}

impl ScriptedPads {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_connection(&mut self, connection: PadConnection) {
        self.connections.push_back(connection);
    }

    pub fn push_frame(&mut self, frame: Vec<PadSnapshot>) {
        self.frames.push_back(frame);
    }
}

impl GamepadSource for ScriptedPads {
    fn connection_events(&mut self) -> Vec<PadConnection> {
        if let Some(frame) = self.frames.pop_front() {
            self.current = frame;
        }
        self.connections.drain(..).collect()
    }

    fn poll_connected(&self) -> Vec<PadSnapshot> {
        self.current.clone()
    }
}
