//! Turns raw keyboard and gamepad input into engine actions and joins.

use log::debug;
use mash_input::{
    GamepadIndex, GamepadTracker, InputSource, KeyId, PadConnection, PadSnapshot, PressCooldown,
};

use crate::config::GameConfig;
use crate::engine::{MatchEngine, RoundResult};
use crate::player::PlayerId;
use crate::sink::PresentationSink;

/// What a key-down event turned into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Counted as an action for the player.
    Action(PlayerId),
    /// The action ended the round.
    RoundOver(RoundResult),
    /// Bound key pressed again inside the cooldown window.
    Debounced(PlayerId),
    /// Bound key pressed while the round is over.
    Inactive(PlayerId),
    /// Unbound key that reclaimed an unbound player or joined a new one.
    Joined(PlayerId),
    /// Unbound key whose join was refused.
    Ignored,
}

/// Summary of one gamepad poll.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PadFrameOutcome {
    pub joined: Vec<PlayerId>,
    /// Actions in the order they were applied (one per rising button).
    pub actions: Vec<PlayerId>,
    pub result: Option<RoundResult>,
}

pub struct InputArbiter {
    cooldown: PressCooldown,
    pads: GamepadTracker,
}

impl InputArbiter {
    pub fn new(cooldown: PressCooldown) -> Self {
        Self {
            cooldown,
            pads: GamepadTracker::new(),
        }
    }

    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(config.cooldown())
    }

    /// Handle a key-down event. Key repeats are expected and absorbed by the
    /// cooldown.
    pub fn on_key_down(
        &mut self,
        engine: &mut MatchEngine,
        key: &KeyId,
        now_ms: u64,
        sink: &mut dyn PresentationSink,
    ) -> KeyOutcome {
        let Some(id) = engine.state().registry().player_for_key(key) else {
            return match engine.join(InputSource::Keyboard(key.clone()), sink) {
                Ok(id) => KeyOutcome::Joined(id),
                Err(e) => {
                    debug!("Key {key} not joined: {e}");
                    KeyOutcome::Ignored
                }
            };
        };

        if !engine.is_active() {
            return KeyOutcome::Inactive(id);
        }
        if !self.cooldown.permits(engine.last_key_action(id), now_ms) {
            return KeyOutcome::Debounced(id);
        }
        engine.mark_key_action(id, now_ms);
        match engine.apply_action(id, now_ms, sink) {
            Some(result) => KeyOutcome::RoundOver(result),
            None => KeyOutcome::Action(id),
        }
    }

    /// Handle one poll of every connected pad.
    ///
    /// Unbound pads join on any rising face button; bound pads produce one
    /// action per rising face button. All actions of the poll are applied as
    /// a single step.
    pub fn on_gamepad_frame(
        &mut self,
        engine: &mut MatchEngine,
        frame: &[PadSnapshot],
        now_ms: u64,
        sink: &mut dyn PresentationSink,
    ) -> PadFrameOutcome {
        let mut outcome = PadFrameOutcome::default();
        for edges in self.pads.observe(frame) {
            match engine.state().registry().player_for_pad(edges.index) {
                Some(id) => {
                    for _ in 0..edges.rising.count() {
                        outcome.actions.push(id);
                    }
                }
                None => match engine.claim_gamepad(edges.index, sink) {
                    Ok(id) => outcome.joined.push(id),
                    Err(e) => debug!("{} not joined: {e}", edges.index),
                },
            }
        }
        outcome.result = engine.apply_actions(&outcome.actions, now_ms, sink);
        outcome
    }

    pub fn on_gamepad_connected(&mut self, index: GamepadIndex) {
        debug!("{index} connected, waiting for a button to join");
        self.pads.forget(index);
    }

    /// Release the pad's player per the disconnect policy and forget the
    /// pad's button history.
    pub fn on_gamepad_disconnected(
        &mut self,
        engine: &mut MatchEngine,
        index: GamepadIndex,
        sink: &mut dyn PresentationSink,
    ) -> Option<PlayerId> {
        self.pads.forget(index);
        engine.release_gamepad(index, sink)
    }

    pub fn on_connection(
        &mut self,
        engine: &mut MatchEngine,
        connection: PadConnection,
        sink: &mut dyn PresentationSink,
    ) {
        match connection {
            PadConnection::Connected(index) => self.on_gamepad_connected(index),
            PadConnection::Disconnected(index) => {
                self.on_gamepad_disconnected(engine, index, sink);
            }
        }
    }
}

impl Default for InputArbiter {
    fn default() -> Self {
        Self::new(PressCooldown::default())
    }
}
