//! Host-side match session: owns the engine and feeds it keys, pads and time.

use std::path::PathBuf;

use log::{debug, info, warn};
use mash_input::{Clock, GamepadSource};
use mash_play::{GameConfig, InputArbiter, MatchEngine, Theme};

use crate::keys::{HostCommand, KeyInput};
use crate::title::TitleSink;

/// How often connected pads are polled.
pub const PAD_POLL_MS: u64 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Session<P, C> {
    engine: MatchEngine,
    arbiter: InputArbiter,
    sink: TitleSink,
    pads: Option<P>,
    clock: C,
    config: GameConfig,
    config_path: PathBuf,
}

impl<P: GamepadSource, C: Clock> Session<P, C> {
    /// Build the session and start the first round.
    pub fn new(config: GameConfig, config_path: PathBuf, pads: Option<P>, clock: C) -> Self {
        if pads.is_none() {
            info!("No gamepad backend, keyboard only");
        }
        let mut session = Self {
            engine: MatchEngine::from_config(&config),
            arbiter: InputArbiter::from_config(&config),
            sink: TitleSink::new(),
            pads,
            clock,
            config,
            config_path,
        };
        let now = session.clock.now_ms();
        session.engine.start(now, &mut session.sink);
        session
    }

    pub fn engine(&self) -> &MatchEngine {
        &self.engine
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn pads_mut(&mut self) -> Option<&mut P> {
        self.pads.as_mut()
    }

    pub fn theme(&self) -> Theme {
        self.config.theme
    }

    pub fn title(&self) -> String {
        self.sink.title(self.engine.state())
    }

    /// Whether the title needs redrawing.
    pub fn take_dirty(&mut self) -> bool {
        self.sink.take_dirty()
    }

    /// Handle a key press. Host commands ignore auto-repeat.
    pub fn key_down(&mut self, input: KeyInput, repeat: bool) -> Flow {
        match input {
            KeyInput::Player(key) => {
                let now = self.clock.now_ms();
                let outcome = self
                    .arbiter
                    .on_key_down(&mut self.engine, &key, now, &mut self.sink);
                debug!("Key {key}: {outcome:?}");
                Flow::Continue
            }
            KeyInput::Host(_) if repeat => Flow::Continue,
            KeyInput::Host(command) => self.command(command),
        }
    }

    pub fn command(&mut self, command: HostCommand) -> Flow {
        let now = self.clock.now_ms();
        let manual = self.engine.state().manual();
        match command {
            HostCommand::SelectDifficulty(difficulty) => {
                self.engine.set_difficulty(difficulty, &mut self.sink);
            }
            HostCommand::NudgeIncrement(step) => {
                let value = manual.increment.saturating_add_signed(step);
                self.engine.set_manual_increment(value, &mut self.sink);
            }
            HostCommand::NudgeDrain(step) => {
                let value = manual.drain_slider.saturating_add_signed(step);
                self.engine.set_manual_drain_slider(value, &mut self.sink);
            }
            HostCommand::ResetRound => self.engine.reset(now, &mut self.sink),
            HostCommand::ResetScores => self.engine.reset_scores(&mut self.sink),
            HostCommand::ToggleTheme => {
                self.config.theme = self.config.theme.toggled();
                info!("Theme {:?}", self.config.theme);
                self.save();
            }
            HostCommand::Quit => {
                self.save();
                return Flow::Quit;
            }
        }
        Flow::Continue
    }

    /// Fire due timers, then process pad hot-plug and one pad poll.
    pub fn pump(&mut self) {
        let now = self.clock.now_ms();
        self.engine.advance(now, &mut self.sink);
        if let Some(pads) = self.pads.as_mut() {
            for connection in pads.connection_events() {
                self.arbiter
                    .on_connection(&mut self.engine, connection, &mut self.sink);
            }
            let frame = pads.poll_connected();
            self.arbiter
                .on_gamepad_frame(&mut self.engine, &frame, now, &mut self.sink);
        }
    }

    /// Next time `pump` has work to do, in clock milliseconds.
    pub fn next_wakeup_ms(&self) -> Option<u64> {
        let poll = self
            .pads
            .as_ref()
            .map(|_| self.clock.now_ms() + PAD_POLL_MS);
        match (self.engine.next_deadline_ms(), poll) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Write the current difficulty, sliders and theme back to the config file.
    pub fn save(&mut self) {
        let state = self.engine.state();
        self.config.difficulty = state.difficulty();
        self.config.manual = state.manual();
        match self.config.save_to(&self.config_path) {
            Ok(()) => debug!("Saved {}", self.config_path.display()),
            Err(e) => warn!("Failed to save config: {e:#}"),
        }
    }
}
