//! Match logic for the button-mash race.
//!
//! This crate provides:
//! - [`MatchEngine`]: progress, decay, win/tie evaluation and auto-restart
//! - [`InputArbiter`]: key cooldown, gamepad edges and dynamic joins
//! - [`PlayerRegistry`]: roster slots and input ownership
//! - [`Difficulty`]: presets and manual parameters
//! - [`GameConfig`]: JSON-backed settings
//! - [`PresentationSink`]: where state goes after every step

pub mod arbiter;
pub mod config;
pub mod difficulty;
pub mod engine;
pub mod player;
pub mod registry;
pub mod schedule;
pub mod sink;

pub use arbiter::{InputArbiter, KeyOutcome, PadFrameOutcome};
pub use config::{GameConfig, RosterVariant, Theme};
pub use difficulty::{
    Difficulty, GameParams, ManualControls, Preset, SLIDER_MAX, SLIDER_MIN, UnknownDifficulty,
};
pub use engine::{
    DEFAULT_AUTO_RESTART_DELAY_MS, DEFAULT_DRAIN_INTERVAL_MS, MatchEngine, MatchState,
    MatchTiming, RoundResult,
};
pub use player::{ControllerBinding, MAX_PLAYERS, MAX_PROGRESS, Player, PlayerId};
pub use registry::{DisconnectPolicy, JoinRejected, PlayerRegistry, SeatSlot};
pub use schedule::{CancelToken, MAX_CATCH_UP_TICKS, OneShotTask, RepeatingTask};
pub use sink::{NullSink, PresentationSink, RecordingSink, RenderCall};
