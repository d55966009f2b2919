//! Match engine: progress, decay, win/tie evaluation and round lifecycle.
//!
//! The engine is a plain state machine. Hosts feed it actions and the
//! current time; every mutation is followed in the same call by winner
//! evaluation and a push to the [`PresentationSink`].
//!
//! ```text
//!   Active --action--> Active --(someone at max)--> Ended
//!   Active --tick----> Active
//!   Ended  --reset---> Active   (auto after the restart delay, or manual)
//! ```

use log::{debug, info};
use mash_input::{GamepadIndex, InputSource};

use crate::config::GameConfig;
use crate::difficulty::{Difficulty, GameParams, ManualControls};
use crate::player::{MAX_PROGRESS, Player, PlayerId};
use crate::registry::{JoinRejected, PlayerRegistry};
use crate::schedule::{CancelToken, OneShotTask, RepeatingTask};
use crate::sink::PresentationSink;

/// Decay period.
pub const DEFAULT_DRAIN_INTERVAL_MS: u64 = 70;
/// Delay between a round result and the automatic restart.
pub const DEFAULT_AUTO_RESTART_DELAY_MS: u64 = 3_000;

const TIE_TEXT: &str = "It's a Tie!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchTiming {
    pub drain_interval_ms: u64,
    pub auto_restart_delay_ms: u64,
}

impl Default for MatchTiming {
    fn default() -> Self {
        Self {
            drain_interval_ms: DEFAULT_DRAIN_INTERVAL_MS,
            auto_restart_delay_ms: DEFAULT_AUTO_RESTART_DELAY_MS,
        }
    }
}

/// Outcome of a finished round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundResult {
    Winner(PlayerId),
    /// Two or more players reached the maximum in the same step.
    Tie(Vec<PlayerId>),
}

impl RoundResult {
    pub fn winner(&self) -> Option<PlayerId> {
        match self {
            RoundResult::Winner(id) => Some(*id),
            RoundResult::Tie(_) => None,
        }
    }

    pub fn style(&self) -> Option<String> {
        self.winner().map(PlayerId::win_style)
    }
}

/// Everything that changes while a match is played.
#[derive(Debug, Clone)]
pub struct MatchState {
    registry: PlayerRegistry,
    active: bool,
    params: GameParams,
    difficulty: Difficulty,
    manual: ManualControls,
    result: Option<RoundResult>,
}

impl MatchState {
    pub fn registry(&self) -> &PlayerRegistry {
        &self.registry
    }

    pub fn players(&self) -> &[Player] {
        self.registry.players()
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.registry.player(id)
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn params(&self) -> GameParams {
        self.params
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn manual(&self) -> ManualControls {
        self.manual
    }

    pub fn max_progress(&self) -> f64 {
        MAX_PROGRESS
    }

    /// Banner text for the current result.
    pub fn announcement(&self) -> Option<String> {
        self.result.as_ref().map(|result| match result {
            RoundResult::Winner(id) => {
                let name = self
                    .player(*id)
                    .map(|p| p.display_name.clone())
                    .unwrap_or_else(|| id.to_string());
                format!("{name} Wins!")
            }
            RoundResult::Tie(_) => TIE_TEXT.to_string(),
        })
    }
}

pub struct MatchEngine {
    state: MatchState,
    decay: RepeatingTask,
    decay_token: Option<CancelToken>,
    restart: OneShotTask,
    restart_token: Option<CancelToken>,
}

impl MatchEngine {
    /// Build an engine in the `Ended` state; call [`MatchEngine::start`] to
    /// begin the first round.
    pub fn new(
        registry: PlayerRegistry,
        difficulty: Difficulty,
        mut manual: ManualControls,
        timing: MatchTiming,
    ) -> Self {
        let params = difficulty.resolve(&mut manual);
        Self {
            state: MatchState {
                registry,
                active: false,
                params,
                difficulty,
                manual,
                result: None,
            },
            decay: RepeatingTask::new(timing.drain_interval_ms),
            decay_token: None,
            restart: OneShotTask::new(timing.auto_restart_delay_ms),
            restart_token: None,
        }
    }

    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(
            config.build_registry(),
            config.difficulty,
            config.manual,
            config.timing(),
        )
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        self.state.active
    }

    /// Begin the first round and push the full state to the sink.
    pub fn start(&mut self, now_ms: u64, sink: &mut dyn PresentationSink) {
        for player in self.state.registry.players() {
            sink.render_controller_label(player.id, &player.binding.label());
            sink.render_score(player.id, player.score);
        }
        self.reset(now_ms, sink);
    }

    /// Earliest time the engine needs [`MatchEngine::advance`] to be called.
    pub fn next_deadline_ms(&self) -> Option<u64> {
        match (self.decay.next_due_ms(), self.restart.due_ms()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn is_restart_pending(&self) -> bool {
        self.restart.is_pending()
    }

    /// Fire every scheduled task due at `now_ms`: decay ticks first, then
    /// the auto-restart.
    pub fn advance(&mut self, now_ms: u64, sink: &mut dyn PresentationSink) {
        for _ in 0..self.decay.take_due(now_ms) {
            self.tick(sink);
        }
        if self.restart.take_due(now_ms) {
            debug!("Auto-restart");
            self.reset(now_ms, sink);
        }
    }

    /// One decay step. No-op while the round is over.
    pub fn tick(&mut self, sink: &mut dyn PresentationSink) {
        if !self.state.active {
            return;
        }
        let drain = self.state.params.drain_rate;
        for player in self.state.registry.players_mut() {
            player.drain(drain);
        }
        self.render_progress(sink);
    }

    pub fn apply_action(
        &mut self,
        player: PlayerId,
        now_ms: u64,
        sink: &mut dyn PresentationSink,
    ) -> Option<RoundResult> {
        self.apply_actions(&[player], now_ms, sink)
    }

    /// Apply several actions as one step: all increments land before the
    /// single winner evaluation, so players crossing together tie.
    pub fn apply_actions(
        &mut self,
        players: &[PlayerId],
        now_ms: u64,
        sink: &mut dyn PresentationSink,
    ) -> Option<RoundResult> {
        if !self.state.active || players.is_empty() {
            return None;
        }
        let increment = self.state.params.increment;
        for &id in players {
            if let Some(player) = self.state.registry.player_mut(id) {
                player.add_progress(increment);
            }
        }
        self.render_progress(sink);
        self.evaluate(now_ms, sink)
    }

    fn evaluate(&mut self, now_ms: u64, sink: &mut dyn PresentationSink) -> Option<RoundResult> {
        let finished: Vec<PlayerId> = self
            .state
            .registry
            .players()
            .iter()
            .filter(|p| p.has_finished())
            .map(|p| p.id)
            .collect();

        let result = match finished.as_slice() {
            [] => return None,
            [single] => RoundResult::Winner(*single),
            _ => RoundResult::Tie(finished.clone()),
        };

        for id in &finished {
            if let Some(player) = self.state.registry.player_mut(*id) {
                player.set_progress(MAX_PROGRESS);
            }
        }
        if let RoundResult::Winner(id) = result {
            if let Some(player) = self.state.registry.player_mut(id) {
                player.score += 1;
            }
        }

        self.state.active = false;
        if let Some(token) = self.decay_token.take() {
            self.decay.cancel_token(token);
        }
        self.state.result = Some(result.clone());

        let text = self.state.announcement();
        info!("Round over: {}", text.as_deref().unwrap_or_default());
        sink.render_winner(text.as_deref(), result.style().as_deref());
        self.render_scores(sink);
        self.render_progress(sink);

        self.restart_token = Some(self.restart.arm(now_ms));
        Some(result)
    }

    /// Start a new round now, cancelling a pending auto-restart.
    pub fn reset(&mut self, now_ms: u64, sink: &mut dyn PresentationSink) {
        if let Some(token) = self.restart_token.take() {
            self.restart.cancel_token(token);
        }
        self.resolve_params(sink);
        for player in self.state.registry.players_mut() {
            player.reset_round();
        }
        self.state.active = true;
        self.state.result = None;
        sink.render_winner(None, None);
        self.render_progress(sink);
        self.decay_token = Some(self.decay.arm(now_ms));
    }

    pub fn reset_scores(&mut self, sink: &mut dyn PresentationSink) {
        self.state.registry.reset_scores();
        self.render_scores(sink);
    }

    /// Switch difficulty; the new parameters apply immediately.
    pub fn set_difficulty(&mut self, difficulty: Difficulty, sink: &mut dyn PresentationSink) {
        self.state.difficulty = difficulty;
        self.resolve_params(sink);
        info!(
            "Difficulty {difficulty}: increment {}, drain {}",
            self.state.params.increment, self.state.params.drain_rate
        );
    }

    pub fn set_manual_increment(&mut self, value: u8, sink: &mut dyn PresentationSink) {
        self.state.manual.set_increment(value);
        self.manual_changed(sink);
    }

    pub fn set_manual_drain_slider(&mut self, value: u8, sink: &mut dyn PresentationSink) {
        self.state.manual.set_drain_slider(value);
        self.manual_changed(sink);
    }

    fn manual_changed(&mut self, sink: &mut dyn PresentationSink) {
        if self.state.difficulty == Difficulty::Manual {
            self.resolve_params(sink);
        } else {
            sink.render_manual_controls(&self.state.manual);
        }
    }

    fn resolve_params(&mut self, sink: &mut dyn PresentationSink) {
        self.state.params = self.state.difficulty.resolve(&mut self.state.manual);
        sink.render_manual_controls(&self.state.manual);
    }

    /// Join a new player on `source`.
    pub fn join(
        &mut self,
        source: InputSource,
        sink: &mut dyn PresentationSink,
    ) -> Result<PlayerId, JoinRejected> {
        let id = self.state.registry.join(source)?;
        self.render_player(id, sink);
        Ok(id)
    }

    /// Bind a pad to a claimable player or join a new one.
    pub fn claim_gamepad(
        &mut self,
        index: GamepadIndex,
        sink: &mut dyn PresentationSink,
    ) -> Result<PlayerId, JoinRejected> {
        let id = self.state.registry.claim_gamepad(index)?;
        self.render_player(id, sink);
        Ok(id)
    }

    /// Apply the disconnect policy to the pad's player, if any.
    pub fn release_gamepad(
        &mut self,
        index: GamepadIndex,
        sink: &mut dyn PresentationSink,
    ) -> Option<PlayerId> {
        let id = self.state.registry.unbind_gamepad(index)?;
        if let Some(player) = self.state.registry.player(id) {
            sink.render_controller_label(id, &player.binding.label());
        }
        Some(id)
    }

    pub(crate) fn last_key_action(&self, id: PlayerId) -> Option<u64> {
        self.state.player(id).and_then(|p| p.last_action_ms)
    }

    pub(crate) fn mark_key_action(&mut self, id: PlayerId, now_ms: u64) {
        if let Some(player) = self.state.registry.player_mut(id) {
            player.last_action_ms = Some(now_ms);
        }
    }

    fn render_player(&self, id: PlayerId, sink: &mut dyn PresentationSink) {
        if let Some(player) = self.state.registry.player(id) {
            sink.render_controller_label(id, &player.binding.label());
            sink.render_score(id, player.score);
            sink.render_progress(id, player.percent());
        }
    }

    fn render_progress(&self, sink: &mut dyn PresentationSink) {
        for player in self.state.registry.players() {
            sink.render_progress(player.id, player.percent());
        }
    }

    fn render_scores(&self, sink: &mut dyn PresentationSink) {
        for player in self.state.registry.players() {
            sink.render_score(player.id, player.score);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{DisconnectPolicy, SeatSlot};
    use crate::sink::{NullSink, RecordingSink};

    fn pair_engine(difficulty: Difficulty) -> MatchEngine {
        let mut slots = SeatSlot::default_pool();
        slots.truncate(2);
        let registry = PlayerRegistry::seeded(slots, DisconnectPolicy::RevertToKeyboard);
        let mut engine = MatchEngine::new(
            registry,
            difficulty,
            ManualControls::default(),
            MatchTiming::default(),
        );
        engine.start(0, &mut NullSink);
        engine
    }

    fn progress(engine: &MatchEngine, id: u8) -> f64 {
        engine.state().player(PlayerId(id)).unwrap().progress()
    }

    #[test]
    fn test_new_engine_waits_for_start() {
        let mut slots = SeatSlot::default_pool();
        slots.truncate(2);
        let engine = MatchEngine::new(
            PlayerRegistry::seeded(slots, DisconnectPolicy::RevertToKeyboard),
            Difficulty::Medium,
            ManualControls::default(),
            MatchTiming::default(),
        );
        assert!(!engine.is_active());
        assert_eq!(engine.next_deadline_ms(), None);
    }

    #[test]
    fn test_action_adds_increment() {
        let mut engine = pair_engine(Difficulty::Medium);
        assert_eq!(engine.apply_action(PlayerId(1), 10, &mut NullSink), None);
        assert_eq!(progress(&engine, 1), 6.0);
        assert_eq!(progress(&engine, 2), 0.0);
    }

    #[test]
    fn test_action_for_unknown_player_is_ignored() {
        let mut engine = pair_engine(Difficulty::Medium);
        assert_eq!(engine.apply_action(PlayerId(4), 10, &mut NullSink), None);
        assert!(engine.is_active());
    }

    #[test]
    fn test_win_ends_round_and_scores() {
        let mut engine = pair_engine(Difficulty::Easy);
        let mut sink = RecordingSink::new();
        for i in 0..9 {
            assert_eq!(engine.apply_action(PlayerId(1), i, &mut sink), None);
        }
        let result = engine.apply_action(PlayerId(1), 9, &mut sink);
        assert_eq!(result, Some(RoundResult::Winner(PlayerId(1))));
        assert!(!engine.is_active());
        assert_eq!(engine.state().player(PlayerId(1)).unwrap().score, 1);
        assert_eq!(
            sink.last_winner(),
            Some((Some("Player 1 Wins!"), Some("player1-win")))
        );
        assert_eq!(sink.last_score(PlayerId(1)), Some(1));
        assert!(engine.is_restart_pending());
    }

    #[test]
    fn test_actions_and_ticks_ignored_after_win() {
        let mut engine = pair_engine(Difficulty::Easy);
        for _ in 0..10 {
            engine.apply_action(PlayerId(1), 0, &mut NullSink);
        }
        engine.apply_action(PlayerId(2), 0, &mut NullSink);
        engine.tick(&mut NullSink);
        assert_eq!(progress(&engine, 1), 100.0);
        assert_eq!(progress(&engine, 2), 0.0);
    }

    #[test]
    fn test_batch_crossing_is_tie() {
        let mut engine = pair_engine(Difficulty::Easy);
        for _ in 0..9 {
            engine.apply_actions(&[PlayerId(1), PlayerId(2)], 0, &mut NullSink);
        }
        let mut sink = RecordingSink::new();
        let result = engine.apply_actions(&[PlayerId(1), PlayerId(2)], 0, &mut sink);
        assert_eq!(
            result,
            Some(RoundResult::Tie(vec![PlayerId(1), PlayerId(2)]))
        );
        assert_eq!(sink.last_winner(), Some((Some("It's a Tie!"), None)));
        for player in engine.state().players() {
            assert_eq!(player.score, 0);
            assert_eq!(player.progress(), MAX_PROGRESS);
        }
    }

    #[test]
    fn test_tick_drains_idle_meters() {
        let mut engine = pair_engine(Difficulty::Medium);
        engine.apply_action(PlayerId(1), 0, &mut NullSink);
        engine.tick(&mut NullSink);
        assert!((progress(&engine, 1) - 5.4).abs() < 1e-9);
        assert_eq!(progress(&engine, 2), 0.0);
    }

    #[test]
    fn test_advance_fires_ticks_on_schedule() {
        let mut engine = pair_engine(Difficulty::Medium);
        engine.apply_action(PlayerId(1), 0, &mut NullSink);
        engine.advance(69, &mut NullSink);
        assert_eq!(progress(&engine, 1), 6.0);
        engine.advance(140, &mut NullSink);
        assert!((progress(&engine, 1) - 4.8).abs() < 1e-9);
    }

    #[test]
    fn test_auto_restart_after_delay() {
        let mut engine = pair_engine(Difficulty::Easy);
        for _ in 0..10 {
            engine.apply_action(PlayerId(2), 1_000, &mut NullSink);
        }
        assert!(!engine.is_active());
        assert_eq!(engine.next_deadline_ms(), Some(4_000));

        engine.advance(3_999, &mut NullSink);
        assert!(!engine.is_active());

        let mut sink = RecordingSink::new();
        engine.advance(4_000, &mut sink);
        assert!(engine.is_active());
        assert_eq!(progress(&engine, 2), 0.0);
        assert_eq!(engine.state().player(PlayerId(2)).unwrap().score, 1);
        assert_eq!(sink.last_winner(), Some((None, None)));
        assert_eq!(engine.next_deadline_ms(), Some(4_070));
    }

    #[test]
    fn test_manual_reset_cancels_auto_restart() {
        let mut engine = pair_engine(Difficulty::Easy);
        for _ in 0..10 {
            engine.apply_action(PlayerId(1), 0, &mut NullSink);
        }
        engine.reset(500, &mut NullSink);
        assert!(!engine.is_restart_pending());

        // Progress made after the manual reset survives the old deadline.
        engine.apply_action(PlayerId(1), 600, &mut NullSink);
        engine.advance(3_000, &mut NullSink);
        assert!(engine.is_active());
        assert!(progress(&engine, 1) > 0.0);
    }

    #[test]
    fn test_difficulty_change_applies_immediately() {
        let mut engine = pair_engine(Difficulty::Medium);
        let mut sink = RecordingSink::new();
        engine.set_difficulty(Difficulty::Hard, &mut sink);
        assert_eq!(engine.state().params().increment, 4.0);
        assert!(sink.calls.contains(&crate::sink::RenderCall::ManualControls(
            ManualControls::new(4, 10)
        )));
        engine.apply_action(PlayerId(1), 0, &mut NullSink);
        assert_eq!(progress(&engine, 1), 4.0);
    }

    #[test]
    fn test_manual_sliders_only_apply_in_manual_mode() {
        let mut engine = pair_engine(Difficulty::Medium);
        engine.set_manual_increment(15, &mut NullSink);
        assert_eq!(engine.state().params().increment, 6.0);
        assert_eq!(engine.state().manual().increment, 15);

        engine.set_difficulty(Difficulty::Manual, &mut NullSink);
        assert_eq!(engine.state().params().increment, 15.0);

        engine.set_manual_drain_slider(20, &mut NullSink);
        assert!((engine.state().params().drain_rate - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_reset_scores() {
        let mut engine = pair_engine(Difficulty::Easy);
        for _ in 0..10 {
            engine.apply_action(PlayerId(1), 0, &mut NullSink);
        }
        let mut sink = RecordingSink::new();
        engine.reset_scores(&mut sink);
        assert_eq!(engine.state().player(PlayerId(1)).unwrap().score, 0);
        assert_eq!(sink.last_score(PlayerId(1)), Some(0));
    }

    #[test]
    fn test_start_renders_labels() {
        let mut slots = SeatSlot::default_pool();
        slots.truncate(2);
        let mut engine = MatchEngine::new(
            PlayerRegistry::seeded(slots, DisconnectPolicy::RevertToKeyboard),
            Difficulty::Medium,
            ManualControls::default(),
            MatchTiming::default(),
        );
        let mut sink = RecordingSink::new();
        engine.start(0, &mut sink);
        assert_eq!(sink.last_label(PlayerId(1)), Some("Keyboard: W"));
        assert_eq!(sink.last_label(PlayerId(2)), Some("Keyboard: ArrowUp"));
        assert_eq!(sink.last_progress(PlayerId(1)), Some(0.0));
    }
}
