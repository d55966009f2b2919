use mash_input::{ButtonBits, GamepadIndex, KeyId, PadConnection, PadSnapshot};
use mash_play::{
    ControllerBinding, Difficulty, GameConfig, InputArbiter, KeyOutcome, ManualControls,
    MatchEngine, NullSink, PlayerId, RecordingSink, RenderCall, RosterVariant, RoundResult,
};
use proptest::prelude::*;

fn start(config: &GameConfig) -> (MatchEngine, InputArbiter) {
    let mut engine = MatchEngine::from_config(config);
    engine.start(0, &mut NullSink);
    (engine, InputArbiter::from_config(config))
}

fn config(variant: RosterVariant, difficulty: Difficulty) -> GameConfig {
    GameConfig {
        variant,
        difficulty,
        ..GameConfig::default()
    }
}

fn pad(index: usize, bits: u8) -> PadSnapshot {
    PadSnapshot::new(GamepadIndex(index), ButtonBits::from_bits(bits))
}

fn progress(engine: &MatchEngine, id: u8) -> f64 {
    engine.state().player(PlayerId(id)).unwrap().progress()
}

fn score(engine: &MatchEngine, id: u8) -> u32 {
    engine.state().player(PlayerId(id)).unwrap().score
}

#[test]
fn test_seventeen_presses_win_at_medium() {
    let (mut engine, mut arbiter) = start(&config(RosterVariant::FixedPair, Difficulty::Medium));
    let w = KeyId::new("w");
    let mut sink = RecordingSink::new();
    let mut outcome = KeyOutcome::Ignored;
    for press in 0..17u64 {
        outcome = arbiter.on_key_down(&mut engine, &w, press * 101, &mut sink);
    }

    assert_eq!(outcome, KeyOutcome::RoundOver(RoundResult::Winner(PlayerId(1))));
    assert_eq!(progress(&engine, 1), 100.0);
    assert_eq!(score(&engine, 1), 1);
    assert_eq!(score(&engine, 2), 0);
    assert_eq!(sink.last_progress(PlayerId(1)), Some(100.0));
    assert_eq!(
        sink.last_winner(),
        Some((Some("Player 1 Wins!"), Some("player1-win")))
    );
}

#[test]
fn test_simultaneous_crossing_is_a_tie() {
    let (mut engine, mut arbiter) = start(&config(RosterVariant::OpenFour, Difficulty::Easy));
    arbiter.on_gamepad_frame(&mut engine, &[pad(0, 1), pad(1, 1)], 0, &mut NullSink);

    let mut result = None;
    for step in 0..10u64 {
        let now = 10 + step * 20;
        arbiter.on_gamepad_frame(&mut engine, &[pad(0, 0), pad(1, 0)], now, &mut NullSink);
        let frame =
            arbiter.on_gamepad_frame(&mut engine, &[pad(0, 1), pad(1, 1)], now + 10, &mut NullSink);
        result = frame.result;
    }

    assert_eq!(result, Some(RoundResult::Tie(vec![PlayerId(1), PlayerId(2)])));
    assert_eq!(score(&engine, 1), 0);
    assert_eq!(score(&engine, 2), 0);
    assert_eq!(
        engine.state().announcement().as_deref(),
        Some("It's a Tie!")
    );
}

#[test]
fn test_decay_floors_at_zero() {
    let mut config = config(RosterVariant::FixedPair, Difficulty::Manual);
    config.manual = ManualControls::new(1, 6);
    let (mut engine, _) = start(&config);

    engine.apply_action(PlayerId(1), 0, &mut NullSink);
    assert_eq!(progress(&engine, 1), 1.0);
    engine.tick(&mut NullSink);
    assert!((progress(&engine, 1) - 0.4).abs() < 1e-9);
    engine.tick(&mut NullSink);
    assert_eq!(progress(&engine, 1), 0.0);
    engine.tick(&mut NullSink);
    assert_eq!(progress(&engine, 1), 0.0);
}

#[test]
fn test_key_cooldown_window() {
    let (mut engine, mut arbiter) = start(&config(RosterVariant::FixedPair, Difficulty::Medium));
    let up = KeyId::new("ArrowUp");

    assert_eq!(
        arbiter.on_key_down(&mut engine, &up, 1_000, &mut NullSink),
        KeyOutcome::Action(PlayerId(2))
    );
    assert_eq!(
        arbiter.on_key_down(&mut engine, &up, 1_050, &mut NullSink),
        KeyOutcome::Debounced(PlayerId(2))
    );
    assert_eq!(
        arbiter.on_key_down(&mut engine, &up, 1_150, &mut NullSink),
        KeyOutcome::Action(PlayerId(2))
    );
    assert_eq!(progress(&engine, 2), 12.0);
}

#[test]
fn test_held_button_acts_once() {
    let (mut engine, mut arbiter) = start(&config(RosterVariant::FixedPair, Difficulty::Medium));
    // Claims Player 1 away from the keyboard.
    arbiter.on_gamepad_frame(&mut engine, &[pad(0, 1)], 0, &mut NullSink);
    arbiter.on_gamepad_frame(&mut engine, &[pad(0, 0)], 10, &mut NullSink);

    let mut actions = 0;
    for poll in 0..5u64 {
        let frame = arbiter.on_gamepad_frame(&mut engine, &[pad(0, 1)], 20 + poll, &mut NullSink);
        actions += frame.actions.len();
    }
    assert_eq!(actions, 1);
    assert_eq!(progress(&engine, 1), 6.0);
}

#[test]
fn test_pads_claim_distinct_slots() {
    let (mut engine, mut arbiter) = start(&config(RosterVariant::OpenFour, Difficulty::Medium));

    let first = arbiter.on_gamepad_frame(&mut engine, &[pad(2, 1)], 0, &mut NullSink);
    assert_eq!(first.joined, vec![PlayerId(1)]);
    let second = arbiter.on_gamepad_frame(&mut engine, &[pad(2, 1), pad(5, 1)], 10, &mut NullSink);
    assert_eq!(second.joined, vec![PlayerId(2)]);

    let registry = engine.state().registry();
    assert_eq!(registry.player_for_pad(GamepadIndex(2)), Some(PlayerId(1)));
    assert_eq!(registry.player_for_pad(GamepadIndex(5)), Some(PlayerId(2)));
}

#[test]
fn test_fixed_pair_gamepad_rebinds_and_reverts() {
    let (mut engine, mut arbiter) = start(&config(RosterVariant::FixedPair, Difficulty::Medium));
    let mut sink = RecordingSink::new();

    arbiter.on_gamepad_frame(&mut engine, &[pad(0, 1)], 0, &mut sink);
    assert_eq!(sink.last_label(PlayerId(1)), Some("Gamepad 1"));
    // W is released while the pad owns Player 1.
    assert_eq!(
        arbiter.on_key_down(&mut engine, &KeyId::new("w"), 10, &mut sink),
        KeyOutcome::Ignored
    );

    arbiter.on_connection(
        &mut engine,
        PadConnection::Disconnected(GamepadIndex(0)),
        &mut sink,
    );
    assert_eq!(sink.last_label(PlayerId(1)), Some("Keyboard: W"));
    assert_eq!(
        engine.state().player(PlayerId(1)).unwrap().binding,
        ControllerBinding::Keyboard(KeyId::new("w"))
    );
}

#[test]
fn test_open_four_disconnect_unbinds() {
    let (mut engine, mut arbiter) = start(&config(RosterVariant::OpenFour, Difficulty::Medium));
    let mut sink = RecordingSink::new();
    arbiter.on_gamepad_frame(&mut engine, &[pad(0, 1)], 0, &mut sink);
    arbiter.on_gamepad_disconnected(&mut engine, GamepadIndex(0), &mut sink);

    assert_eq!(
        sink.last_label(PlayerId(1)),
        Some("Press a key or button to join")
    );
    assert_eq!(engine.state().registry().len(), 1);
}

#[test]
fn test_round_restarts_after_delay() {
    let (mut engine, mut arbiter) = start(&config(RosterVariant::FixedPair, Difficulty::Easy));
    let w = KeyId::new("w");
    for press in 0..10u64 {
        arbiter.on_key_down(&mut engine, &w, press * 101, &mut NullSink);
    }
    assert!(!engine.is_active());
    let ended_at = 9 * 101;

    assert_eq!(
        arbiter.on_key_down(&mut engine, &w, ended_at + 500, &mut NullSink),
        KeyOutcome::Inactive(PlayerId(1))
    );
    engine.advance(ended_at + 2_999, &mut NullSink);
    assert!(!engine.is_active());

    let mut sink = RecordingSink::new();
    engine.advance(ended_at + 3_000, &mut sink);
    assert!(engine.is_active());
    assert_eq!(progress(&engine, 1), 0.0);
    assert_eq!(score(&engine, 1), 1);
    assert_eq!(sink.last_winner(), Some((None, None)));
}

#[test]
fn test_reset_restores_fresh_round() {
    let (mut engine, mut arbiter) = start(&config(RosterVariant::FixedPair, Difficulty::Medium));
    arbiter.on_key_down(&mut engine, &KeyId::new("w"), 0, &mut NullSink);
    arbiter.on_key_down(&mut engine, &KeyId::new("ArrowUp"), 0, &mut NullSink);

    engine.reset(50, &mut NullSink);
    for player in engine.state().players() {
        assert_eq!(player.progress(), 0.0);
    }
    assert!(engine.is_active());
    assert_eq!(engine.next_deadline_ms(), Some(120));
}

#[test]
fn test_long_stall_drains_at_most_four_ticks() {
    let (mut engine, _) = start(&config(RosterVariant::FixedPair, Difficulty::Medium));
    for _ in 0..5 {
        engine.apply_action(PlayerId(1), 0, &mut NullSink);
    }
    engine.advance(60_000, &mut NullSink);
    assert!((progress(&engine, 1) - (30.0 - 4.0 * 0.6)).abs() < 1e-9);
}

#[derive(Debug, Clone)]
enum Step {
    Key(bool, u64),
    Pads(u8, u8, u64),
    Wait(u64),
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        (any::<bool>(), 0u64..200).prop_map(|(second, dt)| Step::Key(second, dt)),
        (0u8..16, 0u8..16, 0u64..50).prop_map(|(a, b, dt)| Step::Pads(a, b, dt)),
        (0u64..5_000).prop_map(Step::Wait),
    ]
}

fn replay(steps: &[Step]) -> (MatchEngine, RecordingSink) {
    let (mut engine, mut arbiter) = start(&config(RosterVariant::OpenFour, Difficulty::Hard));
    let mut sink = RecordingSink::new();
    let keys = [KeyId::new("w"), KeyId::new("l")];
    let mut now = 0;
    for step in steps {
        match step {
            Step::Key(second, dt) => {
                now += dt;
                engine.advance(now, &mut sink);
                let key = &keys[usize::from(*second)];
                arbiter.on_key_down(&mut engine, key, now, &mut sink);
            }
            Step::Pads(a, b, dt) => {
                now += dt;
                engine.advance(now, &mut sink);
                arbiter.on_gamepad_frame(&mut engine, &[pad(0, *a), pad(1, *b)], now, &mut sink);
            }
            Step::Wait(dt) => {
                now += dt;
                engine.advance(now, &mut sink);
            }
        }
    }
    (engine, sink)
}

proptest! {
    #[test]
    fn prop_progress_stays_in_bounds(steps in prop::collection::vec(step(), 0..120)) {
        let (engine, sink) = replay(&steps);
        for call in &sink.calls {
            if let RenderCall::Progress(_, percent) = call {
                prop_assert!((0.0..=100.0).contains(percent), "reported {}", percent);
            }
        }
        for player in engine.state().players() {
            prop_assert!(player.progress() >= 0.0);
            prop_assert!(player.progress() <= engine.state().max_progress());
        }
        prop_assert!(engine.state().registry().len() <= 4);
    }

    #[test]
    fn prop_replay_is_deterministic(steps in prop::collection::vec(step(), 0..80)) {
        let (first, first_sink) = replay(&steps);
        let (second, second_sink) = replay(&steps);
        prop_assert_eq!(first_sink.calls, second_sink.calls);
        let scores = |e: &MatchEngine| e.state().players().iter().map(|p| p.score).collect::<Vec<_>>();
        prop_assert_eq!(scores(&first), scores(&second));
    }
}
