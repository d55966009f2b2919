// winit logical keys -> player keys and host commands.

use mash_input::KeyId;
use mash_play::Difficulty;
use winit::keyboard::{Key, NamedKey};

/// Keys the host handles itself instead of passing to the arbiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCommand {
    SelectDifficulty(Difficulty),
    /// Step the manual increment slider by +1 or -1.
    NudgeIncrement(i8),
    /// Step the manual drain slider by +1 or -1.
    NudgeDrain(i8),
    ResetRound,
    ResetScores,
    ToggleTheme,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyInput {
    Host(HostCommand),
    Player(KeyId),
}

/// Classify a pressed key. Named keys keep their winit name (`ArrowUp`,
/// `Space`), which matches the names used in the slot pool.
pub fn classify(key: &Key) -> Option<KeyInput> {
    match key {
        Key::Named(named) => Some(match named {
            NamedKey::F1 => KeyInput::Host(HostCommand::SelectDifficulty(Difficulty::Easy)),
            NamedKey::F2 => KeyInput::Host(HostCommand::SelectDifficulty(Difficulty::Medium)),
            NamedKey::F3 => KeyInput::Host(HostCommand::SelectDifficulty(Difficulty::Hard)),
            NamedKey::F4 => KeyInput::Host(HostCommand::SelectDifficulty(Difficulty::Manual)),
            NamedKey::F5 => KeyInput::Host(HostCommand::ResetRound),
            NamedKey::F6 => KeyInput::Host(HostCommand::ResetScores),
            NamedKey::F8 => KeyInput::Host(HostCommand::ToggleTheme),
            NamedKey::Escape => KeyInput::Host(HostCommand::Quit),
            other => KeyInput::Player(KeyId::new(format!("{other:?}"))),
        }),
        Key::Character(text) => Some(match text.as_str() {
            "-" => KeyInput::Host(HostCommand::NudgeIncrement(-1)),
            "=" => KeyInput::Host(HostCommand::NudgeIncrement(1)),
            "[" => KeyInput::Host(HostCommand::NudgeDrain(-1)),
            "]" => KeyInput::Host(HostCommand::NudgeDrain(1)),
            other => KeyInput::Player(KeyId::new(other)),
        }),
        _ => None,
    }
}
