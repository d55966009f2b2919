use std::fmt;

use serde::{Deserialize, Serialize};

/// Keyboard key identifier using browser-style key names (`"w"`, `"ArrowUp"`).
///
/// Single-character keys are stored lowercase so `W` and `w` are the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct KeyId(String);

impl KeyId {
    pub fn new(name: impl AsRef<str>) -> Self {
        let name = name.as_ref();
        let mut chars = name.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self(c.to_lowercase().collect()),
            _ => Self(name.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Human-facing label, e.g. `W` or `ArrowUp`.
    pub fn label(&self) -> String {
        let mut chars = self.0.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => c.to_uppercase().collect(),
            _ => self.0.clone(),
        }
    }
}

impl From<String> for KeyId {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<&str> for KeyId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<KeyId> for String {
    fn from(key: KeyId) -> Self {
        key.0
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Index of a connected gamepad as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GamepadIndex(pub usize);

impl fmt::Display for GamepadIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Gamepad {}", self.0 + 1)
    }
}

/// A concrete input that can be owned by at most one player.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InputSource {
    Keyboard(KeyId),
    Gamepad(GamepadIndex),
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputSource::Keyboard(key) => write!(f, "key {key}"),
            InputSource::Gamepad(index) => write!(f, "{index}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_char_keys_are_case_insensitive() {
        assert_eq!(KeyId::new("W"), KeyId::new("w"));
        assert_eq!(KeyId::new("W").as_str(), "w");
    }

    #[test]
    fn test_named_keys_keep_case() {
        let key = KeyId::new("ArrowUp");
        assert_eq!(key.as_str(), "ArrowUp");
        assert_ne!(key, KeyId::new("arrowup"));
    }

    #[test]
    fn test_key_label() {
        assert_eq!(KeyId::new("w").label(), "W");
        assert_eq!(KeyId::new("ArrowUp").label(), "ArrowUp");
    }

    #[test]
    fn test_key_deserialize_normalizes() {
        let key: KeyId = serde_json::from_str("\"I\"").unwrap();
        assert_eq!(key, KeyId::new("i"));
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"i\"");
    }

    #[test]
    fn test_gamepad_display_is_one_based() {
        assert_eq!(GamepadIndex(0).to_string(), "Gamepad 1");
        assert_eq!(
            InputSource::Gamepad(GamepadIndex(2)).to_string(),
            "Gamepad 3"
        );
    }
}
