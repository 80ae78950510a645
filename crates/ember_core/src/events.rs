//! Input signals
//!
//! The engine consumes a handful of logical signals. Binding them to physical
//! keys is the hosting shell's business; [`KeyBindings`] is the default table
//! the bundled player uses.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// A logical control input
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    /// Advance the image and geometry tracks
    AdvanceVisual,
    /// Advance the text track by one line
    AdvanceText,
    /// Move to the next scene of a sequence
    NextScene,
    /// Move to the previous scene of a sequence
    PreviousScene,
}

impl Signal {
    /// Parse a signal from its short script name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "visual" | "v" => Some(Signal::AdvanceVisual),
            "text" | "t" => Some(Signal::AdvanceText),
            "next" | "n" => Some(Signal::NextScene),
            "previous" | "prev" | "p" => Some(Signal::PreviousScene),
            _ => None,
        }
    }
}

/// Virtual key codes (platform-agnostic)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct KeyCode(pub u32);

impl KeyCode {
    pub const ENTER: KeyCode = KeyCode(0x0D);
    pub const SPACE: KeyCode = KeyCode(0x20);
    pub const LEFT: KeyCode = KeyCode(0x25);
    pub const RIGHT: KeyCode = KeyCode(0x27);
    pub const N: KeyCode = KeyCode(0x4E);
    pub const P: KeyCode = KeyCode(0x50);

    /// Look up a key by the name used in player configuration files
    pub fn from_name(name: &str) -> Option<Self> {
        let key = match name.to_ascii_lowercase().as_str() {
            "enter" | "return" => Self::ENTER,
            "space" => Self::SPACE,
            "left" => Self::LEFT,
            "right" => Self::RIGHT,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if c.is_ascii_alphanumeric() => {
                        KeyCode(c.to_ascii_uppercase() as u32)
                    }
                    _ => return None,
                }
            }
        };
        Some(key)
    }
}

/// Key → signal table
#[derive(Clone, Debug)]
pub struct KeyBindings {
    map: FxHashMap<KeyCode, Signal>,
}

impl KeyBindings {
    pub fn empty() -> Self {
        Self {
            map: FxHashMap::default(),
        }
    }

    pub fn bind(&mut self, key: KeyCode, signal: Signal) {
        self.map.insert(key, signal);
    }

    pub fn resolve(&self, key: KeyCode) -> Option<Signal> {
        self.map.get(&key).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl Default for KeyBindings {
    /// Enter advances visuals, Space advances text, N/P and the arrow keys
    /// move through a sequence.
    fn default() -> Self {
        let mut bindings = Self::empty();
        bindings.bind(KeyCode::ENTER, Signal::AdvanceVisual);
        bindings.bind(KeyCode::SPACE, Signal::AdvanceText);
        bindings.bind(KeyCode::N, Signal::NextScene);
        bindings.bind(KeyCode::RIGHT, Signal::NextScene);
        bindings.bind(KeyCode::P, Signal::PreviousScene);
        bindings.bind(KeyCode::LEFT, Signal::PreviousScene);
        bindings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bindings() {
        let bindings = KeyBindings::default();
        assert_eq!(bindings.resolve(KeyCode::ENTER), Some(Signal::AdvanceVisual));
        assert_eq!(bindings.resolve(KeyCode::SPACE), Some(Signal::AdvanceText));
        assert_eq!(bindings.resolve(KeyCode::N), Some(Signal::NextScene));
        assert_eq!(bindings.resolve(KeyCode(0x41)), None);
    }

    #[test]
    fn test_key_names() {
        assert_eq!(KeyCode::from_name("Enter"), Some(KeyCode::ENTER));
        assert_eq!(KeyCode::from_name("n"), Some(KeyCode::N));
        assert_eq!(KeyCode::from_name("F13"), None);
    }

    #[test]
    fn test_signal_names() {
        assert_eq!(Signal::from_name("v"), Some(Signal::AdvanceVisual));
        assert_eq!(Signal::from_name("text"), Some(Signal::AdvanceText));
        assert_eq!(Signal::from_name("jump"), None);
    }
}
