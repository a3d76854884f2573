//! Input state seam
//!
//! The windowing layer is external. It reports key state through
//! [`InputState`]; scripts query it by key code.

use parking_lot::RwLock;
use std::collections::HashSet;

/// Key codes
///
/// Values follow the GLFW layout so platform layers can pass raw codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum KeyCode {
    /// Space bar
    Space = 32,
    /// A key
    A = 65,
    /// D key
    D = 68,
    /// E key
    E = 69,
    /// Q key
    Q = 81,
    /// S key
    S = 83,
    /// W key
    W = 87,
    /// Escape key
    Escape = 256,
    /// Enter key
    Enter = 257,
    /// Right arrow
    Right = 262,
    /// Left arrow
    Left = 263,
    /// Down arrow
    Down = 264,
    /// Up arrow
    Up = 265,
    /// Left shift
    LeftShift = 340,
    /// Left control
    LeftControl = 341,
}

impl KeyCode {
    /// Every named key
    pub const ALL: [Self; 15] = [
        Self::Space,
        Self::A,
        Self::D,
        Self::E,
        Self::Q,
        Self::S,
        Self::W,
        Self::Escape,
        Self::Enter,
        Self::Right,
        Self::Left,
        Self::Down,
        Self::Up,
        Self::LeftShift,
        Self::LeftControl,
    ];

    /// Raw code
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Constant name in the script `key` module, e.g. `key::W`
    pub const fn script_name(self) -> &'static str {
        match self {
            Self::Space => "SPACE",
            Self::A => "A",
            Self::D => "D",
            Self::E => "E",
            Self::Q => "Q",
            Self::S => "S",
            Self::W => "W",
            Self::Escape => "ESCAPE",
            Self::Enter => "ENTER",
            Self::Right => "RIGHT",
            Self::Left => "LEFT",
            Self::Down => "DOWN",
            Self::Up => "UP",
            Self::LeftShift => "LEFT_SHIFT",
            Self::LeftControl => "LEFT_CONTROL",
        }
    }
}

/// Key state queries answered by the platform layer
pub trait InputState: Send + Sync {
    /// Whether the key with this raw code is held
    fn is_key_down(&self, key_code: i32) -> bool;
}

/// Input state fed by explicit press/release events
///
/// Used by headless runs and tests in place of a window.
#[derive(Debug, Default)]
pub struct KeyboardState {
    pressed: RwLock<HashSet<i32>>,
}

impl KeyboardState {
    /// No keys held
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a press or release
    pub fn set_key(&self, key: KeyCode, pressed: bool) {
        let mut keys = self.pressed.write();
        if pressed {
            keys.insert(key.code());
        } else {
            keys.remove(&key.code());
        }
    }

    /// Release every key
    pub fn clear(&self) {
        self.pressed.write().clear();
    }
}

impl InputState for KeyboardState {
    fn is_key_down(&self, key_code: i32) -> bool {
        self.pressed.read().contains(&key_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_and_release() {
        let keyboard = KeyboardState::new();
        keyboard.set_key(KeyCode::W, true);
        assert!(keyboard.is_key_down(87));
        keyboard.set_key(KeyCode::W, false);
        assert!(!keyboard.is_key_down(KeyCode::W.code()));
    }

    #[test]
    fn test_script_names_unique() {
        let names: HashSet<_> = KeyCode::ALL.iter().map(|key| key.script_name()).collect();
        assert_eq!(names.len(), KeyCode::ALL.len());
    }
}
