//! # Keyboard Button Map Module
//!
//! Static mapping from physical evdev key codes to [`LogicalButton`]s, and
//! the per-frame scan that applies the held-key snapshot to a working pad
//! image.
//!
//! ## Bindings
//!
//! | Key         | Button   | Key          | Button |
//! |-------------|----------|--------------|--------|
//! | Arrow keys  | D-Pad    | Tab          | L1     |
//! | Left Shift  | Square   | Backspace    | R1     |
//! | Left Ctrl   | Circle   | Page Up      | L2     |
//! | Space       | Triangle | Page Down    | R2     |
//! | Left Alt    | Cross    | Keypad /     | L3     |
//! | Esc         | Select   | Keypad .     | R3     |
//! | Enter       | Start    |              |        |
//!
//! Keys outside the table are ignored by the scan.

use evdev::{AttributeSet, Key};

use super::state::{LogicalButton, PadButtons, BUTTON_COUNT};

/// Physical key bindings, one entry per logical button.
pub const KEY_BINDINGS: [(Key, LogicalButton); BUTTON_COUNT] = [
    (Key::KEY_UP, LogicalButton::Up),
    (Key::KEY_DOWN, LogicalButton::Down),
    (Key::KEY_LEFT, LogicalButton::Left),
    (Key::KEY_RIGHT, LogicalButton::Right),
    (Key::KEY_LEFTSHIFT, LogicalButton::Square),
    (Key::KEY_LEFTCTRL, LogicalButton::Circle),
    (Key::KEY_SPACE, LogicalButton::Triangle),
    (Key::KEY_LEFTALT, LogicalButton::Cross),
    (Key::KEY_TAB, LogicalButton::L1),
    (Key::KEY_BACKSPACE, LogicalButton::R1),
    (Key::KEY_PAGEUP, LogicalButton::L2),
    (Key::KEY_PAGEDOWN, LogicalButton::R2),
    (Key::KEY_KPSLASH, LogicalButton::L3),
    (Key::KEY_KPDOT, LogicalButton::R3),
    (Key::KEY_ESC, LogicalButton::Select),
    (Key::KEY_ENTER, LogicalButton::Start),
];

/// Snapshot of the keys held on the keyboard at a frame boundary.
///
/// Captured once per frame from the keyboard device's key state and consumed
/// by the scan and the arbitration pass.
#[derive(Debug, Default)]
pub struct KeySnapshot {
    held: AttributeSet<Key>,
}

impl KeySnapshot {
    /// Wraps a raw evdev key state set.
    #[must_use]
    pub fn new(held: AttributeSet<Key>) -> Self {
        Self { held }
    }

    /// Builds a snapshot from a list of held keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use evdev::Key;
    /// use pad_bridge::pad::keymap::KeySnapshot;
    ///
    /// let snap = KeySnapshot::from_keys(&[Key::KEY_ENTER]);
    /// assert!(snap.is_held(Key::KEY_ENTER));
    /// assert!(!snap.is_held(Key::KEY_ESC));
    /// ```
    #[must_use]
    pub fn from_keys(keys: &[Key]) -> Self {
        let mut held = AttributeSet::new();
        for &key in keys {
            held.insert(key);
        }
        Self { held }
    }

    /// Returns whether a key is held in this snapshot.
    #[must_use]
    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(key)
    }
}

/// Applies the held-key snapshot to the working pad image.
///
/// For every binding the corresponding bit is set pressed when the key is
/// held and released otherwise, so stale presses from previous frames never
/// survive a scan. Pure with respect to everything but `working`.
pub fn scan_keyboard(working: &mut PadButtons, keys: &KeySnapshot) {
    for (key, button) in KEY_BINDINGS {
        working.set_pressed(button, keys.is_held(key));
    }
}
