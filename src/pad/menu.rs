//! # Menu Trigger Module
//!
//! Detects the popup-menu input and coordinates the pause/resume handshake
//! with the hosting frontend.
//!
//! ## Trigger Conditions
//!
//! - A Home or End key-down event observed during event draining, or
//! - Esc and Enter simultaneously held in the frame's key snapshot.
//!
//! Either arms a one-shot request flag, consumed once after arbitration.
//!
//! ## Handshake Sequence
//!
//! The handshake is strict and runs synchronously on the frame thread:
//! storage flush, pause, menu display mode, the blocking menu call, then
//! resume and the game display mode. On return Start and Cross are forced
//! pressed for exactly one committed frame so the game swallows the menu's
//! own confirmation prompt. A trigger arriving while the handshake is
//! already running is dropped.

use evdev::Key;
use tracing::warn;

use super::keymap::KeySnapshot;
use super::state::{LogicalButton, PadButtons};

/// Frontend hooks invoked around the popup menu.
///
/// All calls are synchronous; `run_menu` blocks until the user closes the
/// menu. No data flows back into the pad engine beyond control returning.
pub trait MenuHandler {
    /// Flush pending persistent-storage writes before pausing.
    fn flush_storage(&mut self);
    /// Signal the core that emulation is pausing.
    fn pause(&mut self);
    /// Restore the neutral display mode used by the menu.
    fn enter_menu_display(&mut self);
    /// Hand control to the menu until the user closes it.
    fn run_menu(&mut self);
    /// Signal the core that emulation is resuming.
    fn resume(&mut self);
    /// Restore the gameplay display mode.
    fn enter_game_display(&mut self);
}

/// Popup-menu trigger and handshake coordinator.
#[derive(Debug, Default)]
pub struct MenuTrigger {
    requested: bool,
    active: bool,
}

impl MenuTrigger {
    /// Creates an idle trigger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Observes a key-down event from the drain; Home and End request the
    /// menu directly.
    pub fn observe_key_down(&mut self, key: Key) {
        if key == Key::KEY_HOME || key == Key::KEY_END {
            self.requested = true;
        }
    }

    /// Observes the frame's held-key snapshot for the two-key combination.
    pub fn observe_held(&mut self, keys: &KeySnapshot) {
        if keys.is_held(Key::KEY_ESC) && keys.is_held(Key::KEY_ENTER) {
            self.requested = true;
        }
    }

    /// Consumes the one-shot request flag.
    #[must_use]
    pub fn take_request(&mut self) -> bool {
        std::mem::take(&mut self.requested)
    }

    /// Runs the full pause/menu/resume handshake.
    ///
    /// Returns the one-shot pressed mask (Start + Cross) to apply to the
    /// next committed frame, or `None` if a handshake was already running.
    pub fn run_handshake(&mut self, handler: &mut dyn MenuHandler) -> Option<PadButtons> {
        if self.active {
            warn!("popup menu requested while one is already open, ignoring");
            return None;
        }
        self.active = true;

        handler.flush_storage();
        handler.pause();
        handler.enter_menu_display();
        handler.run_menu();

        let mut mask = PadButtons::default();
        mask.press(LogicalButton::Start);
        mask.press(LogicalButton::Cross);

        handler.resume();
        handler.enter_game_display();

        self.active = false;
        Some(mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records handler invocations in call order.
    #[derive(Default)]
    struct RecordingHandler {
        calls: Vec<&'static str>,
    }

    impl MenuHandler for RecordingHandler {
        fn flush_storage(&mut self) {
            self.calls.push("flush_storage");
        }
        fn pause(&mut self) {
            self.calls.push("pause");
        }
        fn enter_menu_display(&mut self) {
            self.calls.push("enter_menu_display");
        }
        fn run_menu(&mut self) {
            self.calls.push("run_menu");
        }
        fn resume(&mut self) {
            self.calls.push("resume");
        }
        fn enter_game_display(&mut self) {
            self.calls.push("enter_game_display");
        }
    }

    // ==================== Trigger Detection Tests ====================

    #[test]
    fn test_dedicated_keys_request_menu() {
        for key in [Key::KEY_HOME, Key::KEY_END] {
            let mut trigger = MenuTrigger::new();
            trigger.observe_key_down(key);
            assert!(trigger.take_request(), "{:?} should request the menu", key);
        }
    }

    #[test]
    fn test_other_keys_do_not_request_menu() {
        let mut trigger = MenuTrigger::new();
        trigger.observe_key_down(Key::KEY_ENTER);
        trigger.observe_key_down(Key::KEY_ESC);
        assert!(!trigger.take_request());
    }

    #[test]
    fn test_held_combination_requests_menu() {
        let mut trigger = MenuTrigger::new();
        trigger.observe_held(&KeySnapshot::from_keys(&[Key::KEY_ESC, Key::KEY_ENTER]));
        assert!(trigger.take_request());
    }

    #[test]
    fn test_half_combination_is_ignored() {
        let mut trigger = MenuTrigger::new();
        trigger.observe_held(&KeySnapshot::from_keys(&[Key::KEY_ESC]));
        trigger.observe_held(&KeySnapshot::from_keys(&[Key::KEY_ENTER]));
        assert!(!trigger.take_request());
    }

    #[test]
    fn test_request_flag_is_one_shot() {
        let mut trigger = MenuTrigger::new();
        trigger.observe_key_down(Key::KEY_HOME);
        assert!(trigger.take_request());
        assert!(!trigger.take_request());
    }

    // ==================== Handshake Tests ====================

    #[test]
    fn test_handshake_call_order() {
        let mut trigger = MenuTrigger::new();
        let mut handler = RecordingHandler::default();

        let mask = trigger.run_handshake(&mut handler);
        assert!(mask.is_some());
        assert_eq!(
            handler.calls,
            vec![
                "flush_storage",
                "pause",
                "enter_menu_display",
                "run_menu",
                "resume",
                "enter_game_display",
            ]
        );
    }

    #[test]
    fn test_handshake_mask_presses_start_and_cross() {
        let mut trigger = MenuTrigger::new();
        let mut handler = RecordingHandler::default();

        let mask = trigger.run_handshake(&mut handler).unwrap();
        assert!(mask.is_pressed(LogicalButton::Start));
        assert!(mask.is_pressed(LogicalButton::Cross));
        assert!(!mask.is_pressed(LogicalButton::Select));
    }

    #[test]
    fn test_nested_handshake_is_rejected() {
        let mut trigger = MenuTrigger::new();
        trigger.active = true; // a handshake is in flight

        let mut handler = RecordingHandler::default();
        assert!(trigger.run_handshake(&mut handler).is_none());
        assert!(handler.calls.is_empty(), "no hook may run while nested");
    }

    #[test]
    fn test_handshake_reusable_after_completion() {
        let mut trigger = MenuTrigger::new();
        let mut handler = RecordingHandler::default();
        assert!(trigger.run_handshake(&mut handler).is_some());
        assert!(trigger.run_handshake(&mut handler).is_some());
    }
}
