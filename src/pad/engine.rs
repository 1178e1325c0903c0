//! # Pad Engine Module
//!
//! Frame-level façade tying the keyboard scan, analog sampler, input
//! arbiter, menu trigger, and controller personality together behind the
//! interface the consumer reads each frame.
//!
//! ## Frame Protocol
//!
//! ```no_run
//! use pad_bridge::config::InputConfig;
//! use pad_bridge::pad::engine::PadEngine;
//! use pad_bridge::pad::keymap::KeySnapshot;
//! use pad_bridge::pad::menu::MenuHandler;
//! # struct Frontend;
//! # impl MenuHandler for Frontend {
//! #     fn flush_storage(&mut self) {}
//! #     fn pause(&mut self) {}
//! #     fn enter_menu_display(&mut self) {}
//! #     fn run_menu(&mut self) {}
//! #     fn resume(&mut self) {}
//! #     fn enter_game_display(&mut self) {}
//! # }
//!
//! let mut engine = PadEngine::new(&InputConfig::default());
//! let mut frontend = Frontend;
//! loop {
//!     let keys = KeySnapshot::default(); // captured from the keyboard
//!     engine.begin_frame(&keys);
//!     // ... feed drained key/axis/button events ...
//!     let state = engine.end_frame(&keys, &mut frontend);
//!     let _ = state; // handed to the consumer
//! }
//! ```

use evdev::Key;

use crate::config::InputConfig;

use super::arbiter::{ArbiterModes, InputArbiter, ThumbButton};
use super::analog::StickAxis;
use super::keymap::KeySnapshot;
use super::menu::{MenuHandler, MenuTrigger};
use super::personality::{AnalogMode, Personality};
use super::state::AnalogAxes;

/// One virtual pad engine, owned by the frame-loop driver.
#[derive(Debug)]
pub struct PadEngine {
    arbiter: InputArbiter,
    menu: MenuTrigger,
    mode: AnalogMode,
    personality: Personality,
}

impl PadEngine {
    /// Creates an engine from the input configuration.
    #[must_use]
    pub fn new(config: &InputConfig) -> Self {
        Self {
            arbiter: InputArbiter::new(ArbiterModes {
                digital_from_analog: config.digital_from_analog,
                keys_drive_analog: config.keys_drive_analog,
            }),
            menu: MenuTrigger::new(),
            mode: config.analog_mode,
            personality: Personality::for_mode(config.analog_mode),
        }
    }

    /// Re-selects the controller personality on a configuration change.
    pub fn set_analog_mode(&mut self, mode: AnalogMode) -> Personality {
        self.mode = mode;
        self.personality = Personality::for_mode(mode);
        self.personality
    }

    /// Returns the currently selected personality triple.
    #[must_use]
    pub fn personality(&self) -> Personality {
        self.personality
    }

    /// Returns the configured analog mode.
    #[must_use]
    pub fn analog_mode(&self) -> AnalogMode {
        self.mode
    }

    /// Returns the committed button image for a controller slot.
    #[must_use]
    pub fn committed(&self, slot: usize) -> u16 {
        self.arbiter.committed(slot)
    }

    /// Returns the analog coordinates read alongside the button image.
    #[must_use]
    pub fn axes(&self) -> AnalogAxes {
        self.arbiter.axes()
    }

    /// Starts a frame: keyboard scan plus menu-combination check.
    pub fn begin_frame(&mut self, keys: &KeySnapshot) {
        self.arbiter.scan_keyboard(keys);
        self.menu.observe_held(keys);
    }

    /// Feeds a key-down event observed during draining.
    pub fn key_down(&mut self, key: Key) {
        self.menu.observe_key_down(key);
    }

    /// Feeds a joystick axis sample observed during draining.
    pub fn axis_event(&mut self, axis: StickAxis, raw: i16) {
        self.arbiter.axis_event(axis, raw);
    }

    /// Feeds a joystick thumb-button press observed during draining.
    pub fn thumb_button_down(&mut self, thumb: ThumbButton) {
        self.arbiter.thumb_button_down(thumb);
    }

    /// Ends a frame: arbitrates, runs a pending menu handshake, and returns
    /// the committed slot-0 image.
    ///
    /// The menu handshake blocks until the frontend returns; the forced
    /// Start+Cross mask it produces lands on the next committed frame.
    pub fn end_frame(&mut self, keys: &KeySnapshot, frontend: &mut dyn MenuHandler) -> u16 {
        self.arbiter.commit(keys);

        if self.menu.take_request() {
            if let Some(mask) = self.menu.run_handshake(frontend) {
                self.arbiter.force_next_commit(mask);
            }
        }

        self.arbiter.committed(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pad::state::LogicalButton;

    #[derive(Default)]
    struct CountingFrontend {
        menus_run: usize,
    }

    impl MenuHandler for CountingFrontend {
        fn flush_storage(&mut self) {}
        fn pause(&mut self) {}
        fn enter_menu_display(&mut self) {}
        fn run_menu(&mut self) {
            self.menus_run += 1;
        }
        fn resume(&mut self) {}
        fn enter_game_display(&mut self) {}
    }

    fn engine_with(digital_from_analog: bool) -> PadEngine {
        PadEngine::new(&InputConfig {
            digital_from_analog,
            ..InputConfig::default()
        })
    }

    fn run_frame(engine: &mut PadEngine, keys: &KeySnapshot) -> u16 {
        let mut frontend = CountingFrontend::default();
        engine.begin_frame(keys);
        engine.end_frame(keys, &mut frontend)
    }

    // ==================== End-To-End Tests ====================

    #[test]
    fn test_stick_deflection_end_to_end() {
        let mut engine = engine_with(true);
        let keys = KeySnapshot::default();
        engine.begin_frame(&keys);
        engine.axis_event(StickAxis::LeftX, 20000);

        let mut frontend = CountingFrontend::default();
        let state = engine.end_frame(&keys, &mut frontend);

        assert_eq!(state & LogicalButton::Right.bit(), 0, "Right pressed");
        assert_ne!(state & LogicalButton::Left.bit(), 0, "Left released");
    }

    #[test]
    fn test_keyboard_end_to_end() {
        let mut engine = engine_with(false);
        let keys = KeySnapshot::from_keys(&[Key::KEY_SPACE]);
        let state = run_frame(&mut engine, &keys);
        assert_eq!(state & LogicalButton::Triangle.bit(), 0);
    }

    // ==================== Menu Integration Tests ====================

    #[test]
    fn test_menu_forces_start_and_cross_for_one_frame() {
        let mut engine = engine_with(false);
        let mut frontend = CountingFrontend::default();

        // Frame 1: menu requested and handled after arbitration.
        let keys = KeySnapshot::default();
        engine.begin_frame(&keys);
        engine.key_down(Key::KEY_HOME);
        let during = engine.end_frame(&keys, &mut frontend);
        assert_eq!(frontend.menus_run, 1);
        assert_ne!(during & LogicalButton::Start.bit(), 0);

        // Frame 2: the forced mask lands.
        let after = run_frame(&mut engine, &keys);
        assert_eq!(after & LogicalButton::Start.bit(), 0);
        assert_eq!(after & LogicalButton::Cross.bit(), 0);

        // Frame 3: normal arbitration resumes.
        let normal = run_frame(&mut engine, &keys);
        assert_ne!(normal & LogicalButton::Start.bit(), 0);
        assert_ne!(normal & LogicalButton::Cross.bit(), 0);
    }

    #[test]
    fn test_menu_request_is_consumed_once() {
        let mut engine = engine_with(false);
        let mut frontend = CountingFrontend::default();
        let keys = KeySnapshot::default();

        engine.begin_frame(&keys);
        engine.key_down(Key::KEY_END);
        engine.end_frame(&keys, &mut frontend);
        engine.begin_frame(&keys);
        engine.end_frame(&keys, &mut frontend);

        assert_eq!(frontend.menus_run, 1);
    }

    #[test]
    fn test_held_combination_triggers_menu() {
        let mut engine = engine_with(false);
        let mut frontend = CountingFrontend::default();
        let keys = KeySnapshot::from_keys(&[Key::KEY_ESC, Key::KEY_ENTER]);

        engine.begin_frame(&keys);
        engine.end_frame(&keys, &mut frontend);
        assert_eq!(frontend.menus_run, 1);
    }

    // ==================== Personality Tests ====================

    #[test]
    fn test_personality_follows_configuration() {
        let mut engine = engine_with(false);
        assert_eq!(engine.personality().id, 0x73);

        let p = engine.set_analog_mode(AnalogMode::Digital);
        assert_eq!(p.id, 0x41);
        assert_eq!(engine.personality().id, 0x41);
        assert_eq!(engine.analog_mode(), AnalogMode::Digital);
    }
}
