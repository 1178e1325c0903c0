//! # Input Arbiter Module
//!
//! Merges the three input sources (keyboard scan, analog sampler, joystick
//! thumb buttons) into the committed per-frame pad image for slot 0.
//!
//! ## Frame Protocol
//!
//! 1. [`InputArbiter::scan_keyboard`] applies the held-key snapshot to the
//!    working accumulator.
//! 2. [`InputArbiter::axis_event`] and [`InputArbiter::thumb_button_down`]
//!    fold drained joystick events into the accumulator and sampler.
//! 3. [`InputArbiter::commit`] runs the merge policy exactly once and
//!    publishes the committed snapshot read by the consumer.
//!
//! ## Merge Policy
//!
//! With digital-from-analog active the primary stick's override flags own
//! the four directional bits outright. With keys-drive-analog active the
//! arrow keys drive the left-stick coordinates instead of the d-pad, and a
//! held Select key redirects the face keys onto the right stick. In plain
//! passthrough a directional key press that agrees with a simultaneous stick
//! deflection is suppressed, since some backends report one physical stick
//! through both the keyboard and joystick interfaces.
//!
//! The merge is deterministic for a fixed set of frame inputs; event
//! arrival order only matters as last-write-wins within one source.

use evdev::Key;

use super::analog::{AnalogSampler, SampleEffect, StickAxis};
use super::keymap::{scan_keyboard, KeySnapshot};
use super::state::{AnalogAxes, LogicalButton, PadButtons, AXIS_NEUTRAL, SLOT_COUNT};

/// Joystick thumb-stick click buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbButton {
    /// Left stick click (L3).
    Left,
    /// Right stick click (R3).
    Right,
}

/// Arbitration configuration, fixed for the lifetime of a session unless
/// explicitly re-applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArbiterModes {
    /// Primary-stick deflection owns the directional bits.
    pub digital_from_analog: bool,
    /// Arrow keys emulate the left stick instead of the d-pad.
    pub keys_drive_analog: bool,
}

/// Per-frame input arbiter owning the working and committed pad state.
#[derive(Debug)]
pub struct InputArbiter {
    working: PadButtons,
    committed: [PadButtons; SLOT_COUNT],
    axes: AnalogAxes,
    sampler: AnalogSampler,
    modes: ArbiterModes,
    forced: Option<PadButtons>,
}

impl InputArbiter {
    /// Creates an arbiter with everything released and centered.
    #[must_use]
    pub fn new(modes: ArbiterModes) -> Self {
        Self {
            working: PadButtons::default(),
            committed: [PadButtons::default(); SLOT_COUNT],
            axes: AnalogAxes::default(),
            sampler: AnalogSampler::new(),
            modes,
            forced: None,
        }
    }

    /// Re-applies the arbitration modes on a configuration change.
    pub fn set_modes(&mut self, modes: ArbiterModes) {
        self.modes = modes;
    }

    /// Returns the committed 16-bit image for a controller slot.
    ///
    /// Slot 1 is never populated and always reads all-released.
    #[must_use]
    pub fn committed(&self, slot: usize) -> u16 {
        self.committed.get(slot).copied().unwrap_or_default().bits()
    }

    /// Returns the analog coordinates read alongside the button image.
    #[must_use]
    pub fn axes(&self) -> AnalogAxes {
        self.axes
    }

    /// Applies the frame's held-key snapshot to the working accumulator.
    pub fn scan_keyboard(&mut self, keys: &KeySnapshot) {
        scan_keyboard(&mut self.working, keys);
    }

    /// Folds one joystick axis sample into the sampler and axis state.
    pub fn axis_event(&mut self, axis: StickAxis, raw: i16) {
        match self
            .sampler
            .sample(axis, raw, self.modes.digital_from_analog)
        {
            SampleEffect::None => {}
            SampleEffect::Coordinate { axis, value } => match axis {
                StickAxis::LeftX => self.axes.left_x = value,
                StickAxis::LeftY => self.axes.left_y = value,
                StickAxis::RightX => self.axes.right_x = value,
                StickAxis::RightY => self.axes.right_y = value,
            },
            SampleEffect::FacePress(button) => self.working.press(button),
        }
    }

    /// Registers a joystick thumb-button press for this frame.
    pub fn thumb_button_down(&mut self, thumb: ThumbButton) {
        let button = match thumb {
            ThumbButton::Left => LogicalButton::L3,
            ThumbButton::Right => LogicalButton::R3,
        };
        self.working.press(button);
    }

    /// Arms a one-shot pressed mask applied to the next commit only.
    pub fn force_next_commit(&mut self, mask: PadButtons) {
        self.forced = Some(mask);
    }

    /// Runs the merge policy and publishes the slot-0 committed snapshot.
    pub fn commit(&mut self, keys: &KeySnapshot) {
        let mut merged = self.working;

        if self.modes.digital_from_analog {
            let o = self.sampler.overrides();
            merged.set_pressed(LogicalButton::Up, o.up);
            merged.set_pressed(LogicalButton::Down, o.down);
            merged.set_pressed(LogicalButton::Left, o.left);
            merged.set_pressed(LogicalButton::Right, o.right);
        } else if self.modes.keys_drive_analog {
            self.emulate_left_stick(keys, &mut merged);
            self.emulate_right_stick(keys, &mut merged);
        } else {
            let o = self.sampler.overrides();
            for (button, agreed) in [
                (LogicalButton::Up, o.up),
                (LogicalButton::Down, o.down),
                (LogicalButton::Left, o.left),
                (LogicalButton::Right, o.right),
            ] {
                if agreed && merged.is_pressed(button) {
                    merged.release(button);
                }
            }
        }

        if let Some(mask) = self.forced.take() {
            merged.merge_pressed(mask);
        }

        self.committed[0] = merged;
    }

    /// Arrow keys drive the left stick to the rails; the d-pad bits they
    /// pressed during the scan are handed back released.
    fn emulate_left_stick(&mut self, keys: &KeySnapshot, merged: &mut PadButtons) {
        if keys.is_held(Key::KEY_UP) {
            self.axes.left_y = 0;
            merged.release(LogicalButton::Up);
        } else if keys.is_held(Key::KEY_DOWN) {
            self.axes.left_y = 255;
            merged.release(LogicalButton::Down);
        } else {
            self.axes.left_y = AXIS_NEUTRAL;
        }

        if keys.is_held(Key::KEY_LEFT) {
            self.axes.left_x = 0;
            merged.release(LogicalButton::Left);
        } else if keys.is_held(Key::KEY_RIGHT) {
            self.axes.left_x = 255;
            merged.release(LogicalButton::Right);
        } else {
            self.axes.left_x = AXIS_NEUTRAL;
        }
    }

    /// While the Select-mapped modifier is held, the face keys drive the
    /// right stick instead of their buttons.
    fn emulate_right_stick(&mut self, keys: &KeySnapshot, merged: &mut PadButtons) {
        if !keys.is_held(Key::KEY_ESC) {
            self.axes.center_right();
            return;
        }

        if keys.is_held(Key::KEY_SPACE) {
            self.axes.right_y = 0;
            merged.release(LogicalButton::Triangle);
        } else if keys.is_held(Key::KEY_LEFTALT) {
            self.axes.right_y = 255;
            merged.release(LogicalButton::Cross);
        } else {
            self.axes.right_y = AXIS_NEUTRAL;
        }

        if keys.is_held(Key::KEY_LEFTSHIFT) {
            self.axes.right_x = 0;
            merged.release(LogicalButton::Square);
        } else if keys.is_held(Key::KEY_LEFTCTRL) {
            self.axes.right_x = 255;
            merged.release(LogicalButton::Circle);
        } else {
            self.axes.right_x = AXIS_NEUTRAL;
        }
    }
}
