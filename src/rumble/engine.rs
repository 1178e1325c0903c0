//! # Rumble Engine Module
//!
//! State machine driving one haptic actuator from two 8-bit magnitude
//! channels: a binary "low" (weak motor) and a scaled "high" (strong motor).
//!
//! ## States
//!
//! ```text
//! Uninitialized --initialize--> NoDevice            (terminal for session)
//!                           \-> Idle <--trigger--> Active
//! ```
//!
//! Rumble is a non-essential capability: every failure path degrades to
//! no-ops or a `false` return for the current frame, never an error that
//! reaches the frame loop.
//!
//! ## Magnitude Composition
//!
//! The weak motor is binary: any nonzero "low" drives it full scale. The
//! strong motor scales "high" linearly into the device-native 16-bit range.
//! A changed pair is re-uploaded as a fresh effect rather than updated in
//! place.

use tracing::{debug, info, warn};

use super::device::{EffectId, HapticDevice};

/// Device-native weak-motor magnitude when the low channel is nonzero.
pub const RUMBLE_WEAK_MAGNITUDE: u16 = u16::MAX;

/// Scale factor from the 8-bit high channel to the strong motor range.
pub const RUMBLE_STRONG_FACTOR: u16 = u16::MAX / 255;

/// Maximum accepted gain percentage.
pub const RUMBLE_GAIN_MAX: u8 = 100;

/// State machine owning one haptic device and one uploaded effect.
#[derive(Default)]
pub struct RumbleEngine {
    device: Option<Box<dyn HapticDevice>>,
    effect: Option<EffectId>,
    low: u8,
    high: u8,
    active: bool,
    initialized: bool,
}

impl std::fmt::Debug for RumbleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RumbleEngine")
            .field("has_device", &self.device.is_some())
            .field("effect", &self.effect)
            .field("low", &self.low)
            .field("high", &self.high)
            .field("active", &self.active)
            .field("initialized", &self.initialized)
            .finish()
    }
}

impl RumbleEngine {
    /// Creates an uninitialized engine.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether a usable device is attached.
    #[must_use]
    pub fn has_device(&self) -> bool {
        self.device.is_some()
    }

    /// Returns whether the effect is currently playing.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Initializes the engine with a probed device, applying the configured
    /// gain percentage.
    ///
    /// Idempotent guard: a second call logs and returns without touching
    /// anything. With a zero gain or no device the engine finalizes without
    /// haptics; feedback is optional, so this is still a successful
    /// initialization. Any device failure during setup likewise degrades to
    /// the no-device state.
    pub fn initialize(&mut self, device: Option<Box<dyn HapticDevice>>, gain: u8) {
        if self.initialized {
            warn!("rumble already initialized, ignoring");
            return;
        }

        self.initialized = true;
        self.effect = None;
        self.low = 0;
        self.high = 0;
        self.active = false;

        if gain == 0 {
            info!("rumble gain is 0, haptics disabled");
            return;
        }

        let Some(mut device) = device else {
            info!("no haptic device, rumble effects disabled");
            return;
        };

        if !device.supports_rumble() || !device.supports_gain() {
            info!("haptic device lacks rumble or gain support, effects disabled");
            return;
        }

        let effect = match device.upload(0, 0) {
            Ok(id) => id,
            Err(e) => {
                warn!("initial effect upload failed, rumble disabled: {}", e);
                return;
            }
        };

        if let Err(e) = device.set_gain(gain.min(RUMBLE_GAIN_MAX)) {
            warn!("setting rumble gain failed, rumble disabled: {}", e);
            let _ = device.erase(effect);
            return;
        }

        self.device = Some(device);
        self.effect = Some(effect);
        info!("rumble initialized");
    }

    /// Applies a new gain percentage, clamped to [0, 100].
    ///
    /// Returns `false` when no device is attached or the device rejects the
    /// call.
    pub fn set_gain(&mut self, gain: u8) -> bool {
        let Some(device) = self.device.as_mut() else {
            return false;
        };

        device.set_gain(gain.min(RUMBLE_GAIN_MAX)).is_ok()
    }

    /// Drives the actuator from one frame's magnitude pair.
    ///
    /// Returns `false` when rumble is unavailable or a device call failed
    /// this frame; the caller treats that as "no feedback this frame" and
    /// carries on. Engine state is only advanced past confirmed device
    /// calls.
    pub fn trigger(&mut self, low: u8, high: u8) -> bool {
        let Some(device) = self.device.as_mut() else {
            return false;
        };
        let Some(mut effect) = self.effect else {
            return false;
        };

        // Total silence halts the effect and leaves the pair untouched.
        if low == 0 && high == 0 {
            if self.active {
                if device.stop(effect).is_err() {
                    return false;
                }
                self.active = false;
            }
            return true;
        }

        if low != self.low || high != self.high {
            // Quirk in some actuator firmware: changing magnitudes while
            // the effect runs is fine, except when the "both motors
            // engaged" predicate flips, then a later stop silently fails
            // and the rumble never ends. Stop explicitly before uploading
            // across that boundary.
            let both_engaged = low != 0 && high != 0;
            let was_both_engaged = self.low != 0 && self.high != 0;
            if self.active && both_engaged != was_both_engaged {
                if device.stop(effect).is_err() {
                    return false;
                }
                self.active = false;
            }

            let weak = if low != 0 { RUMBLE_WEAK_MAGNITUDE } else { 0 };
            let strong = u16::from(high) * RUMBLE_STRONG_FACTOR;
            effect = match device.upload(weak, strong) {
                Ok(id) => id,
                Err(e) => {
                    debug!("rumble effect upload failed: {}", e);
                    return false;
                }
            };

            self.effect = Some(effect);
            self.low = low;
            self.high = high;
        }

        if !self.active {
            if device.play(effect).is_err() {
                return false;
            }
            self.active = true;
        }

        true
    }

    /// Stops and releases everything, returning to the uninitialized state.
    pub fn shutdown(&mut self) {
        if let Some(device) = self.device.as_mut() {
            if let Some(effect) = self.effect {
                if self.active {
                    let _ = device.stop(effect);
                }
                let _ = device.erase(effect);
            }
        }

        self.device = None;
        self.effect = None;
        self.low = 0;
        self.high = 0;
        self.active = false;
        self.initialized = false;
    }
}
