//! # Rumble Module
//!
//! Haptic feedback: device probing, the force-feedback device abstraction,
//! and the debounced rumble state machine.
//!
//! This module handles:
//! - Probing `/dev/input` for a rumble-capable actuator
//! - Uploading, playing, and stopping the single rumble effect
//! - Gain control in percent
//! - The stop-before-reupload sequencing some actuator firmware requires

pub mod device;
pub mod engine;

pub use device::{probe, EffectId, EvdevHaptic, HapticDevice};
pub use engine::RumbleEngine;
