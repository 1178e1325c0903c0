//! # Pad Bridge Library
//!
//! Translate host keyboard and joystick input into a stable virtual-pad
//! button image, and drive a force-feedback actuator with debounced rumble
//! commands.
//!
//! This library provides the per-frame input arbitration, controller
//! personality selection, popup-menu handshake, and the rumble state
//! machine consumed by an emulation frame loop.

pub mod config;
pub mod error;
pub mod pad;
pub mod rumble;
