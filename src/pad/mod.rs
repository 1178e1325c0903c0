//! # Virtual Pad Module
//!
//! Translation of host keyboard and joystick input into the committed
//! per-frame virtual controller image.
//!
//! This module handles:
//! - The logical button set and active-low pad image
//! - Keyboard scanning through the static button map
//! - Analog sampling with the dead-zone commit range
//! - Per-frame arbitration between the input sources
//! - Controller personality selection
//! - Popup-menu detection and the pause/resume handshake
//! - Physical device discovery and polling via evdev

pub mod analog;
pub mod arbiter;
pub mod devices;
pub mod engine;
pub mod keymap;
pub mod menu;
pub mod personality;
pub mod state;

pub use analog::StickAxis;
pub use arbiter::ThumbButton;
pub use engine::PadEngine;
pub use keymap::KeySnapshot;
pub use menu::MenuHandler;
pub use personality::{AnalogMode, Personality};
pub use state::{AnalogAxes, LogicalButton, PadButtons};
