//! # Host Input Device Module
//!
//! Discovery and per-frame polling of the physical keyboard and joystick
//! via the Linux evdev interface.
//!
//! ## Discovery
//!
//! `/dev/input/event*` nodes are scanned in sorted order for deterministic
//! selection. A keyboard is the first device advertising a conventional
//! typing key set; a joystick is the first device advertising gamepad
//! buttons together with absolute X/Y axes. A missing joystick is not an
//! error; the bridge runs keyboard-only.
//!
//! ## Polling Model
//!
//! Devices are polled by state once per frame instead of draining event
//! queues, so a quiet device can never stall the frame loop. Key-down edges
//! and axis motion are derived by diffing against the previous frame.
//!
//! ## Axis Normalization
//!
//! evdev devices report axes in arbitrary `absinfo` ranges (0-255 on a
//! DualSense, ±32767 on many sticks). Samples are normalized into the
//! signed 16-bit domain the sampler expects.

use std::path::{Path, PathBuf};

use evdev::{AbsoluteAxisType, AttributeSet, Device, Key};
use tracing::{debug, info};

use crate::error::{PadBridgeError, Result};

use super::analog::StickAxis;
use super::arbiter::ThumbButton;
use super::keymap::KeySnapshot;

/// One polled joystick observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoystickInput {
    /// An axis moved to a new normalized position.
    Axis { axis: StickAxis, raw: i16 },
    /// A thumb-stick click was newly pressed.
    ThumbDown(ThumbButton),
}

/// Lists input event nodes in deterministic order.
fn event_nodes(input_dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(input_dir)
        .map_err(|e| PadBridgeError::Device(format!("failed to read {}: {}", input_dir.display(), e)))?;

    let mut nodes: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.file_name()
                .map(|name| name.to_string_lossy().starts_with("event"))
                .unwrap_or(false)
        })
        .collect();
    nodes.sort();
    Ok(nodes)
}

/// Maps a raw absinfo sample into the signed 16-bit axis domain.
fn normalize_axis(value: i32, minimum: i32, maximum: i32) -> i16 {
    if maximum <= minimum {
        return 0;
    }
    let span = (maximum - minimum) as i64;
    let scaled = (value - minimum) as i64 * 65535 / span - 32768;
    scaled.clamp(i16::MIN as i64, i16::MAX as i64) as i16
}

/// Physical keyboard handle polled once per frame.
pub struct Keyboard {
    device: Device,
    device_path: String,
    previous: AttributeSet<Key>,
}

impl std::fmt::Debug for Keyboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keyboard")
            .field("device_path", &self.device_path)
            .finish_non_exhaustive()
    }
}

impl Keyboard {
    /// Opens the first usable keyboard under `/dev/input`.
    ///
    /// # Errors
    ///
    /// Returns [`PadBridgeError::KeyboardNotFound`] when no device
    /// advertises a conventional typing key set, or a device error when
    /// `/dev/input` itself cannot be read.
    pub fn open() -> Result<Self> {
        Self::open_in(Path::new("/dev/input"))
    }

    /// Opens the first usable keyboard under a given input directory.
    pub fn open_in(input_dir: &Path) -> Result<Self> {
        for path in event_nodes(input_dir)? {
            let device = match Device::open(&path) {
                Ok(device) => device,
                Err(e) => {
                    debug!("could not open {}: {}", path.display(), e);
                    continue;
                }
            };

            if Self::looks_like_keyboard(&device) {
                let device_path = path.to_string_lossy().to_string();
                info!(
                    "using keyboard {} ({})",
                    device_path,
                    device.name().unwrap_or("unnamed")
                );
                return Ok(Self {
                    device,
                    device_path,
                    previous: AttributeSet::new(),
                });
            }
        }

        Err(PadBridgeError::KeyboardNotFound)
    }

    fn looks_like_keyboard(device: &Device) -> bool {
        device.supported_keys().map_or(false, |keys| {
            keys.contains(Key::KEY_ENTER)
                && keys.contains(Key::KEY_SPACE)
                && keys.contains(Key::KEY_LEFTSHIFT)
                && !keys.contains(Key::BTN_SOUTH)
        })
    }

    /// Returns the `/dev/input/eventX` path of this keyboard.
    #[must_use]
    pub fn device_path(&self) -> &str {
        &self.device_path
    }

    /// Polls the frame's held-key snapshot plus newly pressed keys.
    ///
    /// # Errors
    ///
    /// Returns a device error when the key state cannot be read (e.g. the
    /// device disappeared).
    pub fn poll(&mut self) -> Result<(KeySnapshot, Vec<Key>)> {
        let held = self
            .device
            .get_key_state()
            .map_err(|e| PadBridgeError::Device(format!("keyboard state: {}", e)))?;

        let key_downs: Vec<Key> = held
            .iter()
            .filter(|key| !self.previous.contains(*key))
            .collect();

        self.previous = held.clone();
        Ok((KeySnapshot::new(held), key_downs))
    }
}

/// Physical joystick handle polled once per frame.
pub struct Joystick {
    device: Device,
    device_path: String,
    right_x: AbsoluteAxisType,
    right_y: AbsoluteAxisType,
    last_axis: [Option<i16>; 4],
    previous_buttons: AttributeSet<Key>,
}

impl std::fmt::Debug for Joystick {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Joystick")
            .field("device_path", &self.device_path)
            .finish_non_exhaustive()
    }
}

impl Joystick {
    /// Opens the first gamepad-like device under `/dev/input`, if any.
    #[must_use]
    pub fn open() -> Option<Self> {
        Self::open_in(Path::new("/dev/input"))
    }

    /// Opens the first gamepad-like device under a given input directory.
    pub fn open_in(input_dir: &Path) -> Option<Self> {
        for path in event_nodes(input_dir).ok()? {
            let device = match Device::open(&path) {
                Ok(device) => device,
                Err(e) => {
                    debug!("could not open {}: {}", path.display(), e);
                    continue;
                }
            };

            if !Self::looks_like_gamepad(&device) {
                continue;
            }

            let axes = device.supported_absolute_axes();
            // Secondary stick naming differs between controllers: many
            // report ABS_RX/ABS_RY, DualSense-family pads use ABS_Z/ABS_RZ.
            let (right_x, right_y) = if axes.map_or(false, |a| {
                a.contains(AbsoluteAxisType::ABS_RX) && a.contains(AbsoluteAxisType::ABS_RY)
            }) {
                (AbsoluteAxisType::ABS_RX, AbsoluteAxisType::ABS_RY)
            } else {
                (AbsoluteAxisType::ABS_Z, AbsoluteAxisType::ABS_RZ)
            };

            let device_path = path.to_string_lossy().to_string();
            info!(
                "using joystick {} ({})",
                device_path,
                device.name().unwrap_or("unnamed")
            );
            return Some(Self {
                device,
                device_path,
                right_x,
                right_y,
                last_axis: [None; 4],
                previous_buttons: AttributeSet::new(),
            });
        }

        debug!("no joystick found, running keyboard-only");
        None
    }

    fn looks_like_gamepad(device: &Device) -> bool {
        let has_buttons = device.supported_keys().map_or(false, |keys| {
            keys.contains(Key::BTN_SOUTH) || keys.contains(Key::BTN_THUMBL)
        });
        let has_axes = device.supported_absolute_axes().map_or(false, |axes| {
            axes.contains(AbsoluteAxisType::ABS_X) && axes.contains(AbsoluteAxisType::ABS_Y)
        });
        has_buttons && has_axes
    }

    /// Returns the `/dev/input/eventX` path of this joystick.
    #[must_use]
    pub fn device_path(&self) -> &str {
        &self.device_path
    }

    fn stick_axis(&self, code: AbsoluteAxisType) -> Option<StickAxis> {
        if code == AbsoluteAxisType::ABS_X {
            Some(StickAxis::LeftX)
        } else if code == AbsoluteAxisType::ABS_Y {
            Some(StickAxis::LeftY)
        } else if code == self.right_x {
            Some(StickAxis::RightX)
        } else if code == self.right_y {
            Some(StickAxis::RightY)
        } else {
            None
        }
    }

    /// Polls axis motion and newly pressed thumb buttons for this frame.
    ///
    /// Axis observations are emitted only when the normalized position
    /// changed since the previous poll, mirroring a motion-event stream.
    ///
    /// # Errors
    ///
    /// Returns a device error when the device state cannot be read.
    pub fn poll(&mut self) -> Result<Vec<JoystickInput>> {
        let mut inputs = Vec::new();

        let abs_state = self
            .device
            .get_abs_state()
            .map_err(|e| PadBridgeError::Device(format!("joystick axes: {}", e)))?;
        let absinfo: Vec<_> = self
            .device
            .supported_absolute_axes()
            .into_iter()
            .flat_map(|axes| axes.iter())
            .map(|code| (code, abs_state[code.0 as usize]))
            .collect();
        for (code, info) in absinfo {
            let Some(axis) = self.stick_axis(code) else {
                continue;
            };
            let raw = normalize_axis(info.value, info.minimum, info.maximum);
            let slot = axis_slot(axis);
            if self.last_axis[slot] != Some(raw) {
                self.last_axis[slot] = Some(raw);
                inputs.push(JoystickInput::Axis { axis, raw });
            }
        }

        let buttons = self
            .device
            .get_key_state()
            .map_err(|e| PadBridgeError::Device(format!("joystick buttons: {}", e)))?;
        for (key, thumb) in [
            (Key::BTN_THUMBL, ThumbButton::Left),
            (Key::BTN_THUMBR, ThumbButton::Right),
        ] {
            if buttons.contains(key) && !self.previous_buttons.contains(key) {
                inputs.push(JoystickInput::ThumbDown(thumb));
            }
        }
        self.previous_buttons = buttons.clone();

        Ok(inputs)
    }
}

fn axis_slot(axis: StickAxis) -> usize {
    match axis {
        StickAxis::LeftX => 0,
        StickAxis::LeftY => 1,
        StickAxis::RightX => 2,
        StickAxis::RightY => 3,
    }
}
