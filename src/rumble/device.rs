//! # Haptic Device Module
//!
//! Trait abstraction over one force-feedback actuator, plus the concrete
//! evdev-backed implementation and its probe.
//!
//! The trait keeps the rumble state machine testable: device calls are
//! immediate success/failure operations with no retries and no blocking,
//! and the engine only ever talks to this interface.

use std::io;
use std::path::Path;

use evdev::{
    Device, EventType, FFEffect, FFEffectData, FFEffectKind, FFEffectType, FFReplay, FFTrigger,
    InputEvent,
};
use tracing::{debug, info};

#[cfg(test)]
use mockall::automock;

/// Handle of one uploaded effect, assigned by the device wrapper.
pub type EffectId = u16;

/// One force-feedback actuator holding at most one uploaded rumble effect.
///
/// Uploading replaces any previously uploaded effect; the returned id is
/// only valid until the next upload or erase.
#[cfg_attr(test, automock)]
pub trait HapticDevice: Send {
    /// Whether the device can render a rumble effect at all.
    fn supports_rumble(&self) -> bool;

    /// Whether the device accepts gain adjustment.
    fn supports_gain(&self) -> bool;

    /// Applies a gain in percent (0-100).
    fn set_gain(&mut self, gain: u8) -> io::Result<()>;

    /// Uploads a rumble effect, replacing the current one.
    ///
    /// `weak_magnitude` and `strong_magnitude` are device-native
    /// full-scale values.
    fn upload(&mut self, weak_magnitude: u16, strong_magnitude: u16) -> io::Result<EffectId>;

    /// Starts playing the uploaded effect.
    fn play(&mut self, id: EffectId) -> io::Result<()>;

    /// Stops the playing effect.
    fn stop(&mut self, id: EffectId) -> io::Result<()>;

    /// Erases the uploaded effect.
    fn erase(&mut self, id: EffectId) -> io::Result<()>;
}

/// Converts a percent gain to the kernel's 16-bit gain domain.
fn gain_to_native(gain: u8) -> u16 {
    (u32::from(gain.min(100)) * 0xFFFF / 100) as u16
}

/// evdev-backed haptic actuator.
pub struct EvdevHaptic {
    device: Device,
    device_path: String,
    effect: Option<(EffectId, FFEffect)>,
    next_id: EffectId,
}

impl std::fmt::Debug for EvdevHaptic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvdevHaptic")
            .field("device_path", &self.device_path)
            .finish_non_exhaustive()
    }
}

/// Probes `/dev/input` for the first rumble-capable device.
///
/// Absence of a capable device is a normal outcome, not an error.
#[must_use]
pub fn probe() -> Option<EvdevHaptic> {
    probe_in(Path::new("/dev/input"))
}

/// Probes a given input directory for the first rumble-capable device.
pub fn probe_in(input_dir: &Path) -> Option<EvdevHaptic> {
    let entries = std::fs::read_dir(input_dir).ok()?;
    let mut nodes: Vec<_> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.file_name()
                .map(|name| name.to_string_lossy().starts_with("event"))
                .unwrap_or(false)
        })
        .collect();
    nodes.sort();

    for path in nodes {
        let device = match Device::open(&path) {
            Ok(device) => device,
            Err(e) => {
                debug!("could not open {}: {}", path.display(), e);
                continue;
            }
        };

        let rumble_capable = device
            .supported_ff()
            .map_or(false, |ff| ff.contains(FFEffectType::FF_RUMBLE));
        if !rumble_capable {
            continue;
        }

        let device_path = path.to_string_lossy().to_string();
        info!(
            "using haptic device {} ({})",
            device_path,
            device.name().unwrap_or("unnamed")
        );
        return Some(EvdevHaptic {
            device,
            device_path,
            effect: None,
            next_id: 0,
        });
    }

    debug!("no rumble-capable device found");
    None
}

impl EvdevHaptic {
    /// Returns the `/dev/input/eventX` path of this actuator.
    #[must_use]
    pub fn device_path(&self) -> &str {
        &self.device_path
    }

    fn current(&mut self, id: EffectId) -> io::Result<&mut FFEffect> {
        match &mut self.effect {
            Some((current, effect)) if *current == id => Ok(effect),
            _ => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("effect {} is not uploaded", id),
            )),
        }
    }
}

impl HapticDevice for EvdevHaptic {
    fn supports_rumble(&self) -> bool {
        self.device
            .supported_ff()
            .map_or(false, |ff| ff.contains(FFEffectType::FF_RUMBLE))
    }

    fn supports_gain(&self) -> bool {
        self.device
            .supported_ff()
            .map_or(false, |ff| ff.contains(FFEffectType::FF_GAIN))
    }

    fn set_gain(&mut self, gain: u8) -> io::Result<()> {
        self.device.send_events(&[InputEvent::new(
            EventType::FORCEFEEDBACK,
            FFEffectType::FF_GAIN.0,
            i32::from(gain_to_native(gain)),
        )])
    }

    fn upload(&mut self, weak_magnitude: u16, strong_magnitude: u16) -> io::Result<EffectId> {
        // Replacing rather than updating in place keeps the kernel-side
        // effect consistent with what the engine believes is uploaded.
        self.effect = None;

        let data = FFEffectData {
            direction: 0,
            trigger: FFTrigger {
                button: 0,
                interval: 0,
            },
            replay: FFReplay {
                // Zero length plays until explicitly stopped.
                length: 0,
                delay: 0,
            },
            kind: FFEffectKind::Rumble {
                strong_magnitude,
                weak_magnitude,
            },
        };

        let effect = self.device.upload_ff_effect(data)?;
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        self.effect = Some((id, effect));
        Ok(id)
    }

    fn play(&mut self, id: EffectId) -> io::Result<()> {
        self.current(id)?.play(1)
    }

    fn stop(&mut self, id: EffectId) -> io::Result<()> {
        self.current(id)?.stop()
    }

    fn erase(&mut self, id: EffectId) -> io::Result<()> {
        // Dropping the handle releases the kernel-side effect.
        self.current(id)?;
        self.effect = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gain_percent_to_native_scaling() {
        assert_eq!(gain_to_native(0), 0);
        assert_eq!(gain_to_native(100), 0xFFFF);
        assert_eq!(gain_to_native(50), 0x7FFF);
        assert_eq!(gain_to_native(200), 0xFFFF, "overdriven gain saturates");
    }

    #[test]
    fn test_probe_in_missing_directory() {
        assert!(probe_in(Path::new("/nonexistent/pad-bridge-haptic")).is_none());
    }
}
