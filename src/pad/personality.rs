//! # Controller Personality Module
//!
//! Maps the configured analog mode to the identifier triple presented to
//! the consumer: protocol id, pad mode, and controller type.
//!
//! | Mode        | Id   | Pad mode | Type |
//! |-------------|------|----------|------|
//! | Digital     | 0x41 | 0        | 0    |
//! | Dual-Analog | 0x53 | 1        | 1    |
//! | DualShock   | 0x73 | 1        | 1    |

use serde::Deserialize;

/// Configured controller behavior.
///
/// Digital is required by some titles; Dual-Analog exists for the few that
/// misbehave when offered a DualShock; DualShock is the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnalogMode {
    Digital,
    DualAnalog,
    #[default]
    Dualshock,
}

/// Identifier triple exposed to the consumer for one controller slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Personality {
    /// Protocol identifier byte.
    pub id: u8,
    /// Pad mode flag (0 = digital, 1 = analog).
    pub pad_mode: u8,
    /// Controller type flag.
    pub controller_type: u8,
}

impl Personality {
    /// Returns the personality triple for a configured analog mode.
    ///
    /// Pure mapping; re-applied whenever the configuration changes.
    ///
    /// # Examples
    ///
    /// ```
    /// use pad_bridge::pad::personality::{AnalogMode, Personality};
    ///
    /// let p = Personality::for_mode(AnalogMode::Dualshock);
    /// assert_eq!(p.id, 0x73);
    /// ```
    #[must_use]
    pub fn for_mode(mode: AnalogMode) -> Self {
        match mode {
            AnalogMode::Digital => Self {
                id: 0x41,
                pad_mode: 0,
                controller_type: 0,
            },
            AnalogMode::DualAnalog => Self {
                id: 0x53,
                pad_mode: 1,
                controller_type: 1,
            },
            AnalogMode::Dualshock => Self {
                id: 0x73,
                pad_mode: 1,
                controller_type: 1,
            },
        }
    }
}
