//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::warn;

use crate::error::Result;
use crate::pad::personality::AnalogMode;
use crate::rumble::engine::RUMBLE_GAIN_MAX;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub input: InputConfig,

    #[serde(default)]
    pub rumble: RumbleConfig,
}

/// Input translation configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct InputConfig {
    /// Controller personality presented to the consumer.
    #[serde(default)]
    pub analog_mode: AnalogMode,

    /// Primary-stick deflection drives the d-pad bits.
    #[serde(default)]
    pub digital_from_analog: bool,

    /// Arrow keys emulate the left analog stick.
    #[serde(default)]
    pub keys_drive_analog: bool,
}

/// Haptic feedback configuration
#[derive(Debug, Deserialize, Clone)]
pub struct RumbleConfig {
    /// Effect strength in percent. 0 disables haptics entirely.
    #[serde(default = "default_rumble_gain")]
    pub gain: u8,
}

impl Default for RumbleConfig {
    fn default() -> Self {
        Self {
            gain: default_rumble_gain(),
        }
    }
}

fn default_rumble_gain() -> u8 {
    100
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or TOML parsing fails.
    /// Out-of-range values are clamped rather than rejected.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use pad_bridge::config::Config;
    ///
    /// let config = Config::load("pad-bridge.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)?;
        config.clamp();
        Ok(config)
    }

    /// Clamp out-of-range values to their nearest legal setting
    fn clamp(&mut self) {
        if self.rumble.gain > RUMBLE_GAIN_MAX {
            warn!(
                "rumble gain {} out of range, clamping to {}",
                self.rumble.gain, RUMBLE_GAIN_MAX
            );
            self.rumble.gain = RUMBLE_GAIN_MAX;
        }
    }
}
