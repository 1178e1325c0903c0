//! # Analog Sampler Module
//!
//! Converts raw signed 16-bit joystick axis samples into either analog
//! stick coordinates or digital direction decisions.
//!
//! ## Commit Range
//!
//! A fixed dead zone of 8192 (on the [-32768, 32767] axis domain) decides
//! when a stick deflection counts as a discrete directional press. Readings
//! inside the range are treated as centered.
//!
//! ## Modes
//!
//! - **Passthrough** (digital-from-analog off): samples are rescaled to the
//!   [0, 255] coordinate domain and stored; the pad's digital bits are not
//!   touched. Direction override flags are still tracked for the primary
//!   stick so the arbitration pass can suppress double-reported presses.
//! - **Digital-from-analog**: the primary stick owns the four direction
//!   override flags; the secondary stick maps to face-button presses
//!   (X axis: Circle/Square, Y axis: Cross/Triangle). Coordinates are left
//!   untouched in this mode.

use super::state::LogicalButton;

/// Dead-zone commit threshold on the signed 16-bit axis domain.
pub const COMMIT_RANGE: i16 = 8192;

/// One of the four raw stick axes fed into the sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StickAxis {
    /// Primary stick, horizontal.
    LeftX,
    /// Primary stick, vertical.
    LeftY,
    /// Secondary stick, horizontal.
    RightX,
    /// Secondary stick, vertical.
    RightY,
}

/// Direction flags derived from primary-stick deflection.
///
/// Recomputed from scratch whenever a primary-axis sample arrives; each axis
/// can set at most one of its two opposing flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectionOverrides {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

/// Side effect of one axis sample, applied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleEffect {
    /// Nothing beyond the sampler's own state changed.
    None,
    /// Write this coordinate to the analog axis state.
    Coordinate { axis: StickAxis, value: u8 },
    /// Press this face button in the working image.
    FacePress(LogicalButton),
}

/// Rescales a raw signed 16-bit sample to the [0, 255] coordinate domain.
#[inline]
#[must_use]
pub fn rescale(raw: i16) -> u8 {
    ((raw as i32 + 32768) / 256) as u8
}

/// Stateful axis sampler.
///
/// Holds only the [`DirectionOverrides`]; everything else about a sample is
/// returned as a [`SampleEffect`] for the arbiter to apply. Sampling is
/// idempotent for identical raw input.
#[derive(Debug, Default)]
pub struct AnalogSampler {
    overrides: DirectionOverrides,
}

impl AnalogSampler {
    /// Creates a sampler with all overrides clear.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current direction override flags.
    #[must_use]
    pub fn overrides(&self) -> DirectionOverrides {
        self.overrides
    }

    /// Clears all direction override flags.
    pub fn reset(&mut self) {
        self.overrides = DirectionOverrides::default();
    }

    /// Processes one raw axis sample.
    ///
    /// # Arguments
    ///
    /// * `axis` - Which stick axis the sample belongs to
    /// * `raw` - Raw value in [-32768, 32767]
    /// * `digital_from_analog` - Whether the digital-from-analog mode is on
    ///
    /// # Examples
    ///
    /// ```
    /// use pad_bridge::pad::analog::{AnalogSampler, SampleEffect, StickAxis};
    ///
    /// let mut sampler = AnalogSampler::new();
    /// let effect = sampler.sample(StickAxis::LeftX, 20000, true);
    /// assert_eq!(effect, SampleEffect::None);
    /// assert!(sampler.overrides().right);
    /// assert!(!sampler.overrides().left);
    /// ```
    pub fn sample(
        &mut self,
        axis: StickAxis,
        raw: i16,
        digital_from_analog: bool,
    ) -> SampleEffect {
        match axis {
            StickAxis::LeftX => {
                self.overrides.left = raw < -COMMIT_RANGE;
                self.overrides.right = raw > COMMIT_RANGE;
                if digital_from_analog {
                    SampleEffect::None
                } else {
                    SampleEffect::Coordinate {
                        axis,
                        value: rescale(raw),
                    }
                }
            }
            StickAxis::LeftY => {
                self.overrides.up = raw < -COMMIT_RANGE;
                self.overrides.down = raw > COMMIT_RANGE;
                if digital_from_analog {
                    SampleEffect::None
                } else {
                    SampleEffect::Coordinate {
                        axis,
                        value: rescale(raw),
                    }
                }
            }
            StickAxis::RightX => {
                if digital_from_analog {
                    Self::face_press(raw, LogicalButton::Circle, LogicalButton::Square)
                } else {
                    SampleEffect::Coordinate {
                        axis,
                        value: rescale(raw),
                    }
                }
            }
            StickAxis::RightY => {
                if digital_from_analog {
                    Self::face_press(raw, LogicalButton::Cross, LogicalButton::Triangle)
                } else {
                    SampleEffect::Coordinate {
                        axis,
                        value: rescale(raw),
                    }
                }
            }
        }
    }

    /// Maps a secondary-stick deflection to a face-button press.
    fn face_press(raw: i16, positive: LogicalButton, negative: LogicalButton) -> SampleEffect {
        if raw > COMMIT_RANGE {
            SampleEffect::FacePress(positive)
        } else if raw < -COMMIT_RANGE {
            SampleEffect::FacePress(negative)
        } else {
            SampleEffect::None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Rescale Tests ====================

    #[test]
    fn test_rescale_endpoints() {
        assert_eq!(rescale(i16::MIN), 0);
        assert_eq!(rescale(i16::MAX), 255);
    }

    #[test]
    fn test_rescale_center() {
        assert_eq!(rescale(0), 128);
    }

    // ==================== Override Flag Tests ====================

    #[test]
    fn test_positive_deflection_sets_single_flag() {
        let mut sampler = AnalogSampler::new();

        sampler.sample(StickAxis::LeftX, COMMIT_RANGE + 1, true);
        assert!(sampler.overrides().right);
        assert!(!sampler.overrides().left);

        sampler.sample(StickAxis::LeftY, COMMIT_RANGE + 1, true);
        assert!(sampler.overrides().down);
        assert!(!sampler.overrides().up);
    }

    #[test]
    fn test_negative_deflection_sets_single_flag() {
        let mut sampler = AnalogSampler::new();

        sampler.sample(StickAxis::LeftX, -COMMIT_RANGE - 1, true);
        assert!(sampler.overrides().left);
        assert!(!sampler.overrides().right);

        sampler.sample(StickAxis::LeftY, -COMMIT_RANGE - 1, true);
        assert!(sampler.overrides().up);
        assert!(!sampler.overrides().down);
    }

    #[test]
    fn test_opposing_flags_never_coexist() {
        let mut sampler = AnalogSampler::new();
        for raw in [-32768, -8193, -8192, -1, 0, 1, 8192, 8193, 32767] {
            sampler.sample(StickAxis::LeftX, raw, true);
            let o = sampler.overrides();
            assert!(
                !(o.left && o.right),
                "left and right both set for raw {}",
                raw
            );
        }
    }

    #[test]
    fn test_dead_zone_clears_both_flags() {
        let mut sampler = AnalogSampler::new();
        sampler.sample(StickAxis::LeftX, 20000, true);
        assert!(sampler.overrides().right);

        sampler.sample(StickAxis::LeftX, 0, true);
        assert!(!sampler.overrides().right);
        assert!(!sampler.overrides().left);
    }

    #[test]
    fn test_commit_range_boundary_is_exclusive() {
        let mut sampler = AnalogSampler::new();
        sampler.sample(StickAxis::LeftX, COMMIT_RANGE, true);
        assert!(!sampler.overrides().right);

        sampler.sample(StickAxis::LeftX, -COMMIT_RANGE, true);
        assert!(!sampler.overrides().left);
    }

    #[test]
    fn test_sampling_is_idempotent() {
        let mut sampler = AnalogSampler::new();
        let first = sampler.sample(StickAxis::LeftX, 20000, true);
        let flags = sampler.overrides();
        let second = sampler.sample(StickAxis::LeftX, 20000, true);

        assert_eq!(first, second);
        assert_eq!(flags, sampler.overrides());
    }

    #[test]
    fn test_overrides_tracked_in_passthrough_mode() {
        // Flags stay current even when analog coordinates are live, so the
        // arbiter can suppress keyboard presses that agree with the stick.
        let mut sampler = AnalogSampler::new();
        let effect = sampler.sample(StickAxis::LeftX, 20000, false);

        assert_eq!(
            effect,
            SampleEffect::Coordinate {
                axis: StickAxis::LeftX,
                value: rescale(20000),
            }
        );
        assert!(sampler.overrides().right);
    }

    // ==================== Coordinate Tests ====================

    #[test]
    fn test_passthrough_produces_coordinates() {
        let mut sampler = AnalogSampler::new();
        for (axis, raw, value) in [
            (StickAxis::LeftX, i16::MIN, 0u8),
            (StickAxis::LeftY, 0, 128),
            (StickAxis::RightX, i16::MAX, 255),
            (StickAxis::RightY, -256, 127),
        ] {
            assert_eq!(
                sampler.sample(axis, raw, false),
                SampleEffect::Coordinate { axis, value }
            );
        }
    }

    #[test]
    fn test_digital_mode_leaves_primary_coordinates_alone() {
        let mut sampler = AnalogSampler::new();
        assert_eq!(sampler.sample(StickAxis::LeftX, 30000, true), SampleEffect::None);
        assert_eq!(sampler.sample(StickAxis::LeftY, -30000, true), SampleEffect::None);
    }

    // ==================== Secondary Stick Tests ====================

    #[test]
    fn test_secondary_stick_maps_to_face_buttons() {
        let mut sampler = AnalogSampler::new();

        assert_eq!(
            sampler.sample(StickAxis::RightX, 20000, true),
            SampleEffect::FacePress(LogicalButton::Circle)
        );
        assert_eq!(
            sampler.sample(StickAxis::RightX, -20000, true),
            SampleEffect::FacePress(LogicalButton::Square)
        );
        assert_eq!(
            sampler.sample(StickAxis::RightY, 20000, true),
            SampleEffect::FacePress(LogicalButton::Cross)
        );
        assert_eq!(
            sampler.sample(StickAxis::RightY, -20000, true),
            SampleEffect::FacePress(LogicalButton::Triangle)
        );
    }

    #[test]
    fn test_secondary_stick_dead_zone_is_silent() {
        let mut sampler = AnalogSampler::new();
        assert_eq!(sampler.sample(StickAxis::RightX, 100, true), SampleEffect::None);
        assert_eq!(sampler.sample(StickAxis::RightY, -8192, true), SampleEffect::None);
    }

    #[test]
    fn test_secondary_stick_never_touches_direction_flags() {
        let mut sampler = AnalogSampler::new();
        sampler.sample(StickAxis::RightX, 30000, true);
        sampler.sample(StickAxis::RightY, -30000, true);
        assert_eq!(sampler.overrides(), DirectionOverrides::default());
    }
}
