//! Analog stick calibration
//!
//! Maps raw ADC readings onto the 8-bit stick axis the report carries.
//! The mapping is piecewise linear around the rest position so that a
//! stick whose center is off the ADC midpoint still reports 0x7F at rest.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use gunchuk_protocol::report::STICK_CENTER;

/// Full-scale reading of the 12-bit ADC
pub const ADC_FULL_SCALE: u16 = 4095;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Stick axis not ordered min < mid < max
    InvalidStickCalibration,
    /// GPIO number not available on the board
    InvalidPin(u8),
    /// Same GPIO assigned to two inputs
    DuplicatePin(u8),
    /// Stored config has the wrong magic or version
    VersionMismatch,
    /// Buffer too small for the serialized config
    Serialize,
    /// Stored bytes are not a valid config
    Deserialize,
}

/// Raw ADC range of one stick axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StickCalibration {
    /// Reading at full deflection toward 0x00
    pub min: u16,
    /// Reading at rest
    pub mid: u16,
    /// Reading at full deflection toward 0xFF
    pub max: u16,
}

impl Default for StickCalibration {
    fn default() -> Self {
        Self {
            min: 0,
            mid: ADC_FULL_SCALE / 2,
            max: ADC_FULL_SCALE,
        }
    }
}

impl StickCalibration {
    /// Create a calibration from measured extremes and rest point
    pub const fn new(min: u16, mid: u16, max: u16) -> Self {
        Self { min, mid, max }
    }

    /// Check the three points are strictly ordered
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min < self.mid && self.mid < self.max {
            Ok(())
        } else {
            Err(ConfigError::InvalidStickCalibration)
        }
    }

    /// Map a raw reading to the report axis, clamping outside the range
    ///
    /// An invalid calibration reports the center value.
    pub fn map(&self, raw: u16) -> u8 {
        if self.validate().is_err() {
            return STICK_CENTER;
        }

        let center = STICK_CENTER as u32;
        if raw <= self.min {
            0
        } else if raw >= self.max {
            u8::MAX
        } else if raw <= self.mid {
            let span = (self.mid - self.min) as u32;
            ((raw - self.min) as u32 * center / span) as u8
        } else {
            let span = (self.max - self.mid) as u32;
            let upper = u8::MAX as u32 - center;
            (center + (raw - self.mid) as u32 * upper / span) as u8
        }
    }
}

/// Tracks the raw range of one axis while the stick is swept
///
/// Starts from the reading taken with the stick at rest, which becomes the
/// calibration's `mid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StickSampler {
    rest: u16,
    min: u16,
    max: u16,
}

impl StickSampler {
    pub const fn new(rest: u16) -> Self {
        Self {
            rest,
            min: rest,
            max: rest,
        }
    }

    /// Widen the observed range to include `raw`
    pub fn record(&mut self, raw: u16) {
        self.min = self.min.min(raw);
        self.max = self.max.max(raw);
    }

    /// Calibration spanning everything recorded
    ///
    /// Fails if the stick was not moved to both sides of its rest point.
    pub fn finish(&self) -> Result<StickCalibration, ConfigError> {
        let calibration = StickCalibration::new(self.min, self.rest, self.max);
        calibration.validate()?;
        Ok(calibration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_endpoints() {
        let cal = StickCalibration::default();
        assert_eq!(cal.map(0), 0x00);
        assert_eq!(cal.map(cal.mid), STICK_CENTER);
        assert_eq!(cal.map(ADC_FULL_SCALE), 0xFF);
    }

    #[test]
    fn test_off_center_rest_maps_to_center() {
        let cal = StickCalibration::new(300, 1900, 3800);
        assert_eq!(cal.map(1900), STICK_CENTER);
        assert_eq!(cal.map(100), 0x00);
        assert_eq!(cal.map(4000), 0xFF);
        // Halfway down the lower half
        assert_eq!(cal.map(1100), 63);
    }

    #[test]
    fn test_monotonic() {
        let cal = StickCalibration::new(200, 2100, 3900);
        let mut prev = 0;
        for raw in (0..=ADC_FULL_SCALE).step_by(7) {
            let v = cal.map(raw);
            assert!(v >= prev);
            prev = v;
        }
    }

    #[test]
    fn test_invalid_calibration() {
        let cal = StickCalibration::new(2000, 1000, 3000);
        assert_eq!(cal.validate(), Err(ConfigError::InvalidStickCalibration));
        assert_eq!(cal.map(0), STICK_CENTER);
    }

    #[test]
    fn test_sampler_sweep() {
        let mut sampler = StickSampler::new(2050);
        for raw in [2050, 1500, 240, 900, 2600, 3870, 3100, 2049] {
            sampler.record(raw);
        }

        let cal = sampler.finish().unwrap();
        assert_eq!(cal, StickCalibration::new(240, 2050, 3870));
        assert_eq!(cal.map(2050), STICK_CENTER);
    }

    #[test]
    fn test_sampler_requires_both_sides() {
        let mut sampler = StickSampler::new(2050);
        assert_eq!(sampler.finish(), Err(ConfigError::InvalidStickCalibration));

        sampler.record(3900);
        assert_eq!(sampler.finish(), Err(ConfigError::InvalidStickCalibration));

        sampler.record(100);
        assert_eq!(sampler.finish(), Ok(StickCalibration::new(100, 2050, 3900)));
    }
}
