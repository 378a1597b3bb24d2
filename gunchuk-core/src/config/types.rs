//! Extension configuration
//!
//! Everything that differs between builds of the extension: what it
//! identifies as, what calibration it reports, and how its inputs are wired.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use gunchuk_protocol::calibration::{CALIBRATION_PAYLOAD_LEN, DEFAULT_CALIBRATION_PAYLOAD};
use gunchuk_protocol::registers::IDENTIFICATION_LEN;
use gunchuk_protocol::{CalibrationBlock, Identification};

use super::calibration::{ConfigError, StickCalibration};
use super::hardware::InputPins;

/// Extension configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExtensionConfig {
    /// Bytes served from 0xFA-0xFF
    pub identification: [u8; IDENTIFICATION_LEN],
    /// Calibration payload; checksums are derived
    pub calibration: [u8; CALIBRATION_PAYLOAD_LEN],
    /// Stick X raw range
    pub stick_x: StickCalibration,
    /// Stick Y raw range
    pub stick_y: StickCalibration,
    /// Input wiring
    pub pins: InputPins,
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        Self {
            identification: *Identification::default().as_bytes(),
            calibration: DEFAULT_CALIBRATION_PAYLOAD,
            stick_x: StickCalibration::default(),
            stick_y: StickCalibration::default(),
            pins: InputPins::default(),
        }
    }
}

impl ExtensionConfig {
    /// Identification block to serve
    pub fn identification(&self) -> Identification {
        Identification(self.identification)
    }

    /// Checksummed calibration block to serve
    pub fn calibration_block(&self) -> CalibrationBlock {
        CalibrationBlock::new(&self.calibration)
    }

    /// Whether the accessory flag is driven from a detect line
    pub fn has_accessory_detect(&self) -> bool {
        self.pins.accessory_detect.is_some()
    }

    /// Check stick ranges and pin assignments
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.stick_x.validate()?;
        self.stick_y.validate()?;
        self.pins.validate()
    }

    /// Take the stick ranges of a stored config wired the same way
    ///
    /// A stored calibration measured on other pins is ignored. Returns
    /// whether the ranges were taken.
    pub fn adopt_stick_calibration(&mut self, stored: &ExtensionConfig) -> bool {
        if stored.pins != self.pins || stored.validate().is_err() {
            return false;
        }
        self.stick_x = stored.stick_x;
        self.stick_y = stored.stick_y;
        true
    }
}
