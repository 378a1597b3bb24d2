//! Input hardware configuration
//!
//! Which GPIO feeds which button, where the stick is wired, and whether an
//! accessory-detect line exists. Any input may be left unassigned.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use gunchuk_protocol::{Button, BUTTON_COUNT};

use super::calibration::ConfigError;

/// Number of GPIOs on the RP2040
pub const GPIO_COUNT: u8 = 30;

/// GPIOs 0 and 1 carry the extension bus
pub const BUS_PINS: [u8; 2] = [0, 1];

/// First GPIO with an ADC input (ADC0-ADC3 on GPIO26-29)
pub const FIRST_ADC_PIN: u8 = 26;

/// Pin configuration with optional inversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PinConfig {
    /// GPIO pin number (0-29 for RP2040)
    pub pin: u8,
    /// Pin is active-low (inverted)
    pub inverted: bool,
    /// Enable internal pull-up
    pub pull_up: bool,
}

impl PinConfig {
    /// Active-high input without pull
    pub const fn new(pin: u8) -> Self {
        Self {
            pin,
            inverted: false,
            pull_up: false,
        }
    }

    /// Active-low button to ground with internal pull-up
    pub const fn button(pin: u8) -> Self {
        Self {
            pin,
            inverted: true,
            pull_up: true,
        }
    }

    /// Logical level for a raw pin reading
    pub fn is_active(&self, level_high: bool) -> bool {
        level_high != self.inverted
    }
}

/// Input wiring for the whole controller
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InputPins {
    /// Button pins in input-table order
    pub buttons: [Option<PinConfig>; BUTTON_COUNT],
    /// Stick X ADC pin
    pub stick_x: Option<u8>,
    /// Stick Y ADC pin
    pub stick_y: Option<u8>,
    /// Goes active while a secondary accessory is plugged in
    pub accessory_detect: Option<PinConfig>,
}

impl Default for InputPins {
    fn default() -> Self {
        let mut buttons = [None; BUTTON_COUNT];
        buttons[Button::A.index()] = Some(PinConfig::button(15));
        Self {
            buttons,
            stick_x: Some(26),
            stick_y: Some(27),
            accessory_detect: Some(PinConfig::new(14)),
        }
    }
}

impl InputPins {
    /// Pin assigned to a button
    pub fn button(&self, button: Button) -> Option<&PinConfig> {
        self.buttons[button.index()].as_ref()
    }

    /// Every assigned GPIO number
    fn assigned(&self) -> impl Iterator<Item = u8> + '_ {
        self.buttons
            .iter()
            .flatten()
            .map(|p| p.pin)
            .chain(self.stick_x)
            .chain(self.stick_y)
            .chain(self.accessory_detect.map(|p| p.pin))
    }

    /// Reject out-of-range, bus-reserved, and doubly assigned pins
    ///
    /// Stick axes must additionally sit on an ADC-capable GPIO.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for pin in self.stick_x.iter().chain(self.stick_y.iter()) {
            if *pin < FIRST_ADC_PIN {
                return Err(ConfigError::InvalidPin(*pin));
            }
        }

        let mut seen = 0u32;
        for pin in self.assigned() {
            if pin >= GPIO_COUNT || BUS_PINS.contains(&pin) {
                return Err(ConfigError::InvalidPin(pin));
            }
            let bit = 1u32 << pin;
            if seen & bit != 0 {
                return Err(ConfigError::DuplicatePin(pin));
            }
            seen |= bit;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pins_valid() {
        let pins = InputPins::default();
        assert_eq!(pins.validate(), Ok(()));
        assert_eq!(pins.button(Button::A), Some(&PinConfig::button(15)));
        assert_eq!(pins.button(Button::B), None);
    }

    #[test]
    fn test_duplicate_pin_rejected() {
        let mut pins = InputPins::default();
        pins.buttons[Button::B.index()] = Some(PinConfig::button(15));
        assert_eq!(pins.validate(), Err(ConfigError::DuplicatePin(15)));
    }

    #[test]
    fn test_bus_pin_rejected() {
        let mut pins = InputPins::default();
        pins.stick_x = Some(0);
        assert_eq!(pins.validate(), Err(ConfigError::InvalidPin(0)));
    }

    #[test]
    fn test_out_of_range_pin_rejected() {
        let mut pins = InputPins::default();
        pins.accessory_detect = Some(PinConfig::new(30));
        assert_eq!(pins.validate(), Err(ConfigError::InvalidPin(30)));
    }

    #[test]
    fn test_stick_needs_adc_pin() {
        let mut pins = InputPins::default();
        pins.stick_y = Some(20);
        assert_eq!(pins.validate(), Err(ConfigError::InvalidPin(20)));
    }

    #[test]
    fn test_inverted_pin_level() {
        let pin = PinConfig::button(3);
        assert!(pin.is_active(false));
        assert!(!pin.is_active(true));
        assert!(PinConfig::new(3).is_active(true));
    }
}
