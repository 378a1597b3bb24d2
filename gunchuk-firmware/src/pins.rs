//! Config-driven pin allocation
//!
//! Splits the RP2040 peripherals into the fixed extension bus (I2C0 on
//! GPIO0/GPIO1), the flash used for stored calibration, and a bank of
//! GPIOs that inputs take by number.

use embassy_rp::adc::Channel;
use embassy_rp::gpio::{AnyPin, Pull};
use embassy_rp::peripherals::{
    ADC, DMA_CH0, FLASH, I2C0, PIN_0, PIN_1, PIN_26, PIN_27, PIN_28, PIN_29,
};
use embassy_rp::{Peri, Peripherals};

use gunchuk_core::config::hardware::BUS_PINS;

/// Number of digital-only GPIOs (GPIO0-GPIO25)
const DIGITAL_PINS: usize = 26;

/// Error when requesting a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinError {
    /// Pin number out of range (0-29 valid)
    InvalidPin,
    /// Pin already taken
    AlreadyTaken,
    /// Pin carries the extension bus
    Reserved,
    /// Pin has no ADC input
    NotAnalog,
}

/// Peripherals the firmware uses, split by role
pub struct Board {
    pub i2c0: Peri<'static, I2C0>,
    pub sda: Peri<'static, PIN_0>,
    pub scl: Peri<'static, PIN_1>,
    pub adc: Peri<'static, ADC>,
    pub flash: Peri<'static, FLASH>,
    pub flash_dma: Peri<'static, DMA_CH0>,
    pub pins: PinBank,
}

impl Board {
    pub fn from_peripherals(p: Peripherals) -> Self {
        let pins = PinBank {
            digital: [
                None,
                None,
                Some(p.PIN_2.into()),
                Some(p.PIN_3.into()),
                Some(p.PIN_4.into()),
                Some(p.PIN_5.into()),
                Some(p.PIN_6.into()),
                Some(p.PIN_7.into()),
                Some(p.PIN_8.into()),
                Some(p.PIN_9.into()),
                Some(p.PIN_10.into()),
                Some(p.PIN_11.into()),
                Some(p.PIN_12.into()),
                Some(p.PIN_13.into()),
                Some(p.PIN_14.into()),
                Some(p.PIN_15.into()),
                Some(p.PIN_16.into()),
                Some(p.PIN_17.into()),
                Some(p.PIN_18.into()),
                Some(p.PIN_19.into()),
                Some(p.PIN_20.into()),
                Some(p.PIN_21.into()),
                Some(p.PIN_22.into()),
                Some(p.PIN_23.into()),
                Some(p.PIN_24.into()),
                Some(p.PIN_25.into()),
            ],
            pin26: Some(p.PIN_26),
            pin27: Some(p.PIN_27),
            pin28: Some(p.PIN_28),
            pin29: Some(p.PIN_29),
        };

        Self {
            i2c0: p.I2C0,
            sda: p.PIN_0,
            scl: p.PIN_1,
            adc: p.ADC,
            flash: p.FLASH,
            flash_dma: p.DMA_CH0,
            pins,
        }
    }
}

/// GPIOs available to inputs, taken by number
///
/// GPIO26-29 stay typed so they can still become ADC channels.
pub struct PinBank {
    digital: [Option<Peri<'static, AnyPin>>; DIGITAL_PINS],
    pin26: Option<Peri<'static, PIN_26>>,
    pin27: Option<Peri<'static, PIN_27>>,
    pin28: Option<Peri<'static, PIN_28>>,
    pin29: Option<Peri<'static, PIN_29>>,
}

impl PinBank {
    /// Take a pin for digital input
    pub fn take(&mut self, pin: u8) -> Result<Peri<'static, AnyPin>, PinError> {
        if BUS_PINS.contains(&pin) {
            return Err(PinError::Reserved);
        }
        let taken = match pin {
            26 => self.pin26.take().map(|p| p.into()),
            27 => self.pin27.take().map(|p| p.into()),
            28 => self.pin28.take().map(|p| p.into()),
            29 => self.pin29.take().map(|p| p.into()),
            n if (n as usize) < DIGITAL_PINS => self.digital[n as usize].take(),
            _ => return Err(PinError::InvalidPin),
        };
        taken.ok_or(PinError::AlreadyTaken)
    }

    /// Take a pin as an ADC channel
    pub fn take_analog(&mut self, pin: u8) -> Result<Channel<'static>, PinError> {
        let taken = match pin {
            26 => self.pin26.take().map(|p| Channel::new_pin(p, Pull::None)),
            27 => self.pin27.take().map(|p| Channel::new_pin(p, Pull::None)),
            28 => self.pin28.take().map(|p| Channel::new_pin(p, Pull::None)),
            29 => self.pin29.take().map(|p| Channel::new_pin(p, Pull::None)),
            n if n < 26 => return Err(PinError::NotAnalog),
            _ => return Err(PinError::InvalidPin),
        };
        taken.ok_or(PinError::AlreadyTaken)
    }
}
