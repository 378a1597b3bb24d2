//! Register addresses and fixed register contents.

/// 7-bit I2C address every extension answers on
pub const EXTENSION_ADDRESS: u8 = 0x52;

/// Size of the extension register space
pub const REGISTER_COUNT: usize = 0x100;

/// Live controller report
pub const REPORT: u8 = 0x00;

/// First calibration copy
pub const CALIBRATION_PRIMARY: u8 = 0x20;

/// Second calibration copy
pub const CALIBRATION_SECONDARY: u8 = 0x30;

/// Cipher seed, 10 bytes stored in reverse order
pub const CIPHER_SEED: u8 = 0x40;

/// Cipher seed length
pub const CIPHER_SEED_LEN: usize = 10;

/// Cipher key, 6 bytes stored in reverse order
pub const CIPHER_KEY: u8 = 0x4A;

/// Cipher key length
pub const CIPHER_KEY_LEN: usize = 6;

/// A write sequence whose cursor reaches this address completed the key upload
pub const CIPHER_KEY_END: u8 = 0x50;

/// Cipher control register
pub const CIPHER_CONTROL: u8 = 0xF0;

/// Written to [`CIPHER_CONTROL`] to request encrypted transfers
pub const CIPHER_ENABLE: u8 = 0xAA;

/// Written to [`CIPHER_CONTROL`] to force the cipher off
pub const CIPHER_DISABLE: u8 = 0x55;

/// Identification block
pub const IDENTIFICATION: u8 = 0xFA;

/// Identification block length
pub const IDENTIFICATION_LEN: usize = 6;

/// Extension identification bytes served from 0xFA-0xFF
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Identification(pub [u8; IDENTIFICATION_LEN]);

impl Identification {
    /// Identification the gun extension reports
    pub const GUNCHUK: Self = Self([0x00, 0x00, 0xA4, 0x20, 0x67, 0x67]);

    /// Raw identification bytes
    pub fn as_bytes(&self) -> &[u8; IDENTIFICATION_LEN] {
        &self.0
    }
}

impl Default for Identification {
    fn default() -> Self {
        Self::GUNCHUK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_ranges_are_contiguous() {
        assert_eq!(CIPHER_SEED as usize + CIPHER_SEED_LEN, CIPHER_KEY as usize);
        assert_eq!(CIPHER_KEY as usize + CIPHER_KEY_LEN, CIPHER_KEY_END as usize);
    }

    #[test]
    fn test_identification_fills_top_of_register_space() {
        assert_eq!(IDENTIFICATION as usize + IDENTIFICATION_LEN, REGISTER_COUNT);
    }

    #[test]
    fn test_default_identification() {
        assert_eq!(
            Identification::default().as_bytes(),
            &[0x00, 0x00, 0xA4, 0x20, 0x67, 0x67]
        );
    }
}
