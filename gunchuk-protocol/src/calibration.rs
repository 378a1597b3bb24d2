//! Calibration block encoding.
//!
//! Block format (16 bytes, stored twice at 0x20 and 0x30):
//! - PAYLOAD (14 bytes): stick/accelerometer calibration values
//! - CHECK_A (1 byte): sum of PAYLOAD + 0x55
//! - CHECK_B (1 byte): sum of PAYLOAD + 0xAA

/// Calibration payload length (without checksum)
pub const CALIBRATION_PAYLOAD_LEN: usize = 14;

/// Full calibration block length
pub const CALIBRATION_LEN: usize = CALIBRATION_PAYLOAD_LEN + 2;

/// Calibration values the gun extension ships with: ideal accelerometer
/// zero/one-g points followed by stick max/min/center.
pub const DEFAULT_CALIBRATION_PAYLOAD: [u8; CALIBRATION_PAYLOAD_LEN] = [
    0x7F, 0x7F, 0x7F, 0x00, 0xB4, 0xB4, 0xB4, 0x00, 0xFF, 0x00, 0x7F, 0xFF, 0x00, 0x7F,
];

/// A checksummed 16-byte calibration block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationBlock([u8; CALIBRATION_LEN]);

impl CalibrationBlock {
    /// Build a block from its payload, filling in both checksum bytes
    pub fn new(payload: &[u8; CALIBRATION_PAYLOAD_LEN]) -> Self {
        let sum = Self::sum(payload);

        let mut block = [0u8; CALIBRATION_LEN];
        block[..CALIBRATION_PAYLOAD_LEN].copy_from_slice(payload);
        block[CALIBRATION_PAYLOAD_LEN] = sum.wrapping_add(0x55);
        block[CALIBRATION_PAYLOAD_LEN + 1] = sum.wrapping_add(0xAA);

        Self(block)
    }

    fn sum(payload: &[u8]) -> u8 {
        payload.iter().fold(0u8, |acc, &b| acc.wrapping_add(b))
    }

    /// The 14 payload bytes
    pub fn payload(&self) -> &[u8] {
        &self.0[..CALIBRATION_PAYLOAD_LEN]
    }

    /// The complete block as stored in the register file
    pub fn as_bytes(&self) -> &[u8; CALIBRATION_LEN] {
        &self.0
    }

    /// Check that both trailing bytes match the payload
    pub fn is_valid(bytes: &[u8; CALIBRATION_LEN]) -> bool {
        let sum = Self::sum(&bytes[..CALIBRATION_PAYLOAD_LEN]);
        bytes[CALIBRATION_PAYLOAD_LEN] == sum.wrapping_add(0x55)
            && bytes[CALIBRATION_PAYLOAD_LEN + 1] == sum.wrapping_add(0xAA)
    }
}

impl Default for CalibrationBlock {
    fn default() -> Self {
        Self::new(&DEFAULT_CALIBRATION_PAYLOAD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_block_checksum() {
        let block = CalibrationBlock::default();
        // 0x7F*5 + 0xB4*3 + 0xFF*2 = 0x695
        assert_eq!(block.as_bytes()[14], 0xEA);
        assert_eq!(block.as_bytes()[15], 0x3F);
        assert!(CalibrationBlock::is_valid(block.as_bytes()));
    }

    #[test]
    fn test_zero_payload() {
        let block = CalibrationBlock::new(&[0; CALIBRATION_PAYLOAD_LEN]);
        assert_eq!(block.as_bytes()[14], 0x55);
        assert_eq!(block.as_bytes()[15], 0xAA);
    }

    #[test]
    fn test_corrupted_block_is_invalid() {
        let mut bytes = *CalibrationBlock::default().as_bytes();
        bytes[3] ^= 0x01;
        assert!(!CalibrationBlock::is_valid(&bytes));
    }

    proptest! {
        #[test]
        fn test_checksum_matches_payload_sum(payload in any::<[u8; CALIBRATION_PAYLOAD_LEN]>()) {
            let block = CalibrationBlock::new(&payload);
            let sum = payload.iter().map(|&b| b as u32).sum::<u32>();

            prop_assert_eq!(block.payload(), &payload[..]);
            prop_assert_eq!(block.as_bytes()[14] as u32, (sum + 0x55) % 256);
            prop_assert_eq!(block.as_bytes()[15] as u32, (sum + 0xAA) % 256);
        }
    }
}
