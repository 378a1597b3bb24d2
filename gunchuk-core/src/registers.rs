//! Extension register file
//!
//! 256 byte cells addressed by a `u8`, so every access is in range by
//! construction. Multi-byte accesses that run past 0xFF wrap back to 0x00.

use gunchuk_protocol::registers::{
    CALIBRATION_PRIMARY, CALIBRATION_SECONDARY, IDENTIFICATION, REGISTER_COUNT,
};
use gunchuk_protocol::{CalibrationBlock, Identification};

/// Power-on value of every register
const ERASED: u8 = 0xFF;

/// The 256-byte register space the host reads and writes
#[derive(Clone, PartialEq, Eq)]
pub struct RegisterFile {
    cells: [u8; REGISTER_COUNT],
}

impl core::fmt::Debug for RegisterFile {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RegisterFile").finish_non_exhaustive()
    }
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new(&Identification::default(), &CalibrationBlock::default())
    }
}

impl RegisterFile {
    /// All registers erased to 0xFF
    pub const fn erased() -> Self {
        Self {
            cells: [ERASED; REGISTER_COUNT],
        }
    }

    /// Startup image: erased, then identification and both calibration copies
    pub fn new(identification: &Identification, calibration: &CalibrationBlock) -> Self {
        let mut file = Self::erased();
        file.set_range(IDENTIFICATION, identification.as_bytes());
        file.set_calibration(calibration);
        file
    }

    /// Write both calibration copies
    pub fn set_calibration(&mut self, calibration: &CalibrationBlock) {
        self.set_range(CALIBRATION_PRIMARY, calibration.as_bytes());
        self.set_range(CALIBRATION_SECONDARY, calibration.as_bytes());
    }

    /// Read a single register
    #[inline]
    pub fn get(&self, addr: u8) -> u8 {
        self.cells[addr as usize]
    }

    /// Write a single register
    #[inline]
    pub fn set(&mut self, addr: u8, value: u8) {
        self.cells[addr as usize] = value;
    }

    /// Write consecutive registers starting at `addr`
    pub fn set_range(&mut self, addr: u8, bytes: &[u8]) {
        let mut curr = addr;
        for &b in bytes {
            self.set(curr, b);
            curr = curr.wrapping_add(1);
        }
    }

    /// Fill `out` from consecutive registers starting at `addr`
    pub fn read_into(&self, addr: u8, out: &mut [u8]) {
        let mut curr = addr;
        for slot in out.iter_mut() {
            *slot = self.get(curr);
            curr = curr.wrapping_add(1);
        }
    }

    /// Copy a fixed-size block starting at `addr`
    pub fn block<const N: usize>(&self, addr: u8) -> [u8; N] {
        let mut out = [0u8; N];
        self.read_into(addr, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gunchuk_protocol::calibration::CALIBRATION_PAYLOAD_LEN;
    use proptest::prelude::*;

    #[test]
    fn test_startup_image() {
        let regs = RegisterFile::default();

        assert_eq!(regs.get(0x00), 0xFF);
        assert_eq!(regs.get(0x40), 0xFF);
        assert_eq!(regs.block::<6>(0xFA), [0x00, 0x00, 0xA4, 0x20, 0x67, 0x67]);
        assert_eq!(
            regs.block::<16>(0x20),
            *CalibrationBlock::default().as_bytes()
        );
    }

    #[test]
    fn test_set_range_wraps() {
        let mut regs = RegisterFile::erased();
        regs.set_range(0xFE, &[1, 2, 3]);
        assert_eq!(regs.get(0xFE), 1);
        assert_eq!(regs.get(0xFF), 2);
        assert_eq!(regs.get(0x00), 3);
    }

    #[test]
    fn test_read_into_wraps() {
        let mut regs = RegisterFile::erased();
        regs.set(0x00, 0x42);
        assert_eq!(regs.block::<2>(0xFF), [0xFF, 0x42]);
    }

    proptest! {
        #[test]
        fn test_calibration_copies_match(payload in any::<[u8; CALIBRATION_PAYLOAD_LEN]>()) {
            let block = CalibrationBlock::new(&payload);
            let regs = RegisterFile::new(&Identification::default(), &block);

            let primary = regs.block::<16>(CALIBRATION_PRIMARY);
            let secondary = regs.block::<16>(CALIBRATION_SECONDARY);
            let sum = payload.iter().fold(0u8, |a, &b| a.wrapping_add(b));

            prop_assert_eq!(primary, secondary);
            prop_assert_eq!(&primary[..14], &payload[..]);
            prop_assert_eq!(primary[14], sum.wrapping_add(0x55));
            prop_assert_eq!(primary[15], sum.wrapping_add(0xAA));
        }
    }
}
