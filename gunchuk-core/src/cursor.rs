//! Read cursor for multi-block register reads
//!
//! Every read request returns at most eight bytes. Hosts fetch larger ranges
//! by addressing a register once and then reading repeatedly; the cursor
//! turns those repeats into consecutive blocks.
//!
//! The block offset is a wrapping `u8`: a host that keeps reading past 0xFF
//! continues from 0x00.

/// Bytes served per read request
pub const BLOCK_LEN: u8 = 8;

/// Last register read and how far into it the host has stepped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReadCursor {
    last: Option<u8>,
    offset: u8,
}

impl ReadCursor {
    /// Cursor that has not seen any read yet
    pub const fn new() -> Self {
        Self {
            last: None,
            offset: 0,
        }
    }

    /// Current block offset
    pub fn offset(&self) -> u8 {
        self.offset
    }

    /// Record a single-block read; the next read of any register starts over
    pub fn touch(&mut self, reg: u8) {
        self.last = Some(reg);
        self.offset = 0;
    }

    /// Step through a two-block range (calibration copies)
    ///
    /// First read returns offset 0, an immediate repeat returns 8 and clears
    /// the repeat marker so the third read is back at 0.
    pub fn step_pair(&mut self, reg: u8) -> u8 {
        if self.last == Some(reg) {
            self.offset = self.offset.wrapping_add(BLOCK_LEN);
            self.last = None;
        } else {
            self.last = Some(reg);
            self.offset = 0;
        }
        reg.wrapping_add(self.offset)
    }

    /// Step through an open-ended range
    ///
    /// Every repeat advances by one block without bound.
    pub fn step(&mut self, reg: u8) -> u8 {
        if self.last == Some(reg) {
            self.offset = self.offset.wrapping_add(BLOCK_LEN);
        } else {
            self.last = Some(reg);
            self.offset = 0;
        }
        reg.wrapping_add(self.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_alternates() {
        let mut cursor = ReadCursor::new();
        assert_eq!(cursor.step_pair(0x20), 0x20);
        assert_eq!(cursor.step_pair(0x20), 0x28);
        assert_eq!(cursor.step_pair(0x20), 0x20);
        assert_eq!(cursor.step_pair(0x20), 0x28);
    }

    #[test]
    fn test_pair_resets_on_other_register() {
        let mut cursor = ReadCursor::new();
        assert_eq!(cursor.step_pair(0x20), 0x20);
        assert_eq!(cursor.step_pair(0x30), 0x30);
        assert_eq!(cursor.step_pair(0x20), 0x20);
        assert_eq!(cursor.step_pair(0x20), 0x28);
    }

    #[test]
    fn test_step_grows() {
        let mut cursor = ReadCursor::new();
        assert_eq!(cursor.step(0x40), 0x40);
        assert_eq!(cursor.step(0x40), 0x48);
        assert_eq!(cursor.step(0x40), 0x50);
        assert_eq!(cursor.offset(), 16);
    }

    #[test]
    fn test_step_wraps_past_end() {
        let mut cursor = ReadCursor::new();
        assert_eq!(cursor.step(0xF8), 0xF8);
        assert_eq!(cursor.step(0xF8), 0x00);
        assert_eq!(cursor.step(0xF8), 0x08);
    }

    #[test]
    fn test_offset_wraps_after_full_lap() {
        let mut cursor = ReadCursor::new();
        for _ in 0..32 {
            cursor.step(0x10);
        }
        // 31 repeats * 8 = 248, one more lap wraps to 0
        assert_eq!(cursor.offset(), 248);
        assert_eq!(cursor.step(0x10), 0x10);
        assert_eq!(cursor.offset(), 0);
    }

    #[test]
    fn test_touch_breaks_repeat() {
        let mut cursor = ReadCursor::new();
        cursor.step(0x40);
        cursor.touch(0x00);
        assert_eq!(cursor.step(0x40), 0x40);
    }

    #[test]
    fn test_first_read_of_ff_starts_at_zero_offset() {
        let mut cursor = ReadCursor::new();
        assert_eq!(cursor.step(0xFF), 0xFF);
    }
}
