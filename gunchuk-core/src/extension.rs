//! Extension transfer engine
//!
//! Owns the register file, cipher state, read cursor, and active report, and
//! turns transport events into register updates and read responses.
//!
//! # Write events
//!
//! ```text
//! [addr]               -> select register for the next read
//! [addr, d0, d1, ...]  -> store d0.. at addr.. (decrypted if active)
//! ```
//!
//! # Read events
//!
//! | selected   | response                                          |
//! |------------|---------------------------------------------------|
//! | 0x00       | active report, then streaming hook                |
//! | 0xFA       | identification block                              |
//! | 0x20, 0x30 | 8-byte halves, alternating 0 / +8                 |
//! | other      | 8-byte blocks, +8 per repeat, wrapping at 0xFF    |
//!
//! Nothing here can fail: malformed or unexpected traffic is absorbed and
//! answered with whatever the registers hold.

use heapless::Vec;

use gunchuk_protocol::registers::{
    CALIBRATION_PRIMARY, CALIBRATION_SECONDARY, CIPHER_CONTROL, CIPHER_DISABLE, CIPHER_KEY_END,
    IDENTIFICATION, IDENTIFICATION_LEN, REPORT,
};
use gunchuk_protocol::{ControllerInputState, Report};

use crate::cipher::CipherEngine;
use crate::config::ExtensionConfig;
use crate::cursor::{ReadCursor, BLOCK_LEN};
use crate::exchange::{BufferExchange, ReportError};
use crate::registers::RegisterFile;
use crate::traits::{BufferStream, KeyScheduleGenerator, NoListener, NoStream, WriteListener};

/// Largest transfer in either direction
pub const MAX_TRANSFER: usize = 8;

/// Bytes returned for one read request
pub type Response = Vec<u8, MAX_TRANSFER>;

/// Emulated extension
pub struct Extension<G, W = NoListener, S = NoStream> {
    registers: RegisterFile,
    cipher: CipherEngine,
    cursor: ReadCursor,
    selected: u8,
    exchange: BufferExchange<S>,
    generator: G,
    listener: W,
}

impl<G: KeyScheduleGenerator> Extension<G> {
    /// Bring up the extension in its power-on state
    ///
    /// Registers are erased, identification and calibration written, the
    /// cipher requested off, and the default input encoded as the first
    /// report.
    pub fn new(config: &ExtensionConfig, generator: G) -> Self {
        let mut registers =
            RegisterFile::new(&config.identification(), &config.calibration_block());
        registers.set(CIPHER_CONTROL, CIPHER_DISABLE);

        Self {
            registers,
            cipher: CipherEngine::new(),
            cursor: ReadCursor::new(),
            selected: REPORT,
            exchange: BufferExchange::new(ControllerInputState::default().encode()),
            generator,
            listener: NoListener,
        }
    }
}

impl<G, W, S> Extension<G, W, S>
where
    G: KeyScheduleGenerator,
    W: WriteListener,
    S: BufferStream,
{
    /// Replace the write listener
    pub fn with_listener<W2: WriteListener>(self, listener: W2) -> Extension<G, W2, S> {
        Extension {
            registers: self.registers,
            cipher: self.cipher,
            cursor: self.cursor,
            selected: self.selected,
            exchange: self.exchange,
            generator: self.generator,
            listener,
        }
    }

    /// Install a streaming collaborator for the report buffer
    pub fn with_stream<S2: BufferStream>(self, stream: S2) -> Extension<G, W, S2> {
        Extension {
            registers: self.registers,
            cipher: self.cipher,
            cursor: self.cursor,
            selected: self.selected,
            exchange: self.exchange.with_stream(stream),
            generator: self.generator,
            listener: self.listener,
        }
    }

    /// Handle one bus write: `bytes[0]` is the register, the rest is data
    pub fn on_bytes_written(&mut self, bytes: &[u8]) {
        let Some((&addr, data)) = bytes.split_first() else {
            return;
        };

        if data.is_empty() {
            self.selected = addr;
            return;
        }

        let mut curr = addr;
        let mut key_uploaded = false;

        for &byte in data {
            if addr == CIPHER_CONTROL && byte == CIPHER_DISABLE {
                self.cipher.disable();
            }

            let value = if self.cipher.is_active(&self.registers) {
                self.cipher.decrypt(curr, byte)
            } else {
                byte
            };
            self.registers.set(curr, value);

            curr = curr.wrapping_add(1);
            if curr == CIPHER_KEY_END {
                key_uploaded = true;
            }
        }

        self.listener.on_register_written(addr, data.len() as u8);

        if key_uploaded {
            self.cipher.setup(&self.registers, &mut self.generator);
        }
    }

    /// Handle one bus read of the selected register
    pub fn on_read_requested(&mut self) -> Response {
        let reg = self.selected;

        let (start, len) = match reg {
            REPORT => return self.read_report(),
            IDENTIFICATION => {
                self.cursor.touch(reg);
                (reg, IDENTIFICATION_LEN)
            }
            CALIBRATION_PRIMARY | CALIBRATION_SECONDARY => {
                (self.cursor.step_pair(reg), BLOCK_LEN as usize)
            }
            _ => (self.cursor.step(reg), BLOCK_LEN as usize),
        };

        let mut block = [0u8; MAX_TRANSFER];
        let block = &mut block[..len];
        self.registers.read_into(start, block);
        self.cipher.encrypt_outgoing(&self.registers, start, block);

        to_response(block)
    }

    /// Serve the active report, then let the streaming hook replace it
    fn read_report(&mut self) -> Response {
        self.cursor.touch(REPORT);

        let mut report = self.exchange.snapshot();
        self.cipher.encrypt_outgoing(&self.registers, REPORT, &mut report);
        self.exchange.consumed();

        to_response(&report)
    }

    /// Make `next` the served report, returning the one it replaces
    pub fn swap_report(&mut self, next: Report) -> Report {
        self.exchange.swap(next)
    }

    /// Overwrite one byte of the served report in place
    ///
    /// Only safe while no read of register 0x00 can be in progress.
    pub fn set_report_byte(&mut self, index: usize, value: u8) -> Result<(), ReportError> {
        self.exchange.set_byte(index, value)
    }

    /// Encode `input` into `spare` and swap it in
    ///
    /// Returns the previously served buffer for reuse on the next update.
    pub fn publish(&mut self, input: &ControllerInputState, mut spare: Report) -> Report {
        input.encode_into(&mut spare);
        self.swap_report(spare)
    }

    /// The report the next read of 0x00 returns
    pub fn active_report(&self) -> &Report {
        self.exchange.active()
    }

    /// Register selected by the last address-only write
    pub fn selected_register(&self) -> u8 {
        self.selected
    }

    /// Register contents
    pub fn registers(&self) -> &RegisterFile {
        &self.registers
    }

    /// Cipher state
    pub fn cipher(&self) -> &CipherEngine {
        &self.cipher
    }

    /// Whether transfers are currently encrypted
    pub fn is_encrypted(&self) -> bool {
        self.cipher.is_active(&self.registers)
    }

    /// Mutable access to the write listener
    pub fn listener_mut(&mut self) -> &mut W {
        &mut self.listener
    }
}

/// Copy a read block into a response
///
/// Every read path yields at most `MAX_TRANSFER` bytes, so the fallback is
/// never taken.
fn to_response(bytes: &[u8]) -> Response {
    Response::from_slice(bytes).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gunchuk_protocol::registers::{CIPHER_ENABLE, CIPHER_KEY, CIPHER_SEED};
    use gunchuk_protocol::{Button, CalibrationBlock, REPORT_LEN};
    use proptest::prelude::*;

    use crate::traits::{KeySchedule, PassthroughSchedule};

    const NEUTRAL: [u8; 6] = [0x9F, 0x1F, 0x40, 0x40, 0x3F, 0xFF];

    const SCHEDULE: KeySchedule = KeySchedule::new(
        [0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88],
        [0xA1, 0xB2, 0xC3, 0xD4, 0xE5, 0xF6, 0x07, 0x18],
    );

    fn extension() -> Extension<PassthroughSchedule> {
        Extension::new(&ExtensionConfig::default(), PassthroughSchedule)
    }

    fn fixed(_: &[u8; 10], _: &[u8; 6]) -> KeySchedule {
        SCHEDULE
    }

    /// Upload key material and enable the cipher, as a host handshake does
    fn keyed() -> Extension<fn(&[u8; 10], &[u8; 6]) -> KeySchedule> {
        let mut ext = Extension::new(
            &ExtensionConfig::default(),
            fixed as fn(&[u8; 10], &[u8; 6]) -> KeySchedule,
        );
        ext.on_bytes_written(&[CIPHER_CONTROL, CIPHER_ENABLE]);
        ext.on_bytes_written(&[0x40, 0, 1, 2, 3, 4, 5]);
        ext.on_bytes_written(&[0x46, 6, 7, 8, 9, 10, 11]);
        ext.on_bytes_written(&[0x4C, 12, 13, 14, 15]);
        ext
    }

    fn read<G, W, S>(ext: &mut Extension<G, W, S>, reg: u8) -> Response
    where
        G: KeyScheduleGenerator,
        W: WriteListener,
        S: BufferStream,
    {
        ext.on_bytes_written(&[reg]);
        ext.on_read_requested()
    }

    #[test]
    fn test_power_on_state() {
        let ext = extension();
        assert_eq!(ext.registers().get(CIPHER_CONTROL), CIPHER_DISABLE);
        assert_eq!(ext.active_report().as_bytes(), &NEUTRAL);
        assert!(!ext.is_encrypted());
        assert_eq!(ext.registers().get(0x00), 0xFF);
    }

    #[test]
    fn test_report_read() {
        let mut ext = extension();
        assert_eq!(&read(&mut ext, 0x00)[..], &NEUTRAL);
    }

    #[test]
    fn test_identification_read() {
        let mut ext = extension();
        assert_eq!(&read(&mut ext, 0xFA)[..], &[0x00, 0x00, 0xA4, 0x20, 0x67, 0x67]);
    }

    #[test]
    fn test_calibration_halves_alternate() {
        let mut ext = extension();
        let block = *CalibrationBlock::default().as_bytes();

        ext.on_bytes_written(&[0x20]);
        assert_eq!(&ext.on_read_requested()[..], &block[0..8]);
        assert_eq!(&ext.on_read_requested()[..], &block[8..16]);
        assert_eq!(&ext.on_read_requested()[..], &block[0..8]);
    }

    #[test]
    fn test_interleaved_read_resets_calibration() {
        let mut ext = extension();
        let block = *CalibrationBlock::default().as_bytes();

        assert_eq!(&read(&mut ext, 0x30)[..], &block[0..8]);
        read(&mut ext, 0x00);
        assert_eq!(&read(&mut ext, 0x30)[..], &block[0..8]);
        assert_eq!(&read(&mut ext, 0x30)[..], &block[8..16]);
    }

    #[test]
    fn test_generic_read_steps_and_wraps() {
        let mut ext = extension();
        ext.on_bytes_written(&[0xF0, 1, 2, 3, 4, 5, 6, 7]);
        ext.on_bytes_written(&[0xF7, 8]);
        ext.on_bytes_written(&[0x00, 9]);

        ext.on_bytes_written(&[0xF0]);
        assert_eq!(&ext.on_read_requested()[..], &[1, 2, 3, 4, 5, 6, 7, 8]);

        // 0xF8.. runs into the identification block and past 0xFF
        let wrapped = ext.on_read_requested();
        assert_eq!(&wrapped[..], &[0xFF, 0xFF, 0x00, 0x00, 0xA4, 0x20, 0x67, 0x67]);

        let third = ext.on_read_requested();
        assert_eq!(third[0], 9);
    }

    #[test]
    fn test_response_lengths() {
        let mut ext = keyed();
        assert_eq!(read(&mut ext, 0x00).len(), REPORT_LEN);
        assert_eq!(read(&mut ext, 0xFA).len(), IDENTIFICATION_LEN);
        assert_eq!(read(&mut ext, 0x20).len(), MAX_TRANSFER);
        assert_eq!(read(&mut ext, 0x40).len(), MAX_TRANSFER);
        assert_eq!(read(&mut ext, 0xFF).len(), MAX_TRANSFER);
    }

    #[test]
    fn test_address_only_write_stores_nothing() {
        let mut ext = extension();
        let before = ext.registers().clone();
        ext.on_bytes_written(&[0x42]);
        ext.on_bytes_written(&[]);
        assert_eq!(ext.registers(), &before);
        assert_eq!(ext.selected_register(), 0x42);
    }

    #[test]
    fn test_data_write_keeps_selection() {
        let mut ext = extension();
        ext.on_bytes_written(&[0xFA]);
        ext.on_bytes_written(&[0x10, 0xAB]);
        assert_eq!(ext.selected_register(), 0xFA);
        assert_eq!(ext.registers().get(0x10), 0xAB);
    }

    #[test]
    fn test_listener_sees_base_and_count() {
        let mut log: heapless::Vec<(u8, u8), 4> = heapless::Vec::new();
        {
            let mut ext = extension().with_listener(|base: u8, count: u8| {
                let _ = log.push((base, count));
            });
            ext.on_bytes_written(&[0x40, 1, 2, 3]);
            ext.on_bytes_written(&[0x40]);
            ext.on_bytes_written(&[0xF0, 0x55]);
        }
        assert_eq!(&log[..], &[(0x40, 3), (0xF0, 1)]);
    }

    #[test]
    fn test_key_upload_fires_once_per_sequence() {
        let mut calls = 0;
        let mut ext = Extension::new(&ExtensionConfig::default(), |_: &[u8; 10], _: &[u8; 6]| {
            calls += 1;
            KeySchedule::default()
        });

        ext.on_bytes_written(&[0x40, 0, 1, 2, 3, 4, 5]);
        ext.on_bytes_written(&[0x46, 6, 7, 8, 9, 10, 11]);
        assert!(!ext.cipher().is_ready());

        ext.on_bytes_written(&[0x4C, 12, 13, 14, 15]);
        assert!(ext.cipher().is_ready());

        // Overlapping rewrite of the tail reaches 0x50 again
        ext.on_bytes_written(&[0x4E, 14, 15]);
        // Write past 0x50 without reaching it from below
        ext.on_bytes_written(&[0x50, 1, 2]);
        drop(ext);
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_key_material_passed_reversed() {
        let mut seen = None;
        let mut ext = Extension::new(
            &ExtensionConfig::default(),
            |seed: &[u8; 10], key: &[u8; 6]| {
                seen = Some((*seed, *key));
                KeySchedule::default()
            },
        );
        ext.on_bytes_written(&[0x40, 0, 1, 2, 3, 4, 5]);
        ext.on_bytes_written(&[0x46, 6, 7, 8, 9, 10, 11]);
        ext.on_bytes_written(&[0x4C, 12, 13, 14, 15]);
        drop(ext);

        assert_eq!(
            seen,
            Some(([9, 8, 7, 6, 5, 4, 3, 2, 1, 0], [15, 14, 13, 12, 11, 10]))
        );
    }

    #[test]
    fn test_encrypted_report_read() {
        let mut ext = keyed();
        assert!(ext.is_encrypted());

        let response = read(&mut ext, 0x00);
        for (i, (&c, &p)) in response.iter().zip(NEUTRAL.iter()).enumerate() {
            assert_eq!(ext.cipher().decrypt(i as u8, c), p);
        }
    }

    #[test]
    fn test_encrypted_write_is_decrypted() {
        let mut ext = keyed();
        let cipher = ext.cipher().clone();
        let plain = [0x10, 0x20, 0x30];
        let mut wire = [0x60u8; 4];
        for (i, &p) in plain.iter().enumerate() {
            wire[i + 1] = cipher.encrypt(0x60 + i as u8, p);
        }

        ext.on_bytes_written(&wire);
        assert_eq!(ext.registers().block::<3>(0x60), plain);
    }

    #[test]
    fn test_encrypted_block_read_uses_block_address() {
        let mut ext = keyed();
        let cipher = ext.cipher().clone();

        ext.on_bytes_written(&[0x20]);
        ext.on_read_requested();
        let second = ext.on_read_requested();

        let block = CalibrationBlock::default();
        for (i, &c) in second.iter().enumerate() {
            let addr = 0x28 + i as u8;
            assert_eq!(cipher.decrypt(addr, c), block.as_bytes()[8 + i]);
        }
    }

    #[test]
    fn test_disable_byte_clears_ready_before_decrypt() {
        let mut ext = keyed();
        ext.on_bytes_written(&[CIPHER_CONTROL, CIPHER_DISABLE]);

        assert!(!ext.cipher().is_ready());
        // Stored raw: the cipher was dropped before this byte was handled
        assert_eq!(ext.registers().get(CIPHER_CONTROL), CIPHER_DISABLE);
        assert_eq!(&read(&mut ext, 0x00)[..], &NEUTRAL);
    }

    #[test]
    fn test_reenable_requires_new_key() {
        let mut ext = keyed();
        ext.on_bytes_written(&[CIPHER_CONTROL, CIPHER_DISABLE]);
        ext.on_bytes_written(&[CIPHER_CONTROL, CIPHER_ENABLE]);
        assert!(!ext.is_encrypted());

        ext.on_bytes_written(&[0x4C, 12, 13, 14, 15]);
        assert!(ext.is_encrypted());
    }

    #[test]
    fn test_flag_off_keeps_schedule() {
        let mut ext = keyed();
        // 0xF0 overwritten through a write not based at 0xF0
        let cipher = ext.cipher().clone();
        let wire = [0xEF, cipher.encrypt(0xEF, 0x00), cipher.encrypt(0xF0, 0x00)];
        ext.on_bytes_written(&wire);

        assert!(ext.cipher().is_ready());
        assert!(!ext.is_encrypted());
        assert_eq!(&read(&mut ext, 0x00)[..], &NEUTRAL);
    }

    #[test]
    fn test_swap_serves_new_report() {
        let mut ext = extension();
        let next = Report::from_bytes([1, 2, 3, 4, 5, 6]);

        let old = ext.swap_report(next);
        assert_eq!(old.as_bytes(), &NEUTRAL);
        assert_eq!(&read(&mut ext, 0x00)[..], &[1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_swap_preempts_stream() {
        let mut ext = extension().with_stream(|_sent: Report| Report::from_bytes([0xEE; 6]));

        assert_eq!(&read(&mut ext, 0x00)[..], &NEUTRAL);
        assert_eq!(ext.active_report().as_bytes(), &[0xEE; 6]);

        let old = ext.swap_report(Report::from_bytes([0x11; 6]));
        assert_eq!(old.as_bytes(), &[0xEE; 6]);
        assert_eq!(&read(&mut ext, 0x00)[..], &[0x11; 6]);
        assert_eq!(ext.active_report().as_bytes(), &[0xEE; 6]);
    }

    #[test]
    fn test_stream_not_called_for_other_reads() {
        let mut calls = 0;
        {
            let mut ext = extension().with_stream(|sent: Report| {
                calls += 1;
                sent
            });
            read(&mut ext, 0xFA);
            read(&mut ext, 0x20);
            read(&mut ext, 0x00);
        }
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_set_report_byte() {
        let mut ext = extension();
        ext.set_report_byte(5, 0x00).unwrap();
        assert_eq!(read(&mut ext, 0x00)[5], 0x00);
        assert_eq!(ext.set_report_byte(6, 0), Err(ReportError::IndexOutOfRange));
    }

    #[test]
    fn test_publish_encodes_and_returns_spare() {
        let mut ext = extension();
        let mut input = ControllerInputState::default();
        input.set_button(Button::A, true);

        let spare = ext.publish(&input, Report::zeroed());
        assert_eq!(spare.as_bytes(), &NEUTRAL);
        assert_eq!(read(&mut ext, 0x00)[5], !0x10);
    }

    #[test]
    fn test_pre_handshake_reads_are_plain() {
        let mut ext = Extension::new(&ExtensionConfig::default(), fixed);
        // Flag set but no key uploaded yet
        ext.on_bytes_written(&[CIPHER_CONTROL, 0xAA]);
        assert_eq!(&read(&mut ext, 0x00)[..], &NEUTRAL);
    }

    #[test]
    fn test_seed_and_key_registers_hold_plain_bytes() {
        let ext = keyed();
        assert_eq!(ext.registers().block::<3>(CIPHER_SEED), [0, 1, 2]);
        assert_eq!(ext.registers().get(CIPHER_KEY), 10);
    }

    proptest! {
        #[test]
        fn test_any_traffic_is_absorbed(
            events in proptest::collection::vec(
                proptest::collection::vec(any::<u8>(), 0..8),
                0..64,
            ),
            reads in proptest::collection::vec(any::<bool>(), 64),
        ) {
            let mut ext = keyed();
            for (event, &do_read) in events.iter().zip(reads.iter()) {
                ext.on_bytes_written(event);
                if do_read {
                    let response = ext.on_read_requested();
                    prop_assert!(response.len() <= MAX_TRANSFER);
                }
            }
        }

        #[test]
        fn test_cipher_roundtrip_through_registers(
            addr in 0x50u8..0xE9,
            data in any::<[u8; 7]>(),
        ) {
            let mut ext = keyed();
            let cipher = ext.cipher().clone();

            let mut wire = [addr; 8];
            for (i, &p) in data.iter().enumerate() {
                wire[i + 1] = cipher.encrypt(addr.wrapping_add(i as u8), p);
            }
            ext.on_bytes_written(&wire);

            let mut stored = [0u8; 7];
            ext.registers().read_into(addr, &mut stored);
            prop_assert_eq!(stored, data);
        }
    }
}
