//! Register traffic cipher
//!
//! Transfers are obfuscated only while register 0xF0 holds 0xAA and a key
//! schedule has been built from the last completed key upload. Otherwise
//! every transform is the identity.
//!
//! For a byte at register address `a`, with `i = a % 8`:
//! - decrypt (host write): `p = (c ^ sbox[i]) + feedback[i]`
//! - encrypt (host read):  `c = (p - feedback[i]) ^ sbox[i]`

use gunchuk_protocol::registers::{
    CIPHER_CONTROL, CIPHER_ENABLE, CIPHER_KEY, CIPHER_KEY_LEN, CIPHER_SEED, CIPHER_SEED_LEN,
};

use crate::registers::RegisterFile;
use crate::traits::{KeySchedule, KeyScheduleGenerator, TABLE_LEN};

/// Cipher state rebuilt on every completed key upload
#[derive(Debug, Clone, Default)]
pub struct CipherEngine {
    schedule: KeySchedule,
    seed: [u8; CIPHER_SEED_LEN],
    key: [u8; CIPHER_KEY_LEN],
    ready: bool,
}

impl CipherEngine {
    /// Cipher with no key schedule
    pub fn new() -> Self {
        Self::default()
    }

    /// A key schedule has been built and not invalidated since
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Transfers are currently transformed
    pub fn is_active(&self, registers: &RegisterFile) -> bool {
        self.ready && registers.get(CIPHER_CONTROL) == CIPHER_ENABLE
    }

    /// Drop the key schedule until the host uploads a new key
    pub fn disable(&mut self) {
        self.ready = false;
    }

    /// Current tables
    pub fn schedule(&self) -> &KeySchedule {
        &self.schedule
    }

    /// Seed of the last completed upload, in generator order
    pub fn seed(&self) -> &[u8; CIPHER_SEED_LEN] {
        &self.seed
    }

    /// Key of the last completed upload, in generator order
    pub fn key(&self) -> &[u8; CIPHER_KEY_LEN] {
        &self.key
    }

    /// Rebuild the key schedule from registers 0x40-0x4F
    ///
    /// Both ranges are stored most-significant byte last, so they are
    /// reversed before being handed to the generator.
    pub fn setup<G: KeyScheduleGenerator>(&mut self, registers: &RegisterFile, generator: &mut G) {
        let mut seed: [u8; CIPHER_SEED_LEN] = registers.block(CIPHER_SEED);
        seed.reverse();
        let mut key: [u8; CIPHER_KEY_LEN] = registers.block(CIPHER_KEY);
        key.reverse();

        self.schedule = generator.generate(&seed, &key);
        self.seed = seed;
        self.key = key;
        self.ready = true;
    }

    /// Decrypt one byte written by the host to register `addr`
    #[inline]
    pub fn decrypt(&self, addr: u8, byte: u8) -> u8 {
        let i = addr as usize % TABLE_LEN;
        (byte ^ self.schedule.sbox[i]).wrapping_add(self.schedule.feedback[i])
    }

    /// Encrypt one byte read by the host from register `addr`
    #[inline]
    pub fn encrypt(&self, addr: u8, byte: u8) -> u8 {
        let i = addr as usize % TABLE_LEN;
        byte.wrapping_sub(self.schedule.feedback[i]) ^ self.schedule.sbox[i]
    }

    /// Encrypt an outgoing transfer in place; `data[0]` came from `addr`
    ///
    /// No-op unless the cipher is active.
    pub fn encrypt_outgoing(&self, registers: &RegisterFile, addr: u8, data: &mut [u8]) {
        if !self.is_active(registers) {
            return;
        }
        let mut curr = addr;
        for byte in data.iter_mut() {
            *byte = self.encrypt(curr, *byte);
            curr = curr.wrapping_add(1);
        }
    }
}
