//! Key schedule generation
//!
//! The table derivation itself is external; the core only hands over the
//! seed and key the host uploaded and stores the tables it gets back.

use gunchuk_protocol::registers::{CIPHER_KEY_LEN, CIPHER_SEED_LEN};

/// Number of entries in each cipher table
pub const TABLE_LEN: usize = 8;

/// Feedback table and substitution box derived from a seed and key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeySchedule {
    /// Added after substitution on decrypt
    pub feedback: [u8; TABLE_LEN],
    /// XOR substitution box
    pub sbox: [u8; TABLE_LEN],
}

impl KeySchedule {
    /// Build a schedule from explicit tables
    pub const fn new(feedback: [u8; TABLE_LEN], sbox: [u8; TABLE_LEN]) -> Self {
        Self { feedback, sbox }
    }
}

/// Derives cipher tables from host-supplied key material
///
/// `seed` and `key` are already reversed out of register order.
pub trait KeyScheduleGenerator {
    fn generate(
        &mut self,
        seed: &[u8; CIPHER_SEED_LEN],
        key: &[u8; CIPHER_KEY_LEN],
    ) -> KeySchedule;
}

/// Generator that yields all-zero tables, leaving traffic unobfuscated
///
/// Hosts that disable encryption before polling never notice the
/// difference.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughSchedule;

impl KeyScheduleGenerator for PassthroughSchedule {
    fn generate(
        &mut self,
        _seed: &[u8; CIPHER_SEED_LEN],
        _key: &[u8; CIPHER_KEY_LEN],
    ) -> KeySchedule {
        KeySchedule::default()
    }
}

impl<F> KeyScheduleGenerator for F
where
    F: FnMut(&[u8; CIPHER_SEED_LEN], &[u8; CIPHER_KEY_LEN]) -> KeySchedule,
{
    fn generate(
        &mut self,
        seed: &[u8; CIPHER_SEED_LEN],
        key: &[u8; CIPHER_KEY_LEN],
    ) -> KeySchedule {
        self(seed, key)
    }
}
