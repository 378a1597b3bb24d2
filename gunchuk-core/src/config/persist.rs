//! Binary config records
//!
//! A config is stored as a postcard-serialized record with a magic number
//! and version header so stale or foreign data is rejected on load.

use serde::{Deserialize, Serialize};

use super::calibration::ConfigError;
use super::types::ExtensionConfig;

/// Magic number to identify a stored config
pub const CONFIG_MAGIC: u32 = 0x474E_434B; // "GNCK"

/// Current config record version
pub const CONFIG_VERSION: u8 = 1;

/// Upper bound on a serialized record
pub const MAX_CONFIG_SIZE: usize = 128;

#[derive(Serialize, Deserialize)]
struct ConfigRecord {
    magic: u32,
    version: u8,
    config: ExtensionConfig,
}

impl ExtensionConfig {
    /// Serialize into `buf`, returning the used prefix
    pub fn to_slice<'a>(&self, buf: &'a mut [u8]) -> Result<&'a mut [u8], ConfigError> {
        let record = ConfigRecord {
            magic: CONFIG_MAGIC,
            version: CONFIG_VERSION,
            config: self.clone(),
        };
        postcard::to_slice(&record, buf).map_err(|_| ConfigError::Serialize)
    }

    /// Load and validate a stored record
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        let record: ConfigRecord =
            postcard::from_bytes(bytes).map_err(|_| ConfigError::Deserialize)?;

        if record.magic != CONFIG_MAGIC || record.version != CONFIG_VERSION {
            return Err(ConfigError::VersionMismatch);
        }

        record.config.validate()?;
        Ok(record.config)
    }
}
