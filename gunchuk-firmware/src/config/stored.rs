//! Stored config persistence
//!
//! Loads and saves the extension config record in flash. Only the stick
//! calibration of a stored record is used; everything else comes from the
//! build-time config.

use defmt::*;

use gunchuk_core::config::persist::MAX_CONFIG_SIZE;
use gunchuk_core::config::{ConfigError, ExtensionConfig};

use crate::flash::{FlashError, FlashStorage, StorageKey};

/// Stored config persistence errors
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoredConfigError {
    /// Flash operation failed
    Flash(FlashError),
    /// Record rejected
    Config(ConfigError),
}

impl From<FlashError> for StoredConfigError {
    fn from(e: FlashError) -> Self {
        StoredConfigError::Flash(e)
    }
}

impl From<ConfigError> for StoredConfigError {
    fn from(e: ConfigError) -> Self {
        StoredConfigError::Config(e)
    }
}

/// Apply a stored stick calibration to `config`
///
/// Keeps the build-time ranges if nothing is stored, the record is invalid,
/// or it was measured on different wiring.
pub async fn apply_stored_calibration(
    storage: &mut FlashStorage<'_>,
    config: &mut ExtensionConfig,
) {
    match load_inner(storage).await {
        Ok(stored) => {
            if config.adopt_stick_calibration(&stored) {
                info!("Loaded stick calibration from flash");
                log_stick_summary(config);
            } else {
                warn!("Stored stick calibration does not match this wiring, ignoring");
            }
        }
        Err(StoredConfigError::Flash(FlashError::NotFound)) => {
            debug!("No stored config in flash, using build-time calibration");
        }
        Err(e) => {
            warn!(
                "Failed to load stored config: {:?}, using build-time calibration",
                e
            );
        }
    }
}

async fn load_inner(
    storage: &mut FlashStorage<'_>,
) -> Result<ExtensionConfig, StoredConfigError> {
    let mut buffer = [0u8; MAX_CONFIG_SIZE];
    let len = storage.read(StorageKey::ExtensionConfig, &mut buffer).await?;

    debug!("Read {} bytes of config from flash", len);

    Ok(ExtensionConfig::from_bytes(&buffer[..len])?)
}

/// Save `config` to flash
pub async fn save_config(
    storage: &mut FlashStorage<'_>,
    config: &ExtensionConfig,
) -> Result<(), StoredConfigError> {
    let mut buffer = [0u8; MAX_CONFIG_SIZE];
    let bytes = config.to_slice(&mut buffer)?;

    debug!("Saving {} bytes of config to flash", bytes.len());

    storage.write(StorageKey::ExtensionConfig, bytes).await?;

    info!("Saved stick calibration to flash");
    log_stick_summary(config);

    Ok(())
}

fn log_stick_summary(config: &ExtensionConfig) {
    debug!(
        "  X: {}/{}/{}  Y: {}/{}/{}",
        config.stick_x.min,
        config.stick_x.mid,
        config.stick_x.max,
        config.stick_y.min,
        config.stick_y.mid,
        config.stick_y.max,
    );
}
