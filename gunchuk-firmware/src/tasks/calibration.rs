//! Calibration persistence task
//!
//! Owns the flash storage after boot and saves stick calibrations measured
//! by the input task.

use defmt::*;

use gunchuk_core::ExtensionConfig;

use crate::channels::CALIBRATION_SAVE;
use crate::config::save_config;
use crate::flash::FlashStorage;

/// Calibration task - writes each new stick calibration to flash
///
/// `config` is the running config; the saved record carries its wiring so
/// a later build with different pins ignores it.
#[embassy_executor::task]
pub async fn calibration_task(mut storage: FlashStorage<'static>, mut config: ExtensionConfig) {
    info!("Calibration task started");

    loop {
        let ranges = CALIBRATION_SAVE.wait().await;
        config.stick_x = ranges.x;
        config.stick_y = ranges.y;

        match save_config(&mut storage, &config).await {
            Ok(()) => info!("Calibration saved successfully"),
            Err(e) => error!("Failed to save calibration: {:?}", e),
        }
    }
}
