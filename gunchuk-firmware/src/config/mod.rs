//! Build-time configuration
//!
//! `build.rs` validates gunchuk.toml and emits its values as constants;
//! this module turns them back into an [`ExtensionConfig`]. A stick
//! calibration saved in flash overrides the build-time ranges.

pub mod stored;

pub use stored::{apply_stored_calibration, save_config};

use gunchuk_core::config::{ExtensionConfig, InputPins, PinConfig, StickCalibration};

mod generated {
    use super::{PinConfig, StickCalibration};

    include!(concat!(env!("OUT_DIR"), "/gunchuk_config.rs"));
}

pub use generated::POLL_INTERVAL_MS;

/// Extension configuration compiled into this firmware image
pub fn extension_config() -> ExtensionConfig {
    ExtensionConfig {
        identification: generated::IDENTIFICATION,
        calibration: generated::CALIBRATION,
        stick_x: generated::STICK_X,
        stick_y: generated::STICK_Y,
        pins: InputPins {
            buttons: generated::BUTTON_PINS,
            stick_x: generated::STICK_X_PIN,
            stick_y: generated::STICK_Y_PIN,
            accessory_detect: generated::ACCESSORY_DETECT,
        },
    }
}
