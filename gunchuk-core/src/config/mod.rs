//! Configuration types
//!
//! Board-agnostic configuration structures stored as postcard binary data.

pub mod calibration;
pub mod hardware;
#[cfg(feature = "serde")]
pub mod persist;
pub mod types;

pub use calibration::{ConfigError, StickCalibration, StickSampler, ADC_FULL_SCALE};
pub use hardware::{InputPins, PinConfig, GPIO_COUNT};
pub use types::ExtensionConfig;
