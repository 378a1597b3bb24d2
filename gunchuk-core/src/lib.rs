//! Board-agnostic core logic for the gunchuk extension firmware
//!
//! This crate contains everything between the bus transport and the input
//! hardware that does not depend on a specific chip:
//!
//! - Register file with identification and calibration images
//! - Write and read dispatch for the extension protocol
//! - Transfer cipher state and key setup
//! - Report buffer hand-off between input scanning and the bus
//! - Configuration types and persistence
//!
//! The firmware owns one [`Extension`] and feeds it transport events:
//!
//! ```
//! use gunchuk_core::{Extension, ExtensionConfig, PassthroughSchedule};
//!
//! let mut ext = Extension::new(&ExtensionConfig::default(), PassthroughSchedule);
//! ext.on_bytes_written(&[0x00]);
//! let report = ext.on_read_requested();
//! assert_eq!(&report[..], &[0x9F, 0x1F, 0x40, 0x40, 0x3F, 0xFF]);
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod cipher;
pub mod config;
pub mod cursor;
pub mod exchange;
pub mod extension;
pub mod registers;
pub mod traits;

pub use cipher::CipherEngine;
pub use config::{ConfigError, ExtensionConfig, InputPins, PinConfig, StickCalibration};
pub use cursor::ReadCursor;
pub use exchange::{BufferExchange, ReportError};
pub use extension::{Extension, Response, MAX_TRANSFER};
pub use registers::RegisterFile;
pub use traits::{
    BufferStream, KeySchedule, KeyScheduleGenerator, NoListener, NoStream, PassthroughSchedule,
    WriteListener,
};
