//! Classic Controller Extension Protocol
//!
//! This crate defines the wire-level view of the extension that the console's
//! controller polls over I2C (7-bit address 0x52): the 256-byte register map
//! it reads and writes, the fixed identification and calibration blocks, and
//! the bit-packed 6-byte controller report.
//!
//! # Register Map
//!
//! ```text
//! ┌───────────┬──────────────────────────────────────────────┐
//! │ 0x00-0x05 │ live controller report                       │
//! │ 0x20-0x2F │ calibration block (copy 1, checksummed)      │
//! │ 0x30-0x3F │ calibration block (copy 2, checksummed)      │
//! │ 0x40-0x49 │ cipher seed (10 bytes)                       │
//! │ 0x4A-0x4F │ cipher key (6 bytes)                         │
//! │ 0xF0      │ cipher control (0xAA enable, 0x55 disable)   │
//! │ 0xFA-0xFF │ identification                               │
//! └───────────┴──────────────────────────────────────────────┘
//! ```
//!
//! Nothing here touches hardware; the register file and the transfer state
//! machine live in `gunchuk-core`.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod calibration;
pub mod registers;
pub mod report;

pub use calibration::{CalibrationBlock, CALIBRATION_LEN, CALIBRATION_PAYLOAD_LEN};
pub use registers::{Identification, EXTENSION_ADDRESS, REGISTER_COUNT};
pub use report::{Button, ControllerInputState, Report, BUTTON_COUNT, REPORT_LEN};
