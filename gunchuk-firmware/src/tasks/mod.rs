//! Embassy async tasks
//!
//! Each task runs independently and shares the extension through
//! [`crate::channels`].

pub mod calibration;
pub mod host_link;
pub mod i2c_target;
pub mod input;

pub use calibration::calibration_task;
pub use host_link::host_link_task;
pub use i2c_target::i2c_target_task;
pub use input::{input_task, InputHardware};
