//! Collaborator traits
//!
//! These traits define the interface between the bus-side engine and the
//! application that embeds it.

pub mod collaborator;
pub mod key_schedule;

pub use collaborator::{BufferStream, NoListener, NoStream, WriteListener};
pub use key_schedule::{KeySchedule, KeyScheduleGenerator, PassthroughSchedule, TABLE_LEN};
