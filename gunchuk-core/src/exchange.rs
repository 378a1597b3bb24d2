//! Report buffer hand-off
//!
//! Exactly one [`Report`] is active and served for reads of register 0x00.
//! The application replaces it whole, either by swapping in a prepared
//! buffer or by answering the streaming hook after each read, so the bus
//! side never observes a half-written report.

use gunchuk_protocol::{Report, REPORT_LEN};

use crate::traits::{BufferStream, NoStream};

/// Errors from direct report edits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReportError {
    /// Byte index past the end of the report
    IndexOutOfRange,
}

/// Owns the active report and the optional streaming collaborator
#[derive(Debug)]
pub struct BufferExchange<S = NoStream> {
    active: Report,
    stream: S,
}

impl BufferExchange<NoStream> {
    /// Exchange serving `initial` until it is replaced
    pub fn new(initial: Report) -> Self {
        Self {
            active: initial,
            stream: NoStream,
        }
    }
}

impl<S: BufferStream> BufferExchange<S> {
    /// Install a streaming collaborator, keeping the active report
    pub fn with_stream<S2: BufferStream>(self, stream: S2) -> BufferExchange<S2> {
        BufferExchange {
            active: self.active,
            stream,
        }
    }

    /// The report the next read of 0x00 will return
    pub fn active(&self) -> &Report {
        &self.active
    }

    /// Overwrite one byte of the active report in place
    ///
    /// The caller must ensure no read of 0x00 is in flight.
    pub fn set_byte(&mut self, index: usize, value: u8) -> Result<(), ReportError> {
        let slot = self
            .active
            .as_bytes_mut()
            .get_mut(index)
            .ok_or(ReportError::IndexOutOfRange)?;
        *slot = value;
        Ok(())
    }

    /// Make `next` active and hand back the previously active report
    pub fn swap(&mut self, next: Report) -> Report {
        core::mem::replace(&mut self.active, next)
    }

    /// Called after the active report went out on the bus
    ///
    /// The streaming collaborator gets the sent buffer and decides what is
    /// served next.
    pub fn consumed(&mut self) {
        let sent = core::mem::replace(&mut self.active, Report::zeroed());
        self.active = self.stream.on_buffer_consumed(sent);
    }

    /// Copy of the active report bytes
    pub fn snapshot(&self) -> [u8; REPORT_LEN] {
        *self.active.as_bytes()
    }
}
