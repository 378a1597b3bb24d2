//! Application-side collaborators invoked from the bus event context
//!
//! Implementations run inside the transport callback, so they must be
//! short and must not block.

use gunchuk_protocol::Report;

/// Receives notice of register ranges the host has written
pub trait WriteListener {
    /// `count` bytes were stored starting at `base`
    fn on_register_written(&mut self, base: u8, count: u8);
}

/// Supplies the next report after each read of register 0x00
pub trait BufferStream {
    /// `sent` has just gone out on the bus; return the buffer to serve next
    ///
    /// Returning `sent` unchanged keeps serving the same report.
    fn on_buffer_consumed(&mut self, sent: Report) -> Report;
}

/// No-op write listener
#[derive(Debug, Clone, Copy, Default)]
pub struct NoListener;

impl WriteListener for NoListener {
    fn on_register_written(&mut self, _base: u8, _count: u8) {}
}

/// No streaming; the active buffer stays until swapped
#[derive(Debug, Clone, Copy, Default)]
pub struct NoStream;

impl BufferStream for NoStream {
    fn on_buffer_consumed(&mut self, sent: Report) -> Report {
        sent
    }
}

impl<F: FnMut(u8, u8)> WriteListener for F {
    fn on_register_written(&mut self, base: u8, count: u8) {
        self(base, count)
    }
}

impl<F: FnMut(Report) -> Report> BufferStream for F {
    fn on_buffer_consumed(&mut self, sent: Report) -> Report {
        self(sent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_stream_returns_sent_buffer() {
        let sent = Report::from_bytes([1, 2, 3, 4, 5, 6]);
        assert_eq!(NoStream.on_buffer_consumed(sent.clone()), sent);
    }

    #[test]
    fn test_closure_listener() {
        let mut seen = None;
        {
            let mut listener = |base: u8, count: u8| seen = Some((base, count));
            listener.on_register_written(0x40, 6);
        }
        assert_eq!(seen, Some((0x40, 6)));
    }
}
