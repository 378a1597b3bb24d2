//! Inter-task communication channels
//!
//! Defines the shared extension state, the channel that carries
//! register-write notifications out of the bus path, and the signal that
//! hands a fresh stick calibration to the flash task.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use gunchuk_core::{
    Extension, ExtensionConfig, PassthroughSchedule, StickCalibration, WriteListener,
};

/// Channel capacity for register-write notifications
const WRITE_CHANNEL_SIZE: usize = 16;

/// A host write of `count` registers starting at `base`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegisterWrite {
    pub base: u8,
    pub count: u8,
}

/// Register writes for the host-link task
pub static REGISTER_WRITES: Channel<CriticalSectionRawMutex, RegisterWrite, WRITE_CHANNEL_SIZE> =
    Channel::new();

/// Stick ranges measured at boot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StickRanges {
    pub x: StickCalibration,
    pub y: StickCalibration,
}

/// Calibration save requests for the flash task
pub static CALIBRATION_SAVE: Signal<CriticalSectionRawMutex, StickRanges> = Signal::new();

/// Forwards write notifications into [`REGISTER_WRITES`] without blocking
#[derive(Debug, Default)]
pub struct ForwardWrites {
    dropped: u32,
}

impl ForwardWrites {
    /// Notifications lost to a full channel since the last call
    pub fn take_dropped(&mut self) -> u32 {
        core::mem::take(&mut self.dropped)
    }
}

impl WriteListener for ForwardWrites {
    fn on_register_written(&mut self, base: u8, count: u8) {
        if REGISTER_WRITES.try_send(RegisterWrite { base, count }).is_err() {
            self.dropped = self.dropped.saturating_add(1);
        }
    }
}

/// The extension as this firmware runs it
pub type Emulator = Extension<PassthroughSchedule, ForwardWrites>;

/// Shared by the bus and input tasks; each holds it for one call
static EXTENSION: Mutex<CriticalSectionRawMutex, RefCell<Option<Emulator>>> =
    Mutex::new(RefCell::new(None));

/// Bring up the extension before any task touches it
pub fn init_extension(config: &ExtensionConfig) {
    let ext = Extension::new(config, PassthroughSchedule).with_listener(ForwardWrites::default());
    EXTENSION.lock(|cell| *cell.borrow_mut() = Some(ext));
}

/// Run `f` on the extension under the lock
///
/// Returns `None` before [`init_extension`].
pub fn with_extension<R>(f: impl FnOnce(&mut Emulator) -> R) -> Option<R> {
    EXTENSION.lock(|cell| cell.borrow_mut().as_mut().map(f))
}
