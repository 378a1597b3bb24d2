//! Host link task
//!
//! Drains register-write notifications and logs what the host configured.

use defmt::*;

use gunchuk_protocol::registers::{CIPHER_CONTROL, CIPHER_KEY_END, CIPHER_SEED};

use crate::channels::{with_extension, RegisterWrite, REGISTER_WRITES};

/// Whether a write touched `reg`
fn covers(write: &RegisterWrite, reg: u8) -> bool {
    reg.wrapping_sub(write.base) < write.count
}

/// Host link task - reports host register writes
#[embassy_executor::task]
pub async fn host_link_task() {
    info!("Host link task started");

    loop {
        let write = REGISTER_WRITES.receive().await;
        debug!("Host wrote {} registers at {=u8:#x}", write.count, write.base);

        if covers(&write, CIPHER_CONTROL) {
            if let Some(value) = with_extension(|ext| ext.registers().get(CIPHER_CONTROL)) {
                info!("Cipher control set to {=u8:#x}", value);
            }
        }

        if covers(&write, CIPHER_KEY_END.wrapping_sub(1)) {
            let material = with_extension(|ext| (*ext.cipher().seed(), *ext.cipher().key()));
            if let Some((seed, key)) = material {
                info!("Key upload complete, seed {:02x}, key {:02x}", seed, key);
            }
        } else if covers(&write, CIPHER_SEED) {
            debug!("Key upload started");
        }

        let dropped = with_extension(|ext| ext.listener_mut().take_dropped()).unwrap_or(0);
        if dropped > 0 {
            warn!("{} register-write notifications dropped", dropped);
        }
    }
}
