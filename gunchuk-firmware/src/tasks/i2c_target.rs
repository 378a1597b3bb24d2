//! Extension bus task
//!
//! Answers the host on I2C0 as the extension at 0x52 and turns each bus
//! transaction into one call on the shared extension.

use defmt::*;
use embassy_rp::i2c_slave::{Command, Error, I2cSlave};
use embassy_rp::peripherals::I2C0;

use gunchuk_protocol::EXTENSION_ADDRESS;

use crate::channels::with_extension;

/// Largest host write we accept (register byte + payload)
const RX_BUF_SIZE: usize = 32;

/// Returned for bytes the host clocks out past the response
const FILL_BYTE: u8 = 0xFF;

/// I2C target task - receives host writes and serves host reads
#[embassy_executor::task]
pub async fn i2c_target_task(mut target: I2cSlave<'static, I2C0>) {
    info!("I2C target task started at {=u8:#x}", EXTENSION_ADDRESS);

    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        match target.listen(&mut buf).await {
            Ok(Command::Write(len)) => {
                trace!("Write: {:02x}", &buf[..len]);
                handle_write(&buf[..len]);
            }
            Ok(Command::WriteRead(len)) => {
                trace!("Write-read: {:02x}", &buf[..len]);
                handle_write(&buf[..len]);
                respond(&mut target).await;
            }
            Ok(Command::Read) => {
                respond(&mut target).await;
            }
            Ok(Command::GeneralCall(len)) => {
                debug!("Ignoring general call ({} bytes)", len);
            }
            Err(Error::PartialWrite(len)) => {
                warn!("Host write overflowed buffer, {} bytes kept", len);
                handle_write(&buf[..len.min(RX_BUF_SIZE)]);
            }
            Err(e) => {
                warn!("I2C error: {:?}", e);
            }
        }
    }
}

/// Store a host write and report cipher transitions
fn handle_write(bytes: &[u8]) {
    let transition = with_extension(|ext| {
        let was_encrypted = ext.is_encrypted();
        ext.on_bytes_written(bytes);
        (was_encrypted, ext.is_encrypted())
    });

    match transition {
        Some((false, true)) => info!("Encryption enabled"),
        Some((true, false)) => info!("Encryption disabled"),
        Some(_) => {}
        None => warn!("Write before extension init, dropped"),
    }
}

/// Serve the selected register to a pending host read
async fn respond(target: &mut I2cSlave<'static, I2C0>) {
    let Some(response) = with_extension(|ext| ext.on_read_requested()) else {
        warn!("Read before extension init");
        return;
    };
    match target.respond_and_fill(&response, FILL_BYTE).await {
        Ok(_) => trace!("Read: {:02x}", &response[..]),
        Err(e) => warn!("I2C read error: {:?}", e),
    }
}
