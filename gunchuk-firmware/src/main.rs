//! Gunchuk - Classic Controller extension firmware
//!
//! Main firmware binary for RP2040 boards plugged into a controller's
//! extension port. The board answers on the extension bus as a Classic
//! Controller and reports its own buttons and stick.
//!
//! Configuration comes from gunchuk.toml at build time; a stick
//! calibration saved to flash replaces the configured stick ranges.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::adc::{Adc, InterruptHandler as AdcInterruptHandler};
use embassy_rp::bind_interrupts;
use embassy_rp::i2c::InterruptHandler as I2cInterruptHandler;
use embassy_rp::i2c_slave::{Config as I2cSlaveConfig, I2cSlave};
use embassy_rp::peripherals::I2C0;
use {defmt_rtt as _, panic_probe as _};

use gunchuk_protocol::EXTENSION_ADDRESS;

mod channels;
mod config;
mod flash;
mod pins;
mod tasks;

bind_interrupts!(struct Irqs {
    I2C0_IRQ => I2cInterruptHandler<I2C0>;
    ADC_IRQ_FIFO => AdcInterruptHandler;
});

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Gunchuk firmware starting...");

    let p = embassy_rp::init(Default::default());
    let board = pins::Board::from_peripherals(p);
    info!("Peripherals initialized");

    // Validated by build.rs; a failure here means the generated constants drifted
    let mut config = config::extension_config();
    if let Err(e) = config.validate() {
        error!("Embedded configuration invalid: {:?}", e);
    }

    let mut storage = flash::FlashStorage::new(board.flash, board.flash_dma);
    config::apply_stored_calibration(&mut storage, &mut config).await;
    info!(
        "Identification {:02x}, accessory detect: {}",
        config.identification,
        config.has_accessory_detect()
    );

    channels::init_extension(&config);
    info!("Extension registers initialized");

    // Extension bus: GPIO0 = SDA, GPIO1 = SCL
    let mut i2c_config = I2cSlaveConfig::default();
    i2c_config.addr = EXTENSION_ADDRESS as u16;
    let target = I2cSlave::new(board.i2c0, board.scl, board.sda, Irqs, i2c_config);
    info!("I2C target initialized");

    let mut bank = board.pins;
    let inputs = tasks::InputHardware::new(&config, &mut bank);
    let adc = Adc::new(board.adc, Irqs, embassy_rp::adc::Config::default());
    info!("Inputs initialized");

    spawner.spawn(tasks::i2c_target_task(target)).unwrap();
    spawner
        .spawn(tasks::input_task(inputs, adc, config::POLL_INTERVAL_MS))
        .unwrap();
    spawner.spawn(tasks::host_link_task()).unwrap();
    spawner.spawn(tasks::calibration_task(storage, config)).unwrap();

    info!("All tasks spawned, firmware running");

    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}
