//! Controller input task
//!
//! Samples the wired buttons, stick and accessory-detect line at a fixed
//! rate, encodes a report, and swaps it into the extension.
//!
//! Holding Home at power-on first runs a stick calibration sweep: the
//! stick must rest centered, then be rolled around its edges until the
//! window closes.

use defmt::*;
use embassy_rp::adc::{Adc, Async, Channel};
use embassy_rp::gpio::{Input, Pull};
use embassy_time::{Duration, Instant, Ticker};
use heapless::Vec;

use gunchuk_core::config::{ExtensionConfig, PinConfig, StickCalibration, StickSampler};
use gunchuk_protocol::{Button, ControllerInputState, Report, BUTTON_COUNT};

use crate::channels::{with_extension, StickRanges, CALIBRATION_SAVE};
use crate::pins::PinBank;

/// How long the stick is swept during calibration
const CALIBRATION_WINDOW_MS: u64 = 5000;

/// A digital input and how to read it
struct DigitalInput {
    input: Input<'static>,
    config: PinConfig,
}

impl DigitalInput {
    fn new(bank: &mut PinBank, config: PinConfig) -> Option<Self> {
        match bank.take(config.pin) {
            Ok(pin) => {
                let pull = if config.pull_up { Pull::Up } else { Pull::None };
                Some(Self {
                    input: Input::new(pin, pull),
                    config,
                })
            }
            Err(e) => {
                warn!("GPIO{} unavailable: {:?}", config.pin, e);
                None
            }
        }
    }

    fn is_active(&self) -> bool {
        self.config.is_active(self.input.is_high())
    }
}

/// One stick axis and its calibration
struct StickAxis {
    channel: Channel<'static>,
    calibration: StickCalibration,
}

impl StickAxis {
    fn new(bank: &mut PinBank, pin: Option<u8>, calibration: StickCalibration) -> Option<Self> {
        let pin = pin?;
        match bank.take_analog(pin) {
            Ok(channel) => Some(Self {
                channel,
                calibration,
            }),
            Err(e) => {
                warn!("ADC pin GPIO{} unavailable: {:?}", pin, e);
                None
            }
        }
    }

    async fn read_raw(&mut self, adc: &mut Adc<'static, Async>) -> Option<u16> {
        match adc.read(&mut self.channel).await {
            Ok(raw) => Some(raw),
            Err(e) => {
                warn!("ADC read error: {:?}", e);
                None
            }
        }
    }

    /// Read and map the axis; `None` keeps the previous value
    async fn sample(&mut self, adc: &mut Adc<'static, Async>) -> Option<u8> {
        let raw = self.read_raw(adc).await?;
        Some(self.calibration.map(raw))
    }
}

/// All controller inputs wired on this board
pub struct InputHardware {
    buttons: Vec<(Button, DigitalInput), BUTTON_COUNT>,
    stick_x: Option<StickAxis>,
    stick_y: Option<StickAxis>,
    accessory_detect: Option<DigitalInput>,
}

impl InputHardware {
    /// Claim the pins named in `config`
    ///
    /// Pins that cannot be claimed are logged and left unwired.
    pub fn new(config: &ExtensionConfig, bank: &mut PinBank) -> Self {
        let mut buttons = Vec::new();
        for button in Button::ALL {
            let Some(pin) = config.pins.button(button) else {
                continue;
            };
            if let Some(input) = DigitalInput::new(bank, *pin) {
                debug!("{:?} on GPIO{}", button, pin.pin);
                let _ = buttons.push((button, input));
            }
        }

        Self {
            buttons,
            stick_x: StickAxis::new(bank, config.pins.stick_x, config.stick_x),
            stick_y: StickAxis::new(bank, config.pins.stick_y, config.stick_y),
            accessory_detect: config
                .pins
                .accessory_detect
                .and_then(|pin| DigitalInput::new(bank, pin)),
        }
    }

    /// Whether `button` is wired and currently held
    fn is_pressed(&self, button: Button) -> bool {
        self.buttons
            .iter()
            .any(|(b, input)| *b == button && input.is_active())
    }

    /// Raw readings of both axes; `None` unless both are wired and read
    async fn read_stick_raw(&mut self, adc: &mut Adc<'static, Async>) -> Option<(u16, u16)> {
        let x = self.stick_x.as_mut()?.read_raw(adc).await?;
        let y = self.stick_y.as_mut()?.read_raw(adc).await?;
        Some((x, y))
    }

    fn set_stick_calibration(&mut self, ranges: StickRanges) {
        if let Some(axis) = self.stick_x.as_mut() {
            axis.calibration = ranges.x;
        }
        if let Some(axis) = self.stick_y.as_mut() {
            axis.calibration = ranges.y;
        }
    }

    /// Update `state` from the current pin levels and ADC readings
    async fn sample(&mut self, adc: &mut Adc<'static, Async>, state: &mut ControllerInputState) {
        for (button, input) in &self.buttons {
            state.set_button(*button, input.is_active());
        }

        if let Some(axis) = self.stick_x.as_mut() {
            if let Some(x) = axis.sample(adc).await {
                state.stick_x = x;
            }
        }
        if let Some(axis) = self.stick_y.as_mut() {
            if let Some(y) = axis.sample(adc).await {
                state.stick_y = y;
            }
        }

        if let Some(detect) = &self.accessory_detect {
            state.accessory_ready = detect.is_active();
        }
    }
}

/// Measure both stick ranges and hand them to the flash task
///
/// The first reading is the rest point. Keeps the previous ranges if the
/// stick was not swept to both sides on each axis.
async fn calibrate_sticks(
    hardware: &mut InputHardware,
    adc: &mut Adc<'static, Async>,
    interval_ms: u64,
) {
    let Some((rest_x, rest_y)) = hardware.read_stick_raw(adc).await else {
        warn!("Stick calibration needs both axes wired");
        return;
    };
    info!(
        "Stick calibration: rest at {}/{}, sweep the stick for {}ms",
        rest_x, rest_y, CALIBRATION_WINDOW_MS
    );

    let mut x = StickSampler::new(rest_x);
    let mut y = StickSampler::new(rest_y);
    let mut ticker = Ticker::every(Duration::from_millis(interval_ms));
    let deadline = Instant::now() + Duration::from_millis(CALIBRATION_WINDOW_MS);

    while Instant::now() < deadline {
        ticker.next().await;
        if let Some((raw_x, raw_y)) = hardware.read_stick_raw(adc).await {
            x.record(raw_x);
            y.record(raw_y);
        }
    }

    match (x.finish(), y.finish()) {
        (Ok(x), Ok(y)) => {
            let ranges = StickRanges { x, y };
            hardware.set_stick_calibration(ranges);
            CALIBRATION_SAVE.signal(ranges);
            info!("Stick calibration complete");
        }
        (Err(e), _) | (_, Err(e)) => {
            warn!("Stick calibration failed: {:?}, keeping previous ranges", e);
        }
    }
}

/// Input task - publishes a fresh report every poll interval
#[embassy_executor::task]
pub async fn input_task(
    mut hardware: InputHardware,
    mut adc: Adc<'static, Async>,
    interval_ms: u64,
) {
    info!(
        "Input task started: {} buttons, every {}ms",
        hardware.buttons.len(),
        interval_ms
    );

    if hardware.is_pressed(Button::Home) {
        calibrate_sticks(&mut hardware, &mut adc, interval_ms).await;
    }

    let mut ticker = Ticker::every(Duration::from_millis(interval_ms));
    let mut state = ControllerInputState::default();
    let mut last = state.clone();
    let mut spare = Report::zeroed();

    loop {
        ticker.next().await;

        hardware.sample(&mut adc, &mut state).await;

        if state != last {
            trace!("Input changed: {:?}", state);
            last.clone_from(&state);
        }

        spare = with_extension(|ext| ext.publish(&state, spare)).unwrap_or_else(Report::zeroed);
    }
}
