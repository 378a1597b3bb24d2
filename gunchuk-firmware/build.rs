//! Build script for gunchuk-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates gunchuk.toml at compile time
//! - Generates the extension config constants into OUT_DIR

use std::env;
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use gunchuk_core::config::{ConfigError, ExtensionConfig, PinConfig, StickCalibration};
use gunchuk_protocol::calibration::CALIBRATION_PAYLOAD_LEN;
use gunchuk_protocol::registers::IDENTIFICATION_LEN;
use gunchuk_protocol::Button;

/// Default sampling period when `[input]` is omitted
const DEFAULT_POLL_INTERVAL_MS: i64 = 2;

/// Everything gunchuk.toml supplies
struct BuildConfig {
    extension: ExtensionConfig,
    poll_interval_ms: u64,
}

fn main() {
    setup_linker();
    let config = validate_config();
    generate_config(&config);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate gunchuk.toml configuration at compile time
fn validate_config() -> BuildConfig {
    println!("cargo:rerun-if-changed=gunchuk.toml");

    let config_path = Path::new("gunchuk.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: gunchuk.toml not found!                                  ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a gunchuk.toml configuration file.        ║\n\
            ║  Please create one in the gunchuk-firmware directory.            ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read gunchuk.toml", &[e.to_string()]),
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in gunchuk.toml                      ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    let mut extension = ExtensionConfig::default();

    parse_extension(&config, &mut extension, &mut errors);
    parse_stick(&config, "x", &mut extension.stick_x, &mut extension.pins.stick_x, &mut errors);
    parse_stick(&config, "y", &mut extension.stick_y, &mut extension.pins.stick_y, &mut errors);
    parse_buttons(&config, &mut extension, &mut errors);
    extension.pins.accessory_detect = match config.get("accessory_detect") {
        Some(section) => parse_pin(section, "[accessory_detect]", false, false, &mut errors),
        None => None,
    };
    let poll_interval_ms = parse_poll_interval(&config, &mut errors);

    if !errors.is_empty() {
        fail("Invalid configuration in gunchuk.toml", &errors);
    }

    // Cross-field checks shared with the runtime config type
    if let Err(e) = extension.validate() {
        fail("Invalid configuration in gunchuk.toml", &[describe(e)]);
    }

    println!("cargo:warning=gunchuk.toml validated successfully");

    BuildConfig {
        extension,
        poll_interval_ms,
    }
}

/// Panic with a boxed list of errors
fn fail(title: &str, errors: &[String]) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        errors
            .iter()
            .map(|e| format!("║  • {:<62} ║", e))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn describe(error: ConfigError) -> String {
    match error {
        ConfigError::InvalidStickCalibration => {
            "stick calibration must satisfy min < mid < max".to_string()
        }
        ConfigError::InvalidPin(pin) => format!("GPIO{} cannot be used for this input", pin),
        ConfigError::DuplicatePin(pin) => format!("GPIO{} is assigned more than once", pin),
        other => format!("{:?}", other),
    }
}

/// Read an integer field and check its range
fn integer(
    table: &toml::Value,
    section: &str,
    key: &str,
    range: std::ops::RangeInclusive<i64>,
    errors: &mut Vec<String>,
) -> Option<i64> {
    match table.get(key) {
        Some(toml::Value::Integer(v)) if range.contains(v) => Some(*v),
        Some(toml::Value::Integer(_)) => {
            errors.push(format!(
                "{} {} must be {}-{}",
                section,
                key,
                range.start(),
                range.end()
            ));
            None
        }
        Some(_) => {
            errors.push(format!("{} {} must be an integer", section, key));
            None
        }
        None => None,
    }
}

/// Read a fixed-length array of bytes
fn byte_array<const N: usize>(
    table: &toml::Value,
    section: &str,
    key: &str,
    errors: &mut Vec<String>,
) -> Option<[u8; N]> {
    let values = match table.get(key)? {
        toml::Value::Array(values) => values,
        _ => {
            errors.push(format!("{} {} must be an array", section, key));
            return None;
        }
    };

    if values.len() != N {
        errors.push(format!("{} {} must have {} bytes", section, key, N));
        return None;
    }

    let mut out = [0u8; N];
    for (slot, value) in out.iter_mut().zip(values) {
        match value.as_integer() {
            Some(v @ 0..=255) => *slot = v as u8,
            _ => {
                errors.push(format!("{} {} entries must be 0-255", section, key));
                return None;
            }
        }
    }
    Some(out)
}

/// `[extension]`: identification and calibration overrides
fn parse_extension(
    config: &toml::Value,
    extension: &mut ExtensionConfig,
    errors: &mut Vec<String>,
) {
    let Some(section) = config.get("extension") else {
        return;
    };

    if let Some(id) =
        byte_array::<IDENTIFICATION_LEN>(section, "[extension]", "identification", errors)
    {
        extension.identification = id;
    }
    if let Some(cal) =
        byte_array::<CALIBRATION_PAYLOAD_LEN>(section, "[extension]", "calibration", errors)
    {
        extension.calibration = cal;
    }
}

/// `[stick.x]` / `[stick.y]`: ADC pin and raw range
fn parse_stick(
    config: &toml::Value,
    axis: &str,
    calibration: &mut StickCalibration,
    pin: &mut Option<u8>,
    errors: &mut Vec<String>,
) {
    let Some(section) = config.get("stick").and_then(|s| s.get(axis)) else {
        *pin = None;
        return;
    };
    let name = format!("[stick.{}]", axis);
    let adc = 0..=i64::from(gunchuk_core::config::ADC_FULL_SCALE);

    if section.get("pin").is_none() {
        errors.push(format!("{} missing 'pin'", name));
    }
    *pin = integer(section, &name, "pin", 0..=29, errors).map(|p| p as u8);

    let defaults = StickCalibration::default();
    let min = integer(section, &name, "min", adc.clone(), errors).unwrap_or(defaults.min as i64);
    let mid = integer(section, &name, "mid", adc.clone(), errors).unwrap_or(defaults.mid as i64);
    let max = integer(section, &name, "max", adc, errors).unwrap_or(defaults.max as i64);
    *calibration = StickCalibration::new(min as u16, mid as u16, max as u16);
}

/// `[button.<name>]`: one table per wired button
fn parse_buttons(config: &toml::Value, extension: &mut ExtensionConfig, errors: &mut Vec<String>) {
    extension.pins.buttons = Default::default();

    let buttons = match config.get("button") {
        Some(toml::Value::Table(t)) => t,
        Some(_) => {
            errors.push("[button] must be a table of buttons".to_string());
            return;
        }
        None => return,
    };

    for (name, section) in buttons {
        let Some(button) = Button::from_name(name) else {
            errors.push(format!("[button.{}] is not a controller button", name));
            continue;
        };
        let label = format!("[button.{}]", name);
        extension.pins.buttons[button.index()] = parse_pin(section, &label, true, true, errors);
    }
}

/// A GPIO table with `pin` and optional `inverted` / `pull_up`
fn parse_pin(
    section: &toml::Value,
    name: &str,
    inverted: bool,
    pull_up: bool,
    errors: &mut Vec<String>,
) -> Option<PinConfig> {
    if !section.is_table() {
        errors.push(format!("{} must be a table", name));
        return None;
    }

    if section.get("pin").is_none() {
        errors.push(format!("{} missing 'pin'", name));
        return None;
    }
    let pin = integer(section, name, "pin", 0..=29, errors)?;

    let flag = |key: &str, default: bool, errors: &mut Vec<String>| match section.get(key) {
        Some(toml::Value::Boolean(b)) => *b,
        Some(_) => {
            errors.push(format!("{} {} must be true or false", name, key));
            default
        }
        None => default,
    };

    Some(PinConfig {
        pin: pin as u8,
        inverted: flag("inverted", inverted, errors),
        pull_up: flag("pull_up", pull_up, errors),
    })
}

/// `[input]`: sampling period
fn parse_poll_interval(config: &toml::Value, errors: &mut Vec<String>) -> u64 {
    config
        .get("input")
        .and_then(|s| integer(s, "[input]", "poll_interval_ms", 1..=100, errors))
        .unwrap_or(DEFAULT_POLL_INTERVAL_MS) as u64
}

/// Write `gunchuk_config.rs` into OUT_DIR
fn generate_config(config: &BuildConfig) {
    let ext = &config.extension;
    let mut out = String::new();

    writeln!(out, "// Generated by build.rs from gunchuk.toml").unwrap();
    writeln!(
        out,
        "pub const IDENTIFICATION: [u8; {}] = {};",
        IDENTIFICATION_LEN,
        hex(&ext.identification)
    )
    .unwrap();
    writeln!(
        out,
        "pub const CALIBRATION: [u8; {}] = {};",
        CALIBRATION_PAYLOAD_LEN,
        hex(&ext.calibration)
    )
    .unwrap();
    writeln!(out, "pub const STICK_X: StickCalibration = {};", stick(&ext.stick_x)).unwrap();
    writeln!(out, "pub const STICK_Y: StickCalibration = {};", stick(&ext.stick_y)).unwrap();
    writeln!(out, "pub const STICK_X_PIN: Option<u8> = {:?};", ext.pins.stick_x).unwrap();
    writeln!(out, "pub const STICK_Y_PIN: Option<u8> = {:?};", ext.pins.stick_y).unwrap();

    let buttons: Vec<String> = ext.pins.buttons.iter().map(pin).collect();
    writeln!(
        out,
        "pub const BUTTON_PINS: [Option<PinConfig>; {}] = [{}];",
        buttons.len(),
        buttons.join(", ")
    )
    .unwrap();
    writeln!(
        out,
        "pub const ACCESSORY_DETECT: Option<PinConfig> = {};",
        pin(&ext.pins.accessory_detect)
    )
    .unwrap();
    writeln!(out, "pub const POLL_INTERVAL_MS: u64 = {};", config.poll_interval_ms).unwrap();

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    fs::write(out_dir.join("gunchuk_config.rs"), out).unwrap();
}

fn hex(bytes: &[u8]) -> String {
    let items: Vec<String> = bytes.iter().map(|b| format!("0x{:02X}", b)).collect();
    format!("[{}]", items.join(", "))
}

fn stick(cal: &StickCalibration) -> String {
    format!("StickCalibration::new({}, {}, {})", cal.min, cal.mid, cal.max)
}

fn pin(config: &Option<PinConfig>) -> String {
    match config {
        Some(p) => format!(
            "Some(PinConfig {{ pin: {}, inverted: {}, pull_up: {} }})",
            p.pin, p.inverted, p.pull_up
        ),
        None => "None".to_string(),
    }
}
