//! Classic Controller report encoding
//!
//! The report is six bytes, bit-packed. Buttons are active-low on the wire,
//! except RT and DN in the top bits of byte 4.
//!
//! ```text
//!        7      6      5      4      3      2      1      0
//! 0  │ AZ7  │ AZ6  │                 SX<7:2>                 │
//! 1  │ AZ5  │ AZ4  │                 SY<7:2>                 │
//! 2  │ AZ3  │                    AX<7:1>                     │
//! 3  │ AZ2  │                    AY<7:1>                     │
//! 4  │ RT   │ DN   │ !ACC │ !MIN │ !HOM │ !PLS │ !AZ1 │  1   │
//! 5  │ !Z   │ !B   │ !Y   │ !A   │ !X   │ !C   │ !LT  │ !UP  │
//! ```
//!
//! The low six bits of byte 4 are XOR-flipped, so the accessory flag and the
//! accelerometer bit come out inverted as well.

/// Report length in bytes
pub const REPORT_LEN: usize = 6;

/// Number of buttons the extension reports
pub const BUTTON_COUNT: usize = 13;

/// Stick center value
pub const STICK_CENTER: u8 = 0x7F;

/// Accelerometer at rest
pub const ACCEL_CENTER: u8 = 0x80;

/// Controller buttons, in input-table order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Button {
    A = 0,
    B = 1,
    X = 2,
    Y = 3,
    Left = 4,
    Right = 5,
    Up = 6,
    Down = 7,
    Minus = 8,
    Home = 9,
    Plus = 10,
    C = 11,
    Z = 12,
}

impl Button {
    /// Every button, in input-table order
    pub const ALL: [Button; BUTTON_COUNT] = [
        Button::A,
        Button::B,
        Button::X,
        Button::Y,
        Button::Left,
        Button::Right,
        Button::Up,
        Button::Down,
        Button::Minus,
        Button::Home,
        Button::Plus,
        Button::C,
        Button::Z,
    ];

    /// Position in the input table
    pub fn index(self) -> usize {
        self as usize
    }

    /// Parse a lowercase button name as used in config files
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "a" => Some(Button::A),
            "b" => Some(Button::B),
            "x" => Some(Button::X),
            "y" => Some(Button::Y),
            "left" => Some(Button::Left),
            "right" => Some(Button::Right),
            "up" => Some(Button::Up),
            "down" => Some(Button::Down),
            "minus" => Some(Button::Minus),
            "home" => Some(Button::Home),
            "plus" => Some(Button::Plus),
            "c" => Some(Button::C),
            "z" => Some(Button::Z),
            _ => None,
        }
    }
}

/// A 6-byte controller report buffer
///
/// Moved between the application and the bus side by value.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Report([u8; REPORT_LEN]);

impl Report {
    /// All-zero report
    pub const fn zeroed() -> Self {
        Self([0; REPORT_LEN])
    }

    /// Wrap raw report bytes
    pub const fn from_bytes(bytes: [u8; REPORT_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw report bytes
    pub fn as_bytes(&self) -> &[u8; REPORT_LEN] {
        &self.0
    }

    /// Mutable access for byte-level edits
    pub fn as_bytes_mut(&mut self) -> &mut [u8; REPORT_LEN] {
        &mut self.0
    }
}

impl Default for Report {
    fn default() -> Self {
        ControllerInputState::default().encode()
    }
}

/// Live controller input, owned by the application
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControllerInputState {
    /// Stick X (0x00 left, 0xFF right)
    pub stick_x: u8,
    /// Stick Y (0x00 down, 0xFF up)
    pub stick_y: u8,
    /// Accelerometer X placeholder
    pub accel_x: u8,
    /// Accelerometer Y placeholder
    pub accel_y: u8,
    /// Accelerometer Z placeholder
    pub accel_z: u8,
    /// Secondary accessory attached and streaming
    pub accessory_ready: bool,
    buttons: [bool; BUTTON_COUNT],
}

impl Default for ControllerInputState {
    fn default() -> Self {
        Self {
            stick_x: STICK_CENTER,
            stick_y: STICK_CENTER,
            accel_x: ACCEL_CENTER,
            accel_y: ACCEL_CENTER,
            accel_z: ACCEL_CENTER,
            accessory_ready: false,
            buttons: [false; BUTTON_COUNT],
        }
    }
}

impl ControllerInputState {
    /// Set a button's pressed state
    pub fn set_button(&mut self, button: Button, pressed: bool) {
        self.buttons[button.index()] = pressed;
    }

    /// Check whether a button is held
    pub fn is_pressed(&self, button: Button) -> bool {
        self.buttons[button.index()]
    }

    /// Release every button
    pub fn release_all(&mut self) {
        self.buttons = [false; BUTTON_COUNT];
    }

    fn bit(&self, button: Button, shift: u8) -> u8 {
        (self.is_pressed(button) as u8) << shift
    }

    /// Pack this state into a fresh report
    pub fn encode(&self) -> Report {
        let mut report = Report::zeroed();
        self.encode_into(&mut report);
        report
    }

    /// Pack this state into an existing report buffer
    pub fn encode_into(&self, report: &mut Report) {
        let az = self.accel_z;
        let buf = report.as_bytes_mut();

        buf[0] = (az & 0xC0) | (self.stick_x >> 2);
        buf[1] = ((az & 0x30) << 2) | (self.stick_y >> 2);
        buf[2] = ((az & 0x08) << 4) | (self.accel_x >> 1);
        buf[3] = ((az & 0x04) << 5) | (self.accel_y >> 1);

        buf[4] = self.bit(Button::Right, 7)
            | self.bit(Button::Down, 6)
            | ((self.accessory_ready as u8) << 5)
            | self.bit(Button::Minus, 4)
            | self.bit(Button::Home, 3)
            | self.bit(Button::Plus, 2)
            | (az & 0x02);
        buf[4] ^= 0x3F;

        buf[5] = !(self.bit(Button::Z, 7)
            | self.bit(Button::B, 6)
            | self.bit(Button::Y, 5)
            | self.bit(Button::A, 4)
            | self.bit(Button::X, 3)
            | self.bit(Button::C, 2)
            | self.bit(Button::Left, 1)
            | self.bit(Button::Up, 0));
    }
}
