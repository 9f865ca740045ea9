//! Device configuration records
//!
//! One record per declared device. Every record names the controller it is
//! wired to so a single configuration can describe several boards.

use heapless::{String, Vec};
use pinbridge_hal::{I2cPins, PinAddress};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::rate::MaxFrequency;

/// Maximum length for device and controller names
pub const MAX_LABEL_LEN: usize = 32;

/// Maximum distance sensors per config
pub const MAX_DISTANCE_SENSORS: usize = 8;

/// Maximum intensity sensors per config
pub const MAX_INTENSITY_SENSORS: usize = 8;

/// Maximum keypads per config
pub const MAX_KEYPADS: usize = 4;

/// Maximum encoders per config
pub const MAX_ENCODERS: usize = 8;

/// Maximum motors per config
pub const MAX_MOTORS: usize = 8;

/// Maximum servos per config
pub const MAX_SERVOS: usize = 8;

/// Maximum LEDs per config
pub const MAX_LEDS: usize = 8;

/// Maximum displays per config
pub const MAX_OLEDS: usize = 2;

/// Default SSD1306 I2C address
pub const DEFAULT_OLED_ADDRESS: u8 = 0x3C;

/// Default encoder resolution
pub const DEFAULT_TICKS_PER_WHEEL: u16 = 20;

/// Default servo pulse bounds in microseconds
pub const DEFAULT_SERVO_MIN_PULSE_US: u16 = 544;
pub const DEFAULT_SERVO_MAX_PULSE_US: u16 = 2400;

/// Bounded device or controller name
pub type Label = String<MAX_LABEL_LEN>;

/// Ultrasonic distance sensor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DistanceConfig {
    pub name: Label,
    pub controller: Label,
    /// Trigger pin
    pub trigger: PinAddress,
    /// Echo pin
    pub echo: PinAddress,
}

/// Line/intensity sensor with an analog output, a digital output or both
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IntensityConfig {
    pub name: Label,
    pub controller: Label,
    /// Analog output pin (board numbering)
    pub analog: Option<PinAddress>,
    /// Digital output pin
    pub digital: Option<PinAddress>,
    /// Minimum change before the board reports a new analog value
    pub differential: u16,
}

/// Resistor-ladder keypad
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KeypadConfig {
    pub name: Label,
    pub controller: Label,
    /// Analog pin (board numbering)
    pub pin: PinAddress,
    /// Minimum change before the board reports a new value
    pub differential: u16,
}

/// Wheel encoder
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EncoderConfig {
    pub name: Label,
    pub controller: Label,
    /// Channel A
    pub pin: PinAddress,
    /// Channel B for quadrature encoders
    pub pin_b: Option<PinAddress>,
    pub ticks_per_wheel: u16,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            name: Label::new(),
            controller: Label::new(),
            pin: 0,
            pin_b: None,
            ticks_per_wheel: DEFAULT_TICKS_PER_WHEEL,
        }
    }
}

/// H-bridge wiring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MotorKind {
    /// Two PWM pins, one per direction
    Pp { p1: PinAddress, p2: PinAddress },
    /// PWM magnitude plus one direction pin
    Dp { p1: PinAddress, d1: PinAddress },
    /// PWM magnitude plus two direction pins
    Ddp {
        p1: PinAddress,
        d1: PinAddress,
        d2: PinAddress,
    },
}

impl Default for MotorKind {
    fn default() -> Self {
        MotorKind::Pp { p1: 0, p2: 0 }
    }
}

/// DC motor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MotorConfig {
    pub name: Label,
    pub controller: Label,
    pub kind: MotorKind,
}

/// Hobby servo
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ServoConfig {
    pub name: Label,
    pub controller: Label,
    pub pin: PinAddress,
    pub min_pulse_us: u16,
    pub max_pulse_us: u16,
}

impl Default for ServoConfig {
    fn default() -> Self {
        Self {
            name: Label::new(),
            controller: Label::new(),
            pin: 0,
            min_pulse_us: DEFAULT_SERVO_MIN_PULSE_US,
            max_pulse_us: DEFAULT_SERVO_MAX_PULSE_US,
        }
    }
}

/// PWM-dimmed LED
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LedConfig {
    pub name: Label,
    pub controller: Label,
    pub pin: PinAddress,
}

/// SSD1306 OLED on I2C
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OledConfig {
    pub name: Label,
    pub controller: Label,
    pub width: u8,
    pub height: u8,
    /// I2C port on the board
    pub port: u8,
    /// 7-bit device address
    pub address: u8,
    /// SDA pin, for boards that route I2C to configurable pins
    pub sda: Option<PinAddress>,
    /// SCL pin
    pub scl: Option<PinAddress>,
}

impl Default for OledConfig {
    fn default() -> Self {
        Self {
            name: Label::new(),
            controller: Label::new(),
            width: 128,
            height: 64,
            port: 0,
            address: DEFAULT_OLED_ADDRESS,
            sda: None,
            scl: None,
        }
    }
}

impl OledConfig {
    /// I2C pin pair, when both pins are configured
    pub fn i2c_pins(&self) -> Option<I2cPins> {
        match (self.sda, self.scl) {
            (Some(sda), Some(scl)) => Some(I2cPins { sda, scl }),
            _ => None,
        }
    }
}

/// Complete device configuration
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BridgeConfig {
    /// Publish rate for sensor streams, also sets the board scan interval
    pub max_frequency: MaxFrequency,
    pub distance: Vec<DistanceConfig, MAX_DISTANCE_SENSORS>,
    pub intensity: Vec<IntensityConfig, MAX_INTENSITY_SENSORS>,
    pub keypads: Vec<KeypadConfig, MAX_KEYPADS>,
    pub encoders: Vec<EncoderConfig, MAX_ENCODERS>,
    pub motors: Vec<MotorConfig, MAX_MOTORS>,
    pub servos: Vec<ServoConfig, MAX_SERVOS>,
    pub leds: Vec<LedConfig, MAX_LEDS>,
    pub oleds: Vec<OledConfig, MAX_OLEDS>,
}

/// Build a label, truncating names that do not fit
pub fn label(name: &str) -> Label {
    let mut out = Label::new();
    for c in name.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}
