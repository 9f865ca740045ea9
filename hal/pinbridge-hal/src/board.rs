//! Board capability
//!
//! The [`Board`] trait is the only path from the device layer to the
//! microcontroller. Every method crosses the transport and is therefore an
//! `async` suspension point. Methods take `&self` so that any number of device
//! components can share one board handle; each call is a self-contained
//! request/response.
//!
//! Input subscriptions are expressed as input pin modes. Once a pin is in an
//! input mode the transport delivers [`PinReport`](crate::PinReport)s for it,
//! which the owner of the transport routes back to the device layer.

use crate::pin::PinAddress;

/// Outcome of a single bus request
///
/// Not all transports acknowledge writes. Only an explicit rejection counts
/// as a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WriteAck {
    /// The transport confirmed the request
    Acked,
    /// The transport reported that the request failed
    Rejected,
    /// The transport does not report success or failure
    Unacknowledged,
}

impl WriteAck {
    /// Build an acknowledgement from an optional transport status
    ///
    /// Transports that report a boolean map it through `Some`, transports
    /// that report nothing pass `None`.
    pub fn from_status(status: Option<bool>) -> Self {
        match status {
            Some(true) => WriteAck::Acked,
            Some(false) => WriteAck::Rejected,
            None => WriteAck::Unacknowledged,
        }
    }

    /// Returns true if the transport reported a failure
    pub fn is_failure(self) -> bool {
        self == WriteAck::Rejected
    }
}

/// Pin configuration requested from the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinMode {
    /// Digital input, reported on change
    DigitalInput,
    /// Digital output
    DigitalOutput,
    /// Analog input, reported when the value moves by more than `differential`
    AnalogInput {
        /// Minimum change before a new report is sent
        differential: u16,
    },
    /// PWM ("analog") output
    PwmOutput,
    /// Servo output with pulse width bounds in microseconds
    Servo {
        /// Pulse width at 0 degrees
        min_pulse_us: u16,
        /// Pulse width at 180 degrees
        max_pulse_us: u16,
    },
    /// Ultrasonic sonar; the addressed pin is the trigger
    Sonar {
        /// Echo pin
        echo: PinAddress,
    },
    /// Wheel encoder; the addressed pin is channel A
    Encoder {
        /// Channel B for quadrature encoders
        pin_b: Option<PinAddress>,
        /// Encoder ticks per wheel revolution
        ticks_per_wheel: u16,
    },
}

/// SDA/SCL pins for boards that route I2C through configurable GPIOs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct I2cPins {
    /// Data line
    pub sda: PinAddress,
    /// Clock line
    pub scl: PinAddress,
}

/// Asynchronous pin I/O capability of a telemetry-connected board
#[allow(async_fn_in_trait)]
pub trait Board {
    /// Configure a pin
    ///
    /// Input modes double as subscriptions: after the call the transport
    /// reports values for the pin.
    async fn set_pin_mode(&self, pin: PinAddress, mode: PinMode) -> WriteAck;

    /// Drive a digital output pin
    async fn digital_write(&self, pin: PinAddress, high: bool) -> WriteAck;

    /// Write a PWM duty value (0 to the board's maximum PWM value)
    async fn pwm_write(&self, pin: PinAddress, value: u16) -> WriteAck;

    /// Move a servo to an angle in degrees
    async fn servo_write(&self, pin: PinAddress, angle: u16) -> WriteAck;

    /// Release a servo pin
    async fn detach_servo(&self, pin: PinAddress) -> WriteAck;

    /// Set the interval at which the board scans its inputs
    async fn set_scan_interval(&self, interval_ms: u8) -> WriteAck;

    /// Enable an I2C port
    async fn enable_i2c(&self, port: u8, pins: Option<I2cPins>) -> WriteAck;

    /// Write bytes to a device on an I2C port
    ///
    /// # Arguments
    /// * `port` - I2C port index on the board
    /// * `address` - 7-bit I2C address
    /// * `bytes` - Bytes to write in one transaction
    async fn i2c_write(&self, port: u8, address: u8, bytes: &[u8]) -> WriteAck;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ack_from_status() {
        assert_eq!(WriteAck::from_status(Some(true)), WriteAck::Acked);
        assert_eq!(WriteAck::from_status(Some(false)), WriteAck::Rejected);
        assert_eq!(WriteAck::from_status(None), WriteAck::Unacknowledged);
    }

    #[test]
    fn test_only_rejection_is_failure() {
        assert!(WriteAck::Rejected.is_failure());
        assert!(!WriteAck::Acked.is_failure());
        assert!(!WriteAck::Unacknowledged.is_failure());
    }
}
