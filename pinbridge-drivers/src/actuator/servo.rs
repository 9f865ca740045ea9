//! Hobby servo

use pinbridge_core::config::{label, Label, ServoConfig};
use pinbridge_core::{log_info, log_warn};
use pinbridge_hal::{Board, PinAddress, PinMode, WriteAck};

use crate::io;

/// Largest commandable angle in degrees
pub const MAX_ANGLE: u16 = 180;

/// Servo on a PWM pin
#[derive(Debug, Clone)]
pub struct Servo {
    name: Label,
    pin: PinAddress,
    min_pulse_us: u16,
    max_pulse_us: u16,
}

impl Servo {
    pub fn new(config: &ServoConfig) -> Self {
        Self {
            name: label(&config.name),
            pin: config.pin,
            min_pulse_us: config.min_pulse_us,
            max_pulse_us: config.max_pulse_us,
        }
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub async fn start<B: Board>(&self, board: &B) {
        log_info!("servo {}: pin {}", self.name(), self.pin);
        let mode = PinMode::Servo {
            min_pulse_us: self.min_pulse_us,
            max_pulse_us: self.max_pulse_us,
        };
        io::set_mode(board, self.pin, mode).await;
    }

    /// Move to `angle` degrees, clamped to [`MAX_ANGLE`]
    pub async fn set_angle<B: Board>(&self, board: &B, angle: u16) -> WriteAck {
        let ack = board.servo_write(self.pin, angle.min(MAX_ANGLE)).await;
        if ack.is_failure() {
            log_warn!("servo {}: write rejected", self.name());
        }
        ack
    }

    /// Release the pin
    pub async fn stop<B: Board>(&self, board: &B) {
        log_info!("servo {}: detach", self.name());
        board.detach_servo(self.pin).await;
    }
}
