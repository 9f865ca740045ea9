//! PWM-dimmed LED

use pinbridge_core::config::{label, BoardProfile, Label, LedConfig};
use pinbridge_core::log_info;
use pinbridge_hal::{Board, PinAddress, PinMode, WriteAck};

use crate::io;

/// LED with brightness in percent
#[derive(Debug, Clone)]
pub struct Led {
    name: Label,
    pin: PinAddress,
    profile: BoardProfile,
}

impl Led {
    pub fn new(config: &LedConfig, profile: &BoardProfile) -> Self {
        Self {
            name: label(&config.name),
            pin: config.pin,
            profile: *profile,
        }
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub async fn start<B: Board>(&self, board: &B) {
        log_info!("led {}: pin {}", self.name(), self.pin);
        io::set_mode(board, self.pin, PinMode::PwmOutput).await;
    }

    /// Set brightness, clamped to 100%
    pub async fn set_value<B: Board>(&self, board: &B, percent: u32) -> WriteAck {
        io::pwm(board, self.pin, self.profile.duty_for_percent(percent)).await
    }
}
