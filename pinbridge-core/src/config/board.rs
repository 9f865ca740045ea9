//! Board profile
//!
//! Electrical properties of the microcontroller that change how values are
//! scaled and how analog pins are numbered.

use pinbridge_hal::PinAddress;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Board-level scaling parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoardProfile {
    /// Largest PWM duty value the board accepts
    pub max_pwm: u16,
    /// ADC resolution in bits
    pub adc_bits: u8,
    /// Board pin number of analog channel 0
    pub analog_offset: PinAddress,
}

impl Default for BoardProfile {
    fn default() -> Self {
        Self {
            max_pwm: 255,
            adc_bits: 10,
            analog_offset: 0,
        }
    }
}

impl BoardProfile {
    /// Analog channel for a board pin
    pub fn analog_channel(&self, pin: PinAddress) -> PinAddress {
        pin.saturating_sub(self.analog_offset)
    }

    /// PWM value for a percentage, clamped to 100%
    pub fn duty_for_percent(&self, percent: u32) -> u16 {
        let percent = percent.min(100);
        (percent * self.max_pwm as u32 / 100) as u16
    }
}
