//! DC motor sequencers
//!
//! Three H-bridge wirings are supported, selected once from configuration:
//!
//! - [`PpMotor`]: two PWM pins, one per direction
//! - [`DpMotor`]: one PWM pin for magnitude, one direction pin
//! - [`DdpMotor`]: one PWM pin for magnitude, two direction pins
//!
//! Speeds are percentages in `-100..=100`; larger magnitudes are clamped.
//! Setting the speed that is already commanded does nothing.
//!
//! PP and DP bridges configure their pins lazily on the first move. Some
//! boards leave floating voltages on unconfigured pins, and switching the
//! pins to output one by one would twitch the motor. The configuration order
//! is chosen so that the transient pushes in the commanded direction.

mod ddp;
mod dp;
mod pp;

pub use ddp::DdpMotor;
pub use dp::DpMotor;
pub use pp::PpMotor;

use pinbridge_core::config::MotorKind;
use pinbridge_hal::Board;

/// Largest speed magnitude in percent
pub const MAX_SPEED: u32 = 100;

/// PWM duty for a speed, proportional to its clamped magnitude
pub fn duty(speed: i32, max_pwm: u16) -> u16 {
    let magnitude = speed.unsigned_abs().min(MAX_SPEED);
    (magnitude * max_pwm as u32 / MAX_SPEED) as u16
}

/// A motor of any supported wiring
#[derive(Debug, Clone)]
pub enum Motor {
    Pp(PpMotor),
    Dp(DpMotor),
    Ddp(DdpMotor),
}

impl Motor {
    /// Create the sequencer matching the configured wiring
    pub fn new(kind: MotorKind, max_pwm: u16) -> Self {
        match kind {
            MotorKind::Pp { p1, p2 } => Motor::Pp(PpMotor::new(p1, p2, max_pwm)),
            MotorKind::Dp { p1, d1 } => Motor::Dp(DpMotor::new(p1, d1, max_pwm)),
            MotorKind::Ddp { p1, d1, d2 } => Motor::Ddp(DdpMotor::new(p1, d1, d2, max_pwm)),
        }
    }

    /// Drive the motor at `speed` percent
    pub async fn set_speed<B: Board>(&mut self, board: &B, speed: i32) {
        match self {
            Motor::Pp(motor) => motor.set_speed(board, speed).await,
            Motor::Dp(motor) => motor.set_speed(board, speed).await,
            Motor::Ddp(motor) => motor.set_speed(board, speed).await,
        }
    }

    /// Last commanded speed
    pub fn speed(&self) -> i32 {
        match self {
            Motor::Pp(motor) => motor.speed(),
            Motor::Dp(motor) => motor.speed(),
            Motor::Ddp(motor) => motor.speed(),
        }
    }
}
