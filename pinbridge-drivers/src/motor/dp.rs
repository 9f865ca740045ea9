//! PWM plus direction pin H-bridge
//!
//! In reverse the bridge inverts the PWM signal, so the written duty is
//! `max_pwm - duty`.

use pinbridge_core::log_debug;
use pinbridge_hal::{Board, PinAddress, PinMode};

use super::duty;
use crate::io;

/// Motor driven by a PWM magnitude pin and a direction pin
#[derive(Debug, Clone)]
pub struct DpMotor {
    p1: PinAddress,
    d1: PinAddress,
    max_pwm: u16,
    previous: i32,
    initialized: bool,
}

impl DpMotor {
    pub fn new(p1: PinAddress, d1: PinAddress, max_pwm: u16) -> Self {
        Self {
            p1,
            d1,
            max_pwm,
            previous: 0,
            initialized: false,
        }
    }

    pub fn speed(&self) -> i32 {
        self.previous
    }

    pub async fn set_speed<B: Board>(&mut self, board: &B, speed: i32) {
        if speed == self.previous {
            return;
        }

        let duty = duty(speed, self.max_pwm);
        if speed == 0 {
            io::digital(board, self.d1, false).await;
            io::pwm(board, self.p1, 0).await;
        } else if speed > 0 {
            self.init(board, true).await;
            io::digital(board, self.d1, false).await;
            io::pwm(board, self.p1, duty).await;
        } else {
            self.init(board, false).await;
            io::digital(board, self.d1, true).await;
            io::pwm(board, self.p1, self.max_pwm - duty).await;
        }

        self.previous = speed;
    }

    async fn init<B: Board>(&mut self, board: &B, forward: bool) {
        if self.initialized {
            return;
        }
        log_debug!("motor pins {} {}: direction and pwm outputs", self.d1, self.p1);
        if forward {
            io::set_mode(board, self.d1, PinMode::DigitalOutput).await;
            io::set_mode(board, self.p1, PinMode::PwmOutput).await;
        } else {
            io::set_mode(board, self.p1, PinMode::PwmOutput).await;
            io::set_mode(board, self.d1, PinMode::DigitalOutput).await;
        }
        self.initialized = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use pinbridge_hal::mock::{MockBoard, Op};

    #[test]
    fn test_forward_zero_reverse() {
        let board = MockBoard::new();
        let mut motor = DpMotor::new(5, 6, 255);
        block_on(async {
            motor.set_speed(&board, 40).await;
            motor.set_speed(&board, 0).await;
            motor.set_speed(&board, -40).await;
        });

        assert_eq!(
            board.ops().as_slice(),
            &[
                Op::Mode(6, PinMode::DigitalOutput),
                Op::Mode(5, PinMode::PwmOutput),
                Op::Digital(6, false),
                Op::Pwm(5, 102),
                Op::Digital(6, false),
                Op::Pwm(5, 0),
                Op::Digital(6, true),
                Op::Pwm(5, 255 - 102),
            ]
        );
        assert_eq!(board.mode_sets(), 2);
    }

    #[test]
    fn test_reverse_first_init_order() {
        let board = MockBoard::new();
        let mut motor = DpMotor::new(5, 6, 1023);
        block_on(motor.set_speed(&board, -100));

        assert_eq!(
            board.ops().as_slice(),
            &[
                Op::Mode(5, PinMode::PwmOutput),
                Op::Mode(6, PinMode::DigitalOutput),
                Op::Digital(6, true),
                Op::Pwm(5, 0),
            ]
        );
    }

    #[test]
    fn test_reverse_duty_clamped() {
        let board = MockBoard::new();
        let mut motor = DpMotor::new(5, 6, 255);
        block_on(motor.set_speed(&board, -300));
        assert_eq!(board.ops().last(), Some(&Op::Pwm(5, 0)));
        assert_eq!(motor.speed(), -300);
    }
}
