//! Two-PWM-pin H-bridge

use pinbridge_core::log_debug;
use pinbridge_hal::{Board, PinAddress, PinMode};

use super::duty;
use crate::io;

/// Motor driven by one PWM pin per direction
#[derive(Debug, Clone)]
pub struct PpMotor {
    /// Forward pin
    p1: PinAddress,
    /// Reverse pin
    p2: PinAddress,
    max_pwm: u16,
    previous: i32,
    initialized: bool,
}

impl PpMotor {
    pub fn new(p1: PinAddress, p2: PinAddress, max_pwm: u16) -> Self {
        Self {
            p1,
            p2,
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
            io::pwm(board, self.p2, 0).await;
            io::pwm(board, self.p1, 0).await;
        } else if speed > 0 {
            self.init(board, self.p2, self.p1).await;
            io::pwm(board, self.p2, 0).await;
            io::pwm(board, self.p1, duty).await;
        } else {
            self.init(board, self.p1, self.p2).await;
            io::pwm(board, self.p1, 0).await;
            io::pwm(board, self.p2, duty).await;
        }

        self.previous = speed;
    }

    /// Configure the idle pin before the driving one
    async fn init<B: Board>(&mut self, board: &B, idle: PinAddress, driving: PinAddress) {
        if self.initialized {
            return;
        }
        log_debug!("motor pins {} {}: pwm outputs", idle, driving);
        io::set_mode(board, idle, PinMode::PwmOutput).await;
        io::set_mode(board, driving, PinMode::PwmOutput).await;
        self.initialized = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use pinbridge_hal::mock::{MockBoard, Op};

    #[test]
    fn test_forward_init_order() {
        let board = MockBoard::new();
        let mut motor = PpMotor::new(1, 2, 255);
        block_on(motor.set_speed(&board, 40));

        assert_eq!(
            board.ops().as_slice(),
            &[
                Op::Mode(2, PinMode::PwmOutput),
                Op::Mode(1, PinMode::PwmOutput),
                Op::Pwm(2, 0),
                Op::Pwm(1, 102),
            ]
        );
    }

    #[test]
    fn test_reverse_init_order() {
        let board = MockBoard::new();
        let mut motor = PpMotor::new(1, 2, 255);
        block_on(motor.set_speed(&board, -100));

        assert_eq!(
            board.ops().as_slice(),
            &[
                Op::Mode(1, PinMode::PwmOutput),
                Op::Mode(2, PinMode::PwmOutput),
                Op::Pwm(1, 0),
                Op::Pwm(2, 255),
            ]
        );
    }

    #[test]
    fn test_modes_set_once() {
        let board = MockBoard::new();
        let mut motor = PpMotor::new(1, 2, 255);
        block_on(async {
            for speed in [30, 30, -30, 0, 80, 80] {
                motor.set_speed(&board, speed).await;
            }
        });
        assert_eq!(board.mode_sets(), 2);
        assert_eq!(motor.speed(), 80);
    }

    #[test]
    fn test_idle_zeroes_both_pins() {
        let board = MockBoard::new();
        let mut motor = PpMotor::new(1, 2, 255);
        block_on(async {
            motor.set_speed(&board, 60).await;
            board.clear();
            motor.set_speed(&board, 0).await;
        });
        assert_eq!(board.ops().as_slice(), &[Op::Pwm(2, 0), Op::Pwm(1, 0)]);
    }

    #[test]
    fn test_repeated_speed_is_noop() {
        let board = MockBoard::new();
        let mut motor = PpMotor::new(1, 2, 255);
        block_on(motor.set_speed(&board, 0));
        assert!(board.ops().is_empty());
    }
}
