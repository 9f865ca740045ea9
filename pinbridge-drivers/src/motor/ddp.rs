//! PWM plus two direction pins H-bridge
//!
//! Both direction pins are pulled low before the active one is raised, so
//! the bridge never sees both high at once. Both pins start low, so the pin
//! modes are configured together without direction-dependent ordering.

use pinbridge_core::log_debug;
use pinbridge_hal::{Board, PinAddress, PinMode};

use super::duty;
use crate::io;

/// Motor driven by a PWM magnitude pin and two direction pins
#[derive(Debug, Clone)]
pub struct DdpMotor {
    p1: PinAddress,
    d1: PinAddress,
    d2: PinAddress,
    max_pwm: u16,
    previous: i32,
    initialized: bool,
}

impl DdpMotor {
    pub fn new(p1: PinAddress, d1: PinAddress, d2: PinAddress, max_pwm: u16) -> Self {
        Self {
            p1,
            d1,
            d2,
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

        if !self.initialized {
            log_debug!("motor pins {} {} {}: outputs", self.p1, self.d1, self.d2);
            io::set_mode(board, self.p1, PinMode::PwmOutput).await;
            io::set_mode(board, self.d1, PinMode::DigitalOutput).await;
            io::set_mode(board, self.d2, PinMode::DigitalOutput).await;
            self.initialized = true;
        }

        let (active, other) = if speed >= 0 {
            (self.d2, self.d1)
        } else {
            (self.d1, self.d2)
        };
        io::digital(board, other, false).await;
        io::digital(board, active, false).await;
        io::pwm(board, self.p1, duty(speed, self.max_pwm)).await;
        io::digital(board, active, true).await;

        self.previous = speed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use pinbridge_hal::mock::{MockBoard, Op};
    use proptest::prelude::*;

    const P1: PinAddress = 9;
    const D1: PinAddress = 7;
    const D2: PinAddress = 8;

    /// Replay digital writes and check the direction pins are never both high
    fn never_both_high(ops: &[Op]) -> bool {
        let mut d1 = false;
        let mut d2 = false;
        for op in ops {
            match *op {
                Op::Digital(D1, high) => d1 = high,
                Op::Digital(D2, high) => d2 = high,
                _ => {}
            }
            if d1 && d2 {
                return false;
            }
        }
        true
    }

    #[test]
    fn test_direction_sequence() {
        let board = MockBoard::new();
        let mut motor = DdpMotor::new(P1, D1, D2, 255);
        block_on(async {
            for speed in [0, 40, -40, 0] {
                motor.set_speed(&board, speed).await;
            }
        });

        assert_eq!(
            board.ops().as_slice(),
            &[
                Op::Mode(P1, PinMode::PwmOutput),
                Op::Mode(D1, PinMode::DigitalOutput),
                Op::Mode(D2, PinMode::DigitalOutput),
                // 40
                Op::Digital(D1, false),
                Op::Digital(D2, false),
                Op::Pwm(P1, 102),
                Op::Digital(D2, true),
                // -40
                Op::Digital(D2, false),
                Op::Digital(D1, false),
                Op::Pwm(P1, 102),
                Op::Digital(D1, true),
                // 0
                Op::Digital(D1, false),
                Op::Digital(D2, false),
                Op::Pwm(P1, 0),
                Op::Digital(D2, true),
            ]
        );
        assert!(never_both_high(&board.ops()));
    }

    #[test]
    fn test_modes_set_once() {
        let board = MockBoard::new();
        let mut motor = DdpMotor::new(P1, D1, D2, 255);
        block_on(async {
            for speed in [40, 40, -40, -40, 10] {
                motor.set_speed(&board, speed).await;
            }
        });
        assert_eq!(board.mode_sets(), 3);
    }

    proptest! {
        #[test]
        fn prop_direction_pins_never_both_high(
            speeds in proptest::collection::vec(-150i32..=150, 1..40),
        ) {
            let board = MockBoard::new();
            let mut motor = DdpMotor::new(P1, D1, D2, 255);
            block_on(async {
                for &speed in &speeds {
                    motor.set_speed(&board, speed).await;
                }
            });
            prop_assert!(never_both_high(&board.ops()));
            prop_assert!(board.mode_sets() <= 3);
        }
    }
}
