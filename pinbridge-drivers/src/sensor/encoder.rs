//! Wheel encoder monitor
//!
//! Tick reports are published unthrottled. Ticks are also summed into a speed
//! count that the owner publishes and resets every [`SPEED_PERIOD`].

use embassy_time::{Duration, Instant};
use pinbridge_core::config::EncoderConfig;
use pinbridge_core::{log_info, MaxFrequency, Reading, Sink};
use pinbridge_hal::{Board, PinAddress, PinMode, PinReport, ReportKind};

use super::Stream;
use crate::io;

/// Interval of the speed publication
pub const SPEED_PERIOD: Duration = Duration::from_millis(100);

/// Single or quadrature wheel encoder
#[derive(Debug, Clone)]
pub struct EncoderSensor {
    stream: Stream,
    pin: PinAddress,
    pin_b: Option<PinAddress>,
    ticks_per_wheel: u16,
    speed_count: i32,
}

impl EncoderSensor {
    pub fn new(config: &EncoderConfig) -> Self {
        Self {
            stream: Stream::new(&config.name, MaxFrequency::Unthrottled),
            pin: config.pin,
            pin_b: config.pin_b,
            ticks_per_wheel: config.ticks_per_wheel,
            speed_count: 0,
        }
    }

    pub fn name(&self) -> &str {
        self.stream.name()
    }

    pub async fn start<B: Board>(&self, board: &B) {
        log_info!("encoder {}: pin {}", self.name(), self.pin);
        let mode = PinMode::Encoder {
            pin_b: self.pin_b,
            ticks_per_wheel: self.ticks_per_wheel,
        };
        io::set_mode(board, self.pin, mode).await;
    }

    pub fn accepts(&self, report: &PinReport) -> bool {
        report.kind == ReportKind::Encoder && report.pin == self.pin
    }

    pub fn handle<S: Sink>(&mut self, report: &PinReport, sink: &mut S) {
        self.speed_count = self.speed_count.saturating_add(report.value);
        self.stream
            .publish(report.stamp, Reading::EncoderTicks(report.value), sink);
    }

    /// Ticks counted since the last speed publication
    pub fn speed_count(&self) -> i32 {
        self.speed_count
    }

    /// Publish the accumulated speed count and start a new period
    pub fn publish_speed<S: Sink>(&mut self, now: Instant, sink: &mut S) {
        let count = core::mem::take(&mut self.speed_count);
        self.stream.deliver(now, Reading::EncoderSpeed(count), sink);
    }

    pub fn last_reading(&self) -> Option<Reading> {
        self.stream.last()
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_util::{ms, Collect};
    use super::*;
    use embassy_futures::block_on;
    use pinbridge_core::config::label;
    use pinbridge_hal::mock::{MockBoard, Op};

    fn encoder() -> EncoderSensor {
        EncoderSensor::new(&EncoderConfig {
            name: label("left"),
            pin: 16,
            pin_b: Some(17),
            ..EncoderConfig::default()
        })
    }

    #[test]
    fn test_start_mode() {
        let board = MockBoard::new();
        block_on(encoder().start(&board));
        assert_eq!(
            board.ops().as_slice(),
            &[Op::Mode(
                16,
                PinMode::Encoder {
                    pin_b: Some(17),
                    ticks_per_wheel: 20
                }
            )]
        );
    }

    #[test]
    fn test_ticks_unthrottled_and_speed_resets() {
        let mut sensor = encoder();
        let mut sink = Collect::default();
        for i in 0..5 {
            sensor.handle(&PinReport::new(ReportKind::Encoder, 16, 2, ms(i)), &mut sink);
        }
        assert_eq!(sink.readings.len(), 5);
        assert_eq!(sensor.speed_count(), 10);

        sensor.publish_speed(ms(100), &mut sink);
        assert_eq!(sink.readings[5].2, Reading::EncoderSpeed(10));
        assert_eq!(sensor.speed_count(), 0);

        sensor.publish_speed(ms(200), &mut sink);
        assert_eq!(sink.readings[6].2, Reading::EncoderSpeed(0));
        assert_eq!(sensor.last_reading(), Some(Reading::EncoderTicks(2)));
    }
}
