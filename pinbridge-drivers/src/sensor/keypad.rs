//! Keypad monitor
//!
//! Publishes the debounced key through the governor and every press
//! immediately as a separate [`Reading::KeyPressed`].

use pinbridge_core::config::{BoardProfile, KeypadConfig};
use pinbridge_core::{log_debug, log_info, KeypadDecoder, MaxFrequency, Reading, Sink};
use pinbridge_hal::{Board, PinAddress, PinMode, PinReport, ReportKind};

use super::Stream;
use crate::io;

/// Resistor-ladder keypad on one analog pin
#[derive(Debug, Clone)]
pub struct KeypadSensor {
    stream: Stream,
    channel: PinAddress,
    differential: u16,
    decoder: KeypadDecoder,
}

impl KeypadSensor {
    pub fn new(config: &KeypadConfig, profile: &BoardProfile, max_frequency: MaxFrequency) -> Self {
        Self {
            stream: Stream::new(&config.name, max_frequency),
            channel: profile.analog_channel(config.pin),
            differential: config.differential,
            decoder: KeypadDecoder::new(profile.adc_bits),
        }
    }

    pub fn name(&self) -> &str {
        self.stream.name()
    }

    pub async fn start<B: Board>(&self, board: &B) {
        log_info!("keypad {}: analog channel {}", self.name(), self.channel);
        let mode = PinMode::AnalogInput {
            differential: self.differential,
        };
        io::set_mode(board, self.channel, mode).await;
    }

    pub fn accepts(&self, report: &PinReport) -> bool {
        report.kind == ReportKind::Analog && report.pin == self.channel
    }

    pub fn handle<S: Sink>(&mut self, report: &PinReport, sink: &mut S) {
        let sample = report.value.clamp(0, u16::MAX as i32) as u16;
        let update = self.decoder.update(sample, report.stamp);

        self.stream.publish(report.stamp, Reading::Key(update.key), sink);

        if let Some(key) = update.pressed {
            log_debug!("keypad {}: {} pressed", self.name(), key.as_str());
            self.stream
                .deliver(report.stamp, Reading::KeyPressed(key), sink);
        }
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
    use pinbridge_core::Key;
    use pinbridge_hal::mock::{MockBoard, Op};

    fn keypad(max_frequency: MaxFrequency) -> KeypadSensor {
        let config = KeypadConfig {
            name: label("keypad"),
            controller: label("mirte"),
            pin: 28,
            differential: 5,
        };
        let profile = BoardProfile {
            adc_bits: 12,
            analog_offset: 26,
            ..BoardProfile::default()
        };
        KeypadSensor::new(&config, &profile, max_frequency)
    }

    fn feed(sensor: &mut KeypadSensor, sink: &mut Collect, value: i32, from: u64, to: u64) {
        let mut t = from;
        while t < to {
            sensor.handle(&PinReport::new(ReportKind::Analog, 2, value, ms(t)), sink);
            t += 10;
        }
    }

    #[test]
    fn test_press_and_release() {
        let mut sensor = keypad(MaxFrequency::Unthrottled);
        let mut sink = Collect::default();

        feed(&mut sensor, &mut sink, 4000, 0, 500);
        feed(&mut sensor, &mut sink, 150, 500, 1_000);
        assert_eq!(sensor.last_reading(), Some(Reading::Key(Some(Key::Up))));
        feed(&mut sensor, &mut sink, 4000, 1_000, 1_100);

        let presses: std::vec::Vec<_> = sink
            .readings
            .iter()
            .filter(|r| matches!(r.2, Reading::KeyPressed(_)))
            .collect();
        assert_eq!(presses.len(), 1);
        assert_eq!(presses[0].1, ms(1_000));
        assert_eq!(presses[0].2, Reading::KeyPressed(Key::Up));
        assert_eq!(sensor.last_reading(), Some(Reading::Key(None)));
    }

    #[test]
    fn test_press_bypasses_governor() {
        let mut sensor = keypad(MaxFrequency::Hz(1));
        let mut sink = Collect::default();

        feed(&mut sensor, &mut sink, 50, 0, 500);
        sensor.handle(&PinReport::new(ReportKind::Analog, 2, 4000, ms(500)), &mut sink);

        // One governed key reading at t=0, plus the press
        assert_eq!(sink.readings.len(), 2);
        assert_eq!(sink.readings[1].2, Reading::KeyPressed(Key::Left));
    }

    #[test]
    fn test_start_uses_differential() {
        let board = MockBoard::new();
        block_on(keypad(MaxFrequency::default()).start(&board));
        assert_eq!(
            board.ops().as_slice(),
            &[Op::Mode(2, PinMode::AnalogInput { differential: 5 })]
        );
    }

    #[test]
    fn test_negative_sample_clamped() {
        let mut sensor = keypad(MaxFrequency::Unthrottled);
        let mut sink = Collect::default();
        feed(&mut sensor, &mut sink, -5, 0, 200);
        assert_eq!(sensor.last_reading(), Some(Reading::Key(Some(Key::Left))));
    }
}
