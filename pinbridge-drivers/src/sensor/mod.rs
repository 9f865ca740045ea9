//! Sensor monitors
//!
//! A monitor puts its pin into the input mode that makes the board report
//! on it, turns matching [`PinReport`]s into [`Reading`]s and publishes them
//! through a rate governor. The last published reading stays available for
//! synchronous queries.
//!
//! Report timestamps drive the governors, so monitors never read a clock.

mod distance;
mod encoder;
mod intensity;
mod keypad;

pub use distance::DistanceSensor;
pub use encoder::{EncoderSensor, SPEED_PERIOD};
pub use intensity::{AnalogIntensitySensor, DigitalIntensitySensor};
pub use keypad::KeypadSensor;

use embassy_time::Instant;
use pinbridge_core::config::{label, Label};
use pinbridge_core::{Delivery, MaxFrequency, RateGovernor, Reading, Sink};
use pinbridge_hal::{Board, PinReport};

/// Named, rate-governed reading stream
#[derive(Debug, Clone)]
pub(crate) struct Stream {
    name: Label,
    governor: RateGovernor<Reading>,
}

impl Stream {
    pub(crate) fn new(name: &str, max_frequency: MaxFrequency) -> Self {
        Self {
            name: label(name),
            governor: RateGovernor::new(max_frequency),
        }
    }

    pub(crate) fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Publish `reading` if the governor admits it
    pub(crate) fn publish<S: Sink>(&mut self, stamp: Instant, reading: Reading, sink: &mut S) -> bool {
        if !self.governor.offer(stamp, reading) {
            return false;
        }
        self.deliver(stamp, reading, sink);
        true
    }

    /// Publish bypassing the governor
    pub(crate) fn deliver<S: Sink>(&self, stamp: Instant, reading: Reading, sink: &mut S) {
        sink.deliver(Delivery {
            source: self.name.as_str(),
            stamp,
            reading,
        });
    }

    pub(crate) fn last(&self) -> Option<Reading> {
        self.governor.last_value().copied()
    }
}

/// A sensor monitor of any supported kind
#[derive(Debug, Clone)]
pub enum Sensor {
    Distance(DistanceSensor),
    Intensity(AnalogIntensitySensor),
    IntensityDigital(DigitalIntensitySensor),
    Keypad(KeypadSensor),
    Encoder(EncoderSensor),
}

impl Sensor {
    pub fn name(&self) -> &str {
        match self {
            Sensor::Distance(sensor) => sensor.name(),
            Sensor::Intensity(sensor) => sensor.name(),
            Sensor::IntensityDigital(sensor) => sensor.name(),
            Sensor::Keypad(sensor) => sensor.name(),
            Sensor::Encoder(sensor) => sensor.name(),
        }
    }

    /// Ask the board to start reporting this sensor's pin
    pub async fn start<B: Board>(&self, board: &B) {
        match self {
            Sensor::Distance(sensor) => sensor.start(board).await,
            Sensor::Intensity(sensor) => sensor.start(board).await,
            Sensor::IntensityDigital(sensor) => sensor.start(board).await,
            Sensor::Keypad(sensor) => sensor.start(board).await,
            Sensor::Encoder(sensor) => sensor.start(board).await,
        }
    }

    /// Returns true if `report` belongs to this sensor
    pub fn accepts(&self, report: &PinReport) -> bool {
        match self {
            Sensor::Distance(sensor) => sensor.accepts(report),
            Sensor::Intensity(sensor) => sensor.accepts(report),
            Sensor::IntensityDigital(sensor) => sensor.accepts(report),
            Sensor::Keypad(sensor) => sensor.accepts(report),
            Sensor::Encoder(sensor) => sensor.accepts(report),
        }
    }

    /// Turn a report into readings and publish them
    pub fn handle<S: Sink>(&mut self, report: &PinReport, sink: &mut S) {
        match self {
            Sensor::Distance(sensor) => sensor.handle(report, sink),
            Sensor::Intensity(sensor) => sensor.handle(report, sink),
            Sensor::IntensityDigital(sensor) => sensor.handle(report, sink),
            Sensor::Keypad(sensor) => sensor.handle(report, sink),
            Sensor::Encoder(sensor) => sensor.handle(report, sink),
        }
    }

    /// Last published reading
    pub fn last_reading(&self) -> Option<Reading> {
        match self {
            Sensor::Distance(sensor) => sensor.last_reading(),
            Sensor::Intensity(sensor) => sensor.last_reading(),
            Sensor::IntensityDigital(sensor) => sensor.last_reading(),
            Sensor::Keypad(sensor) => sensor.last_reading(),
            Sensor::Encoder(sensor) => sensor.last_reading(),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_util::{ms, Collect};
    use super::*;

    #[test]
    fn test_stream_keeps_last_forwarded() {
        let mut stream = Stream::new("left", MaxFrequency::Hz(10));
        let mut sink = Collect::default();

        assert!(stream.publish(ms(0), Reading::Intensity(1), &mut sink));
        assert!(!stream.publish(ms(10), Reading::Intensity(2), &mut sink));
        assert_eq!(stream.last(), Some(Reading::Intensity(1)));
        assert_eq!(sink.readings.len(), 1);
        assert_eq!(sink.readings[0].0, "left");
    }

    #[test]
    fn test_sensor_dispatch() {
        let sensor = Sensor::IntensityDigital(DigitalIntensitySensor::new(
            "line",
            4,
            MaxFrequency::default(),
        ));
        assert_eq!(sensor.name(), "line");
        assert!(sensor.accepts(&PinReport::new(
            pinbridge_hal::ReportKind::Digital,
            4,
            1,
            ms(0)
        )));
        assert_eq!(sensor.last_reading(), None);
    }
}
