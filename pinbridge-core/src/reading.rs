//! Readings and the publish sink
//!
//! Sensors turn pin reports into [`Reading`]s and hand them to a [`Sink`]
//! wrapped in a [`Delivery`] that names the producing device.

use embassy_time::Instant;

use crate::keypad::Key;

/// Ultrasonic range reading in the units reported by the board
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Range {
    /// Measured distance
    pub range: f32,
    /// Closest distance the sensor can report
    pub min_range: f32,
    /// Farthest distance the sensor can report
    pub max_range: f32,
}

impl Range {
    /// Minimum reportable range of the supported ultrasonic sensors
    pub const ULTRASOUND_MIN: f32 = 0.02;
    /// Maximum reportable range of the supported ultrasonic sensors
    pub const ULTRASOUND_MAX: f32 = 1.5;

    /// Range reading from an ultrasonic sensor
    pub const fn ultrasound(range: f32) -> Self {
        Self {
            range,
            min_range: Self::ULTRASOUND_MIN,
            max_range: Self::ULTRASOUND_MAX,
        }
    }
}

/// A value produced by a sensor
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reading {
    /// Sonar distance
    Distance(Range),
    /// Analog intensity (raw ADC value)
    Intensity(i32),
    /// Digital intensity (line detected or not)
    IntensityDigital(bool),
    /// Debounced keypad state, `None` when no key is down
    Key(Option<Key>),
    /// Key that was just released
    KeyPressed(Key),
    /// Encoder ticks reported since the previous report
    EncoderTicks(i32),
    /// Encoder ticks accumulated over one speed period
    EncoderSpeed(i32),
}

/// A reading tagged with its producer and timestamp
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Delivery<'a> {
    /// Name of the device that produced the reading
    pub source: &'a str,
    /// Time the reading refers to
    pub stamp: Instant,
    /// The reading
    pub reading: Reading,
}

/// Receiver of published readings
///
/// Called synchronously from sensor callbacks; implementations are expected
/// to buffer rather than block.
pub trait Sink {
    /// Deliver one reading
    fn deliver(&mut self, delivery: Delivery<'_>);
}

impl<F> Sink for F
where
    F: for<'a> FnMut(Delivery<'a>),
{
    fn deliver(&mut self, delivery: Delivery<'_>) {
        self(delivery)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ultrasound_limits() {
        let range = Range::ultrasound(0.42);
        assert_eq!(range.range, 0.42);
        assert_eq!(range.min_range, 0.02);
        assert_eq!(range.max_range, 1.5);
    }

    #[test]
    fn test_closure_sink() {
        let mut seen = 0;
        let mut sink = |delivery: Delivery<'_>| {
            assert_eq!(delivery.source, "left");
            seen += 1;
        };
        sink.deliver(Delivery {
            source: "left",
            stamp: Instant::from_millis(5),
            reading: Reading::IntensityDigital(true),
        });
        assert_eq!(seen, 1);
    }
}
