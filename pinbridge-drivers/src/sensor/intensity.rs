//! Line/intensity sensors
//!
//! A sensor board can expose an analog output, a digital (comparator) output
//! or both. Each output gets its own monitor.

use pinbridge_core::config::BoardProfile;
use pinbridge_core::{log_info, MaxFrequency, Reading, Sink};
use pinbridge_hal::{Board, PinAddress, PinMode, PinReport, ReportKind};

use super::Stream;
use crate::io;

/// Analog intensity output
#[derive(Debug, Clone)]
pub struct AnalogIntensitySensor {
    stream: Stream,
    /// Analog channel, not the board pin
    channel: PinAddress,
    differential: u16,
}

impl AnalogIntensitySensor {
    /// `pin` uses board numbering and is translated to an analog channel
    pub fn new(
        name: &str,
        pin: PinAddress,
        differential: u16,
        profile: &BoardProfile,
        max_frequency: MaxFrequency,
    ) -> Self {
        Self {
            stream: Stream::new(name, max_frequency),
            channel: profile.analog_channel(pin),
            differential,
        }
    }

    pub fn name(&self) -> &str {
        self.stream.name()
    }

    pub async fn start<B: Board>(&self, board: &B) {
        log_info!("intensity {}: analog channel {}", self.name(), self.channel);
        let mode = PinMode::AnalogInput {
            differential: self.differential,
        };
        io::set_mode(board, self.channel, mode).await;
    }

    pub fn accepts(&self, report: &PinReport) -> bool {
        report.kind == ReportKind::Analog && report.pin == self.channel
    }

    pub fn handle<S: Sink>(&mut self, report: &PinReport, sink: &mut S) {
        self.stream
            .publish(report.stamp, Reading::Intensity(report.value), sink);
    }

    pub fn last_reading(&self) -> Option<Reading> {
        self.stream.last()
    }
}

/// Digital intensity output
#[derive(Debug, Clone)]
pub struct DigitalIntensitySensor {
    stream: Stream,
    pin: PinAddress,
}

impl DigitalIntensitySensor {
    pub fn new(name: &str, pin: PinAddress, max_frequency: MaxFrequency) -> Self {
        Self {
            stream: Stream::new(name, max_frequency),
            pin,
        }
    }

    pub fn name(&self) -> &str {
        self.stream.name()
    }

    pub async fn start<B: Board>(&self, board: &B) {
        log_info!("intensity {}: digital pin {}", self.name(), self.pin);
        io::set_mode(board, self.pin, PinMode::DigitalInput).await;
    }

    pub fn accepts(&self, report: &PinReport) -> bool {
        report.kind == ReportKind::Digital && report.pin == self.pin
    }

    pub fn handle<S: Sink>(&mut self, report: &PinReport, sink: &mut S) {
        self.stream
            .publish(report.stamp, Reading::IntensityDigital(report.value != 0), sink);
    }

    pub fn last_reading(&self) -> Option<Reading> {
        self.stream.last()
    }
}
