//! Ultrasonic distance sensor

use pinbridge_core::config::DistanceConfig;
use pinbridge_core::{log_info, MaxFrequency, Range, Reading, Sink};
use pinbridge_hal::{Board, PinAddress, PinMode, PinReport, ReportKind};

use super::Stream;
use crate::io;

/// Sonar on a trigger/echo pin pair
#[derive(Debug, Clone)]
pub struct DistanceSensor {
    stream: Stream,
    trigger: PinAddress,
    echo: PinAddress,
}

impl DistanceSensor {
    pub fn new(config: &DistanceConfig, max_frequency: MaxFrequency) -> Self {
        Self {
            stream: Stream::new(&config.name, max_frequency),
            trigger: config.trigger,
            echo: config.echo,
        }
    }

    pub fn name(&self) -> &str {
        self.stream.name()
    }

    pub async fn start<B: Board>(&self, board: &B) {
        log_info!("distance {}: sonar on {} / {}", self.name(), self.trigger, self.echo);
        io::set_mode(board, self.trigger, PinMode::Sonar { echo: self.echo }).await;
    }

    pub fn accepts(&self, report: &PinReport) -> bool {
        report.kind == ReportKind::Sonar && report.pin == self.trigger
    }

    pub fn handle<S: Sink>(&mut self, report: &PinReport, sink: &mut S) {
        let reading = Reading::Distance(Range::ultrasound(report.value as f32));
        self.stream.publish(report.stamp, reading, sink);
    }

    pub fn last_reading(&self) -> Option<Reading> {
        self.stream.last()
    }
}
