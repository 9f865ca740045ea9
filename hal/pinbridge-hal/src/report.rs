//! Asynchronous pin reports
//!
//! Values the board pushes back after a pin has been put in an input mode.

use embassy_time::Instant;

use crate::pin::PinAddress;

/// Which kind of input produced a report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReportKind {
    /// Analog input; `pin` is the analog channel, not the board pin
    Analog,
    /// Digital input
    Digital,
    /// Sonar distance; `pin` is the trigger pin
    Sonar,
    /// Encoder tick delta; `pin` is channel A
    Encoder,
}

/// One value reported by the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinReport {
    /// Report kind
    pub kind: ReportKind,
    /// Pin or channel the report belongs to
    pub pin: PinAddress,
    /// Raw value
    pub value: i32,
    /// Acquisition time
    pub stamp: Instant,
}

impl PinReport {
    /// Create a report
    pub const fn new(kind: ReportKind, pin: PinAddress, value: i32, stamp: Instant) -> Self {
        Self {
            kind,
            pin,
            value,
            stamp,
        }
    }

    /// Board pin number for this report
    ///
    /// Analog reports carry the channel index; the board numbers analog pins
    /// starting at `analog_offset`.
    pub fn board_pin(&self, analog_offset: PinAddress) -> PinAddress {
        match self.kind {
            ReportKind::Analog => self.pin.saturating_add(analog_offset),
            _ => self.pin,
        }
    }
}
