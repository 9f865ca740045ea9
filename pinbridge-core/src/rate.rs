//! Publish-rate governor
//!
//! Limits how often a sensor stream is forwarded to its sink. The deadline
//! advances by exactly one period per publish instead of jumping to the
//! current time, so jitter in the incoming readings does not inflate the
//! long-run publish rate.
//!
//! The deadline is resynchronised to the current time when it falls a full
//! period or more behind, which bounds the backlog after gaps in the input.

use embassy_time::{Duration, Instant};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default publish rate for sensor streams (Hz)
pub const DEFAULT_MAX_FREQUENCY_HZ: u16 = 30;

/// Maximum publish rate of a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MaxFrequency {
    /// Forward every reading
    Unthrottled,
    /// Forward at most this many readings per second
    Hz(u16),
}

impl Default for MaxFrequency {
    fn default() -> Self {
        MaxFrequency::Hz(DEFAULT_MAX_FREQUENCY_HZ)
    }
}

impl MaxFrequency {
    /// Interpret a configured rate; zero or negative means unthrottled
    pub fn from_hz(hz: i32) -> Self {
        if hz <= 0 {
            MaxFrequency::Unthrottled
        } else {
            MaxFrequency::Hz(hz.min(u16::MAX as i32) as u16)
        }
    }

    /// Minimum time between two publishes, `None` when unthrottled
    pub fn period(self) -> Option<Duration> {
        match self {
            MaxFrequency::Unthrottled | MaxFrequency::Hz(0) => None,
            MaxFrequency::Hz(hz) => Some(Duration::from_hz(hz as u64)),
        }
    }
}

/// Rate limiter for one reading stream
///
/// Also remembers the last forwarded value so sensors can answer
/// "last known value" queries independently of the publish cadence.
#[derive(Debug, Clone)]
pub struct RateGovernor<T> {
    max_frequency: MaxFrequency,
    last_publish_time: Option<Instant>,
    last_publish_value: Option<T>,
}

impl<T: Clone> RateGovernor<T> {
    /// Create a governor for the given rate
    pub const fn new(max_frequency: MaxFrequency) -> Self {
        Self {
            max_frequency,
            last_publish_time: None,
            last_publish_value: None,
        }
    }

    /// Configured rate
    pub fn max_frequency(&self) -> MaxFrequency {
        self.max_frequency
    }

    /// Current publish deadline base, `None` before the first publish
    pub fn last_publish_time(&self) -> Option<Instant> {
        self.last_publish_time
    }

    /// Last value that was forwarded
    pub fn last_value(&self) -> Option<&T> {
        self.last_publish_value.as_ref()
    }

    /// Decide whether a reading available at `now` may be published
    ///
    /// Updates the schedule when it returns true.
    pub fn admit(&mut self, now: Instant) -> bool {
        let Some(period) = self.max_frequency.period() else {
            return true;
        };

        let Some(last) = self.last_publish_time else {
            // Always publish the first reading
            self.last_publish_time = Some(now);
            return true;
        };

        if now.saturating_duration_since(last) < period {
            return false;
        }

        let mut next = last + period;
        if now.saturating_duration_since(next) >= period {
            next = now;
        }
        self.last_publish_time = Some(next);
        true
    }

    /// Offer a reading; returns true if it should be forwarded
    ///
    /// Forwarded readings become the last known value.
    pub fn offer(&mut self, now: Instant, value: T) -> bool {
        if !self.admit(now) {
            return false;
        }
        self.last_publish_value = Some(value);
        true
    }
}
