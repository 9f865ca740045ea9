//! On-demand pin access
//!
//! Raw pin reads and writes for callers that address pins directly rather
//! than through a configured device. Reports for pins no sensor claims are
//! recorded here; a read of a pin that has never reported subscribes to it
//! and waits for the first value, up to [`PIN_VALUE_TIMEOUT_MS`] of clock
//! time.
//!
//! The value table sits behind a `NoopRawMutex`: recording and waiting
//! readers run on the same executor and never hold the lock across an await.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::{Duration, Instant};
use embedded_hal_async::delay::DelayNs;
use heapless::FnvIndexMap;
use pinbridge_core::config::BoardProfile;
use pinbridge_core::{log_debug, log_warn};
use pinbridge_hal::{resolve_pin, Board, PinAddress, PinMode, PinReport, PinResolver};

use crate::io;

/// Pins whose last value is remembered (power of two)
pub const MAX_TRACKED_PINS: usize = 64;

/// How long a read waits for a pin's first report
pub const PIN_VALUE_TIMEOUT_MS: u64 = 5_000;

/// Polling interval while waiting, also the settle time before a write
pub const POLL_INTERVAL_MS: u32 = 1;

/// Returned by reads that received no value
pub const NO_VALUE: i32 = -1;

/// How a raw pin is read or written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinKind {
    /// ADC input or PWM output
    Analog,
    /// Digital input or output
    Digital,
}

type ValueTable = FnvIndexMap<PinAddress, i32, MAX_TRACKED_PINS>;

/// Last known values of raw pins
pub struct PinValueService<R> {
    resolver: R,
    profile: BoardProfile,
    timeout: Duration,
    values: Mutex<NoopRawMutex, RefCell<ValueTable>>,
}

impl<R: PinResolver> PinValueService<R> {
    pub fn new(resolver: R, profile: BoardProfile) -> Self {
        Self {
            resolver,
            profile,
            timeout: Duration::from_millis(PIN_VALUE_TIMEOUT_MS),
            values: Mutex::new(RefCell::new(ValueTable::new())),
        }
    }

    /// Replace the default read timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Store the value of a report under its board pin
    pub fn record(&self, report: &PinReport) {
        let pin = report.board_pin(self.profile.analog_offset);
        self.values.lock(|values| {
            if values.borrow_mut().insert(pin, report.value).is_err() {
                log_warn!("pin {}: value table full, report dropped", pin);
            }
        });
    }

    /// Last recorded value of a board pin
    pub fn value(&self, pin: PinAddress) -> Option<i32> {
        self.values.lock(|values| values.borrow().get(&pin).copied())
    }

    /// Read a pin by name or number
    ///
    /// A pin that has not reported yet is switched to the matching input
    /// mode. Returns [`NO_VALUE`] if the name does not resolve or no report
    /// arrives before the timeout. The deadline is measured on the embassy
    /// clock; `delay` only paces the polling.
    pub async fn get_pin_value<B: Board, D: DelayNs>(
        &self,
        board: &B,
        delay: &mut D,
        name: &str,
        kind: PinKind,
    ) -> i32 {
        let Some(pin) = resolve_pin(&self.resolver, name) else {
            log_warn!("get pin value: unknown pin {}", name);
            return NO_VALUE;
        };

        if self.value(pin).is_none() {
            log_debug!("pin {}: subscribing", pin);
            match kind {
                PinKind::Analog => {
                    let channel = self.profile.analog_channel(pin);
                    io::set_mode(board, channel, PinMode::AnalogInput { differential: 0 }).await;
                }
                PinKind::Digital => {
                    io::set_mode(board, pin, PinMode::DigitalInput).await;
                }
            };
        }

        let deadline = Instant::now() + self.timeout;
        loop {
            if let Some(value) = self.value(pin) {
                return value;
            }
            if Instant::now() >= deadline {
                log_warn!("pin {}: no report within timeout", pin);
                return NO_VALUE;
            }
            delay.delay_ms(POLL_INTERVAL_MS).await;
        }
    }

    /// Write a pin by name or number
    ///
    /// Analog values are capped to the board's PWM range, digital values are
    /// high when non-zero. Returns false if the name does not resolve.
    pub async fn set_pin_value<B: Board, D: DelayNs>(
        &self,
        board: &B,
        delay: &mut D,
        name: &str,
        kind: PinKind,
        value: i32,
    ) -> bool {
        let Some(pin) = resolve_pin(&self.resolver, name) else {
            log_warn!("set pin value: unknown pin {}", name);
            return false;
        };

        match kind {
            PinKind::Analog => {
                let capped = value.clamp(0, self.profile.max_pwm as i32) as u16;
                io::set_mode(board, pin, PinMode::PwmOutput).await;
                delay.delay_ms(POLL_INTERVAL_MS).await;
                io::pwm(board, pin, capped).await;
            }
            PinKind::Digital => {
                io::set_mode(board, pin, PinMode::DigitalOutput).await;
                delay.delay_ms(POLL_INTERVAL_MS).await;
                io::digital(board, pin, value != 0).await;
            }
        }
        true
    }
}
