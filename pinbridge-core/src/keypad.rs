//! Resistor-ladder keypad decoding
//!
//! Five keys share one analog pin through a resistor ladder. Each key pulls
//! the pin into its own voltage band. The band thresholds were measured on a
//! 12-bit ADC and are rescaled to the board's ADC resolution.
//!
//! Bands are checked in ascending order with a strict `<`, so the first band
//! whose upper bound exceeds the sample wins.

use embassy_time::{Duration, Instant};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Time a raw key must be stable before it counts as pressed
pub const DEBOUNCE: Duration = Duration::from_millis(100);

/// Resolution the ladder thresholds were measured at
const REFERENCE_BITS: u32 = 12;

/// Upper bounds of the ladder bands at 12-bit resolution, in evaluation order
const LADDER: [(u32, Key); 5] = [
    (70, Key::Left),
    (230, Key::Up),
    (410, Key::Down),
    (620, Key::Right),
    (880, Key::Enter),
];

/// Keypad key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Key {
    Left,
    Up,
    Down,
    Right,
    Enter,
}

impl Key {
    /// Name used on the publishing side
    pub fn as_str(self) -> &'static str {
        match self {
            Key::Left => "left",
            Key::Up => "up",
            Key::Down => "down",
            Key::Right => "right",
            Key::Enter => "enter",
        }
    }
}

/// Decode a raw ADC sample into a key
///
/// `sample < threshold_12bit / 4096 * 2^adc_bits` is evaluated exactly as
/// `sample * 4096 < threshold_12bit * 2^adc_bits`.
pub fn decode_key(sample: u16, adc_bits: u8) -> Option<Key> {
    let bits = (adc_bits as u32).min(32);
    let scaled_sample = (sample as u64) << REFERENCE_BITS;
    LADDER
        .iter()
        .find(|&&(threshold, _)| scaled_sample < (threshold as u64) << bits)
        .map(|&(_, key)| key)
}

/// Result of feeding one sample to the decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeypadUpdate {
    /// Debounced key state after this sample
    pub key: Option<Key>,
    /// Key that stopped being the debounced key with this sample
    pub pressed: Option<Key>,
}

/// Keypad decoder with debounce and press detection
#[derive(Debug, Clone)]
pub struct KeypadDecoder {
    adc_bits: u8,
    last_key: Option<Key>,
    last_debounce_time: Instant,
    last_debounced_key: Option<Key>,
}

impl KeypadDecoder {
    /// Create a decoder for an ADC with the given resolution
    pub fn new(adc_bits: u8) -> Self {
        Self {
            adc_bits,
            last_key: None,
            last_debounce_time: Instant::from_ticks(0),
            last_debounced_key: None,
        }
    }

    /// Current debounced key
    pub fn debounced(&self) -> Option<Key> {
        self.last_debounced_key
    }

    /// Feed a sample taken at `stamp`
    pub fn update(&mut self, sample: u16, stamp: Instant) -> KeypadUpdate {
        let key = decode_key(sample, self.adc_bits);

        if key != self.last_key {
            self.last_debounce_time = stamp;
        }

        let debounced = if stamp.saturating_duration_since(self.last_debounce_time) > DEBOUNCE {
            key
        } else {
            None
        };

        // A press is reported when the previously debounced key goes away
        let pressed = match self.last_debounced_key {
            Some(previous) if Some(previous) != debounced => Some(previous),
            _ => None,
        };

        self.last_key = key;
        self.last_debounced_key = debounced;

        KeypadUpdate {
            key: debounced,
            pressed,
        }
    }
}
