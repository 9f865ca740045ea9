//! Simple actuators
//!
//! Servos and LEDs are configured at start and then written directly; they
//! keep no state beyond their pin.

mod led;
mod servo;

pub use led::Led;
pub use servo::Servo;
