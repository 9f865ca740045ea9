//! Device implementations for pinbridge
//!
//! Components that drive the board through [`pinbridge_hal::Board`]:
//!
//! - Motor sequencers (PP, DP, DDP H-bridges)
//! - Sensor monitors (distance, intensity, keypad, encoder)
//! - Actuators (servo, LED)
//! - On-demand raw pin reads and writes
//! - The [`Bridge`] that assembles all of them for one controller

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

mod io;

pub mod actuator;
pub mod bridge;
pub mod motor;
pub mod pins;
pub mod sensor;

pub use bridge::{Bridge, BridgeError, DisplayContent};
pub use motor::Motor;
pub use pins::{PinKind, PinValueService, NO_VALUE};
pub use sensor::Sensor;
