//! Board-agnostic device behavior for the pinbridge layer
//!
//! This crate contains the logic that does not touch the bus:
//!
//! - Publish-rate governance for sensor streams
//! - Resistor-ladder keypad decoding and debouncing
//! - Reading and sink types handed to the publishing side
//! - Typed device configuration records
//! - Logging macros shared by the driver crates

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
pub mod logging;

pub mod config;
pub mod keypad;
pub mod rate;
pub mod reading;

pub use keypad::{decode_key, Key, KeypadDecoder, KeypadUpdate};
pub use rate::{MaxFrequency, RateGovernor};
pub use reading::{Delivery, Range, Reading, Sink};
