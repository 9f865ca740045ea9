//! Pinbridge Hardware Abstraction Layer
//!
//! This crate defines the capability the device layer consumes from the
//! telemetry transport that talks to the microcontroller. The transport owns
//! the wire format; everything here is expressed as asynchronous requests that
//! resolve to a [`WriteAck`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Bridge / drivers (pinbridge-drivers)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  pinbridge-hal (this crate - traits)    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  telemetry client (external transport)  │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`board::Board`] - Pin modes, pin writes and I2C transactions
//! - [`pin::PinResolver`] - Named pin lookup

#![no_std]
#![deny(unsafe_code)]

pub mod board;
pub mod pin;
pub mod report;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export key types at crate root for convenience
pub use board::{Board, I2cPins, PinMode, WriteAck};
pub use pin::{resolve_pin, PinAddress, PinResolver, RawPins};
pub use report::{PinReport, ReportKind};
