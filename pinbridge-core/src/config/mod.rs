//! Configuration types
//!
//! Typed per-device records. Producing them (parameter server, files) is the
//! integrating application's job; this layer only consumes them.

pub mod board;
pub mod devices;

pub use board::*;
pub use devices::*;
