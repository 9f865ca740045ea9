//! OLED display support for pinbridge
//!
//! - [`FrameBuffer`]: 1-bit page-major buffer implementing the
//!   `embedded-graphics` draw target
//! - [`Ssd1306`]: panel driver that flushes the buffer over the board's I2C
//!   bridge in concurrent chunks
//! - [`text`]: line splitting and word wrapping for text messages
//!
//! Image decoding stays with the caller; images arrive as 8-bit grayscale.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod framebuffer;
pub mod ssd1306;
pub mod text;

pub use framebuffer::{FrameBuffer, GrayImage};
pub use ssd1306::Ssd1306;

/// Display errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// A previous transaction was rejected; the display is disabled
    Failed,
    /// A transaction of this operation was rejected
    BusFailure,
    /// Panel dimensions are zero or larger than supported
    InvalidGeometry,
    /// Image pixel count does not match its dimensions
    InvalidImage,
}
