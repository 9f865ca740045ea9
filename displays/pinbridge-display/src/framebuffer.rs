//! Monochrome frame buffer
//!
//! 1 bit per pixel, page-major: byte `page * width + x` holds the eight
//! vertical pixels `page * 8 .. page * 8 + 8` of column `x`, least
//! significant bit on top. This is the SSD1306 horizontal addressing layout,
//! so the buffer is sent to the panel as-is.

use core::convert::Infallible;

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;

use crate::DisplayError;

/// Widest supported panel
pub const MAX_WIDTH: u8 = 128;

/// Tallest supported panel
pub const MAX_HEIGHT: u8 = 64;

/// Buffer size of the largest supported panel
pub const MAX_BUFFER_LEN: usize = MAX_WIDTH as usize * (MAX_HEIGHT as usize / 8);

/// Pixel bytes per bus chunk
pub const CHUNK_LEN: usize = 16;

/// Chunk count of the largest supported panel
pub const MAX_CHUNKS: usize = MAX_BUFFER_LEN / CHUNK_LEN;

/// Grayscale luminance at or above which a pixel is lit
pub const LIT_THRESHOLD: u8 = 128;

/// 8-bit grayscale image, row-major
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrayImage<'a> {
    pub width: u16,
    pub height: u16,
    pub pixels: &'a [u8],
}

impl<'a> GrayImage<'a> {
    /// Wrap a pixel slice, checking it matches the dimensions
    pub fn new(width: u16, height: u16, pixels: &'a [u8]) -> Result<Self, DisplayError> {
        if pixels.len() != width as usize * height as usize {
            return Err(DisplayError::InvalidImage);
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }
}

/// Frame buffer for one panel
#[derive(Clone)]
pub struct FrameBuffer {
    width: u8,
    height: u8,
    bytes: [u8; MAX_BUFFER_LEN],
}

impl FrameBuffer {
    /// Create a cleared buffer for a `width` x `height` panel
    pub fn new(width: u8, height: u8) -> Result<Self, DisplayError> {
        if width == 0 || height == 0 || width > MAX_WIDTH || height > MAX_HEIGHT {
            return Err(DisplayError::InvalidGeometry);
        }
        Ok(Self {
            width,
            height,
            bytes: [0; MAX_BUFFER_LEN],
        })
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    /// Number of 8-pixel pages, rounded up
    pub fn pages(&self) -> u8 {
        self.height.div_ceil(8)
    }

    /// Buffer length in bytes
    pub fn len(&self) -> usize {
        self.pages() as usize * self.width as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Active part of the buffer
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len()]
    }

    /// Turn every pixel off
    pub fn clear(&mut self) {
        self.bytes.fill(0);
    }

    /// Set one pixel; out-of-range coordinates are ignored
    pub fn set_pixel(&mut self, x: u32, y: u32, on: bool) {
        if x >= self.width as u32 || y >= self.height as u32 {
            return;
        }
        let index = (y / 8) as usize * self.width as usize + x as usize;
        let mask = 1u8 << (y % 8);
        if on {
            self.bytes[index] |= mask;
        } else {
            self.bytes[index] &= !mask;
        }
    }

    /// Read one pixel; out-of-range coordinates read as off
    pub fn pixel(&self, x: u32, y: u32) -> bool {
        if x >= self.width as u32 || y >= self.height as u32 {
            return false;
        }
        let index = (y / 8) as usize * self.width as usize + x as usize;
        self.bytes[index] & (1 << (y % 8)) != 0
    }

    /// Number of chunks needed to send the buffer
    pub fn chunk_count(&self) -> usize {
        self.len().div_ceil(CHUNK_LEN)
    }

    /// Pixel bytes of chunk `index`, `None` past the end of the buffer
    ///
    /// The last chunk is shorter when the buffer length is not a multiple of
    /// [`CHUNK_LEN`].
    pub fn chunk(&self, index: usize) -> Option<&[u8]> {
        let start = index.checked_mul(CHUNK_LEN)?;
        let bytes = self.as_bytes();
        if start >= bytes.len() {
            return None;
        }
        let end = (start + CHUNK_LEN).min(bytes.len());
        Some(&bytes[start..end])
    }

    /// Replace the buffer contents with a thresholded grayscale image
    ///
    /// The image is anchored at the top-left corner. Parts outside the panel
    /// are clipped; panel pixels outside the image are turned off.
    pub fn blit_grayscale(&mut self, image: &GrayImage<'_>) {
        self.clear();
        let width = (image.width as u32).min(self.width as u32);
        let height = (image.height as u32).min(self.height as u32);
        for y in 0..height {
            let row = y as usize * image.width as usize;
            for x in 0..width {
                if image.pixels[row + x as usize] >= LIT_THRESHOLD {
                    self.set_pixel(x, y, true);
                }
            }
        }
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(self.width as u32, self.height as u32)
    }
}

impl DrawTarget for FrameBuffer {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x < 0 || point.y < 0 {
                continue;
            }
            self.set_pixel(point.x as u32, point.y as u32, color.is_on());
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        let fill = if color.is_on() { 0xFF } else { 0x00 };
        let len = self.len();
        self.bytes[..len].fill(fill);
        Ok(())
    }
}
