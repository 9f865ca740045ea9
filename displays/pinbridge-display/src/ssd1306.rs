//! SSD1306 OLED driver over the board's I2C bridge
//!
//! The panel runs in horizontal addressing mode. A flush sets the column and
//! page window, then streams the frame buffer in 16-byte chunks. All writes
//! of a flush are independent transactions and are issued as one concurrent
//! batch.
//!
//! The first rejected transaction marks the display as failed for good. A
//! failed display is assumed disconnected or bus-jammed; every later
//! operation returns [`DisplayError::Failed`] without touching the bus.

use embassy_futures::join::{join, join_array};
use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};
use pinbridge_core::{log_debug, log_info, log_warn};
use pinbridge_hal::{Board, I2cPins, WriteAck};

use crate::framebuffer::{FrameBuffer, GrayImage, CHUNK_LEN, MAX_CHUNKS};
use crate::text::layout;
use crate::DisplayError;

/// Control byte announcing a single command
pub const CONTROL_COMMAND: u8 = 0x80;

/// Control byte announcing display data
pub const CONTROL_DATA: u8 = 0x40;

/// Number of commands in the addressing preamble of a flush
pub const PREAMBLE_LEN: usize = 6;

/// Line pitch of drawn text in pixels
const LINE_HEIGHT: i32 = 10;

/// SSD1306 commands
mod cmd {
    pub const DISPLAY_OFF: u8 = 0xAE;
    pub const DISPLAY_ON: u8 = 0xAF;
    pub const SET_MEMORY_MODE: u8 = 0x20;
    pub const SET_COLUMN_ADDR: u8 = 0x21;
    pub const SET_PAGE_ADDR: u8 = 0x22;
    pub const SET_START_LINE: u8 = 0x40;
    pub const SET_CONTRAST: u8 = 0x81;
    pub const SET_CHARGE_PUMP: u8 = 0x8D;
    pub const SET_SEG_REMAP: u8 = 0xA1;
    pub const SET_ENTIRE_ON: u8 = 0xA4;
    pub const SET_NORMAL: u8 = 0xA6;
    pub const SET_MUX_RATIO: u8 = 0xA8;
    pub const SET_IREF_SELECT: u8 = 0xAD;
    pub const SET_COM_SCAN_DEC: u8 = 0xC8;
    pub const SET_DISPLAY_OFFSET: u8 = 0xD3;
    pub const SET_CLOCK_DIV: u8 = 0xD5;
    pub const SET_PRECHARGE: u8 = 0xD9;
    pub const SET_COM_PINS: u8 = 0xDA;
    pub const SET_VCOM_DETECT: u8 = 0xDB;
}

/// Length of the power-up command sequence
const INIT_LEN: usize = 27;

/// Column shift of panels whose visible area is centered in controller RAM
pub fn column_offset(width: u8) -> u8 {
    match width {
        64 => 32,
        72 => 28,
        _ => 0,
    }
}

/// SSD1306 display on one I2C port
pub struct Ssd1306 {
    port: u8,
    address: u8,
    pins: Option<I2cPins>,
    buffer: FrameBuffer,
    failed: bool,
}

impl Ssd1306 {
    /// Create a driver for a `width` x `height` panel
    ///
    /// `pins` is passed to the board when it enables the port, for boards
    /// that route I2C to configurable pins.
    pub fn new(
        width: u8,
        height: u8,
        port: u8,
        address: u8,
        pins: Option<I2cPins>,
    ) -> Result<Self, DisplayError> {
        Ok(Self {
            port,
            address,
            pins,
            buffer: FrameBuffer::new(width, height)?,
            failed: false,
        })
    }

    /// Returns true once a transaction has been rejected
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    pub fn buffer(&self) -> &FrameBuffer {
        &self.buffer
    }

    /// Frame buffer for direct drawing; call [`flush`](Self::flush) after
    pub fn buffer_mut(&mut self) -> &mut FrameBuffer {
        &mut self.buffer
    }

    /// Column window `(first, last)` in controller RAM
    pub fn column_window(&self) -> (u8, u8) {
        let width = self.buffer.width();
        let offset = column_offset(width);
        (offset, offset + width - 1)
    }

    /// Enable the I2C port, power the panel up and show a blank screen
    pub async fn start<B: Board>(&mut self, board: &B) -> Result<(), DisplayError> {
        self.ensure_alive()?;
        log_info!("oled: starting on port {} address {}", self.port, self.address);

        let ack = board.enable_i2c(self.port, self.pins).await;
        self.check(ack)?;

        for command in self.init_sequence() {
            let ack = board
                .i2c_write(self.port, self.address, &[CONTROL_COMMAND, command])
                .await;
            self.check(ack)?;
        }

        self.buffer.clear();
        self.flush(board).await
    }

    /// Send the frame buffer to the panel
    ///
    /// Issues the six addressing commands and every buffer chunk as one
    /// concurrent batch.
    pub async fn flush<B: Board>(&mut self, board: &B) -> Result<(), DisplayError> {
        self.ensure_alive()?;

        let (x0, x1) = self.column_window();
        let preamble = [
            cmd::SET_COLUMN_ADDR,
            x0,
            x1,
            cmd::SET_PAGE_ADDR,
            0,
            self.buffer.pages() - 1,
        ];
        let port = self.port;
        let address = self.address;
        let buffer = &self.buffer;

        let commands = join_array(preamble.map(move |command| async move {
            board
                .i2c_write(port, address, &[CONTROL_COMMAND, command])
                .await
        }));

        // One future per possible chunk; indices past the buffer end are no-ops
        let chunks = join_array(core::array::from_fn::<_, MAX_CHUNKS, _>(move |index| async move {
            let Some(pixels) = buffer.chunk(index) else {
                return None;
            };
            let mut data = [0u8; CHUNK_LEN + 1];
            data[0] = CONTROL_DATA;
            data[1..=pixels.len()].copy_from_slice(pixels);
            Some(board.i2c_write(port, address, &data[..=pixels.len()]).await)
        }));

        let (commands, chunks) = join(commands, chunks).await;

        let rejected = commands.iter().any(|ack| ack.is_failure())
            || chunks.iter().flatten().any(|ack| ack.is_failure());
        if rejected {
            return Err(self.latch());
        }

        log_debug!("oled: flushed {} chunks", self.buffer.chunk_count());
        Ok(())
    }

    /// Draw a message, wrapped to the panel, and flush it
    pub async fn show_text<B: Board>(&mut self, board: &B, text: &str) -> Result<(), DisplayError> {
        self.ensure_alive()?;

        self.buffer.clear();
        let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
        let mut y = 1;
        for line in layout(text) {
            if y >= self.buffer.height() as i32 {
                break;
            }
            match Text::with_baseline(line, Point::new(1, y), style, Baseline::Top)
                .draw(&mut self.buffer)
            {
                Ok(_) => {}
                Err(never) => match never {},
            }
            y += LINE_HEIGHT;
        }

        self.flush(board).await
    }

    /// Show a grayscale image, thresholded to black and white
    pub async fn show_image<B: Board>(
        &mut self,
        board: &B,
        image: &GrayImage<'_>,
    ) -> Result<(), DisplayError> {
        self.ensure_alive()?;
        self.buffer.blit_grayscale(image);
        self.flush(board).await
    }

    /// Show frames one after another, one flush each
    ///
    /// Stops at the first failed frame.
    pub async fn play_animation<'a, B, I>(&mut self, board: &B, frames: I) -> Result<(), DisplayError>
    where
        B: Board,
        I: IntoIterator<Item = GrayImage<'a>>,
    {
        self.ensure_alive()?;
        for frame in frames {
            self.show_image(board, &frame).await?;
        }
        Ok(())
    }

    fn init_sequence(&self) -> [u8; INIT_LEN] {
        let width = self.buffer.width();
        let height = self.buffer.height();
        let com_pins = if width as u16 > 2 * height as u16 {
            0x02
        } else {
            0x12
        };

        [
            cmd::DISPLAY_OFF,
            cmd::SET_MEMORY_MODE,
            0x00, // horizontal
            cmd::SET_START_LINE,
            cmd::SET_SEG_REMAP,
            cmd::SET_MUX_RATIO,
            height - 1,
            cmd::SET_COM_SCAN_DEC,
            cmd::SET_DISPLAY_OFFSET,
            0x00,
            cmd::SET_COM_PINS,
            com_pins,
            cmd::SET_CLOCK_DIV,
            0x80,
            cmd::SET_PRECHARGE,
            0xF1, // internal VCC
            cmd::SET_VCOM_DETECT,
            0x30,
            cmd::SET_CONTRAST,
            0xFF,
            cmd::SET_ENTIRE_ON,
            cmd::SET_NORMAL,
            cmd::SET_IREF_SELECT,
            0x30,
            cmd::SET_CHARGE_PUMP,
            0x14, // internal VCC
            cmd::DISPLAY_ON,
        ]
    }

    fn ensure_alive(&self) -> Result<(), DisplayError> {
        if self.failed {
            return Err(DisplayError::Failed);
        }
        Ok(())
    }

    fn check(&mut self, ack: WriteAck) -> Result<(), DisplayError> {
        if ack.is_failure() {
            return Err(self.latch());
        }
        Ok(())
    }

    fn latch(&mut self) -> DisplayError {
        log_warn!("oled: write rejected on port {}, display disabled", self.port);
        self.failed = true;
        DisplayError::BusFailure
    }
}
