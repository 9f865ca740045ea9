//! Recording board for host tests
//!
//! Records every request in issue order so tests can assert on exact pin
//! sequences. I2C writes can be made to fail from a given transaction on,
//! or to suspend once mid-transaction so tests can observe how many writes
//! a caller keeps in flight.

use core::cell::{Cell, RefCell};

use embassy_futures::yield_now;
use heapless::Vec;

use crate::board::{Board, I2cPins, PinMode, WriteAck};
use crate::pin::PinAddress;

/// Maximum number of recorded operations
pub const MAX_OPS: usize = 512;

/// Largest I2C payload kept per recorded write
pub const MAX_I2C_RECORD: usize = 32;

/// One recorded board request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    /// `set_pin_mode`
    Mode(PinAddress, PinMode),
    /// `digital_write`
    Digital(PinAddress, bool),
    /// `pwm_write`
    Pwm(PinAddress, u16),
    /// `servo_write`
    Servo(PinAddress, u16),
    /// `detach_servo`
    Detach(PinAddress),
    /// `set_scan_interval`
    ScanInterval(u8),
    /// `enable_i2c`
    EnableI2c(u8, Option<I2cPins>),
    /// `i2c_write`
    I2c {
        /// Port index
        port: u8,
        /// Device address
        address: u8,
        /// Payload (truncated to [`MAX_I2C_RECORD`])
        bytes: Vec<u8, MAX_I2C_RECORD>,
    },
}

/// Board double that records requests
pub struct MockBoard {
    ops: RefCell<Vec<Op, MAX_OPS>>,
    i2c_writes: Cell<usize>,
    reject_i2c_from: Cell<Option<usize>>,
    ack: Cell<WriteAck>,
    suspend_i2c: Cell<bool>,
    i2c_in_flight: Cell<usize>,
    max_i2c_in_flight: Cell<usize>,
    started_before_first_done: Cell<Option<usize>>,
}

impl Default for MockBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBoard {
    /// Create a board that acknowledges everything
    pub fn new() -> Self {
        Self {
            ops: RefCell::new(Vec::new()),
            i2c_writes: Cell::new(0),
            reject_i2c_from: Cell::new(None),
            ack: Cell::new(WriteAck::Acked),
            suspend_i2c: Cell::new(false),
            i2c_in_flight: Cell::new(0),
            max_i2c_in_flight: Cell::new(0),
            started_before_first_done: Cell::new(None),
        }
    }

    /// Make every I2C write yield once before completing
    pub fn suspend_i2c(&self) {
        self.suspend_i2c.set(true);
    }

    /// Most I2C writes that were in progress at the same time
    pub fn max_i2c_in_flight(&self) -> usize {
        self.max_i2c_in_flight.get()
    }

    /// I2C writes issued before the first one completed
    pub fn i2c_started_before_first_done(&self) -> Option<usize> {
        self.started_before_first_done.get()
    }

    /// Create a board whose transport never acknowledges
    pub fn unacknowledged() -> Self {
        let board = Self::new();
        board.ack.set(WriteAck::Unacknowledged);
        board
    }

    /// Reject every I2C write starting with the `n`th (0-based)
    pub fn reject_i2c_from(&self, n: usize) {
        self.reject_i2c_from.set(Some(n));
    }

    /// Snapshot of the recorded operations
    pub fn ops(&self) -> Vec<Op, MAX_OPS> {
        self.ops.borrow().clone()
    }

    /// Forget recorded operations
    pub fn clear(&self) {
        self.ops.borrow_mut().clear();
    }

    /// Number of recorded operations matching `f`
    pub fn count(&self, f: impl Fn(&Op) -> bool) -> usize {
        self.ops.borrow().iter().filter(|op| f(op)).count()
    }

    /// Number of `set_pin_mode` requests
    pub fn mode_sets(&self) -> usize {
        self.count(|op| matches!(op, Op::Mode(..)))
    }

    /// Number of I2C writes
    pub fn i2c_writes(&self) -> usize {
        self.count(|op| matches!(op, Op::I2c { .. }))
    }

    fn record(&self, op: Op) {
        // A full log only loses the tail; tests size their scenarios below it
        let _ = self.ops.borrow_mut().push(op);
    }
}

impl Board for MockBoard {
    async fn set_pin_mode(&self, pin: PinAddress, mode: PinMode) -> WriteAck {
        self.record(Op::Mode(pin, mode));
        self.ack.get()
    }

    async fn digital_write(&self, pin: PinAddress, high: bool) -> WriteAck {
        self.record(Op::Digital(pin, high));
        self.ack.get()
    }

    async fn pwm_write(&self, pin: PinAddress, value: u16) -> WriteAck {
        self.record(Op::Pwm(pin, value));
        self.ack.get()
    }

    async fn servo_write(&self, pin: PinAddress, angle: u16) -> WriteAck {
        self.record(Op::Servo(pin, angle));
        self.ack.get()
    }

    async fn detach_servo(&self, pin: PinAddress) -> WriteAck {
        self.record(Op::Detach(pin));
        self.ack.get()
    }

    async fn set_scan_interval(&self, interval_ms: u8) -> WriteAck {
        self.record(Op::ScanInterval(interval_ms));
        self.ack.get()
    }

    async fn enable_i2c(&self, port: u8, pins: Option<I2cPins>) -> WriteAck {
        self.record(Op::EnableI2c(port, pins));
        self.ack.get()
    }

    async fn i2c_write(&self, port: u8, address: u8, bytes: &[u8]) -> WriteAck {
        let index = self.i2c_writes.get();
        self.i2c_writes.set(index + 1);

        let mut recorded = Vec::new();
        let keep = bytes.len().min(MAX_I2C_RECORD);
        let _ = recorded.extend_from_slice(&bytes[..keep]);
        self.record(Op::I2c {
            port,
            address,
            bytes: recorded,
        });

        let in_flight = self.i2c_in_flight.get() + 1;
        self.i2c_in_flight.set(in_flight);
        self.max_i2c_in_flight
            .set(self.max_i2c_in_flight.get().max(in_flight));

        if self.suspend_i2c.get() {
            yield_now().await;
        }

        self.i2c_in_flight.set(self.i2c_in_flight.get() - 1);
        if self.started_before_first_done.get().is_none() {
            self.started_before_first_done.set(Some(self.i2c_writes.get()));
        }

        match self.reject_i2c_from.get() {
            Some(n) if index >= n => WriteAck::Rejected,
            _ => self.ack.get(),
        }
    }
}
