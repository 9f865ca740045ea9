//! Fire-and-forget pin requests
//!
//! Outside the display, pin writes are not retried or propagated. A
//! rejection is logged and the acknowledgement handed back for callers that
//! care.

use pinbridge_core::log_warn;
use pinbridge_hal::{Board, PinAddress, PinMode, WriteAck};

pub(crate) async fn set_mode<B: Board>(board: &B, pin: PinAddress, mode: PinMode) -> WriteAck {
    let ack = board.set_pin_mode(pin, mode).await;
    if ack.is_failure() {
        log_warn!("pin {}: mode change rejected", pin);
    }
    ack
}

pub(crate) async fn digital<B: Board>(board: &B, pin: PinAddress, high: bool) -> WriteAck {
    let ack = board.digital_write(pin, high).await;
    if ack.is_failure() {
        log_warn!("pin {}: digital write rejected", pin);
    }
    ack
}

pub(crate) async fn pwm<B: Board>(board: &B, pin: PinAddress, value: u16) -> WriteAck {
    let ack = board.pwm_write(pin, value).await;
    if ack.is_failure() {
        log_warn!("pin {}: pwm write {} rejected", pin, value);
    }
    ack
}
