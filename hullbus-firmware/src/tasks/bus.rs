//! Host bus task
//!
//! Owns the UART and the status LED and runs the link state machine.

use defmt::*;
use embassy_rp::gpio::Output;
use embassy_rp::uart::BufferedUart;
use embassy_time::Delay;

use hullbus_core::{BusHandler, IoState, QueueWorkers, RgbLed};

use crate::channels::{EMBEDDED_PORT, THRUSTER_PORT};
use crate::config::LINK;

/// Status LED as wired on the board
pub type StatusLed = RgbLed<Output<'static>, Output<'static>, Output<'static>, Delay>;

/// Bus task - handshake, serve, reconnect, forever
#[embassy_executor::task]
pub async fn bus_task(uart: BufferedUart, led: StatusLed) {
    info!("Bus task started");

    let io = IoState::new(uart, Delay, LINK);
    let workers = QueueWorkers::new(&THRUSTER_PORT, &EMBEDDED_PORT, Delay, LINK.transfer_timeout_ms);
    let mut handler = BusHandler::new(io, workers, led);

    handler.run().await
}
