//! Hullbus - Vehicle Bus Controller Firmware
//!
//! Firmware for the RP2040 board that answers the host computer over UART0.
//! The bus task owns the serial port and the status LED; subsystem workers
//! run as their own tasks and talk to it through queues.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use embassy_time::Delay;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use hullbus_core::RgbLed;

mod channels;
mod config;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 512]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 512]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Hullbus firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // Host link on UART0 (TX=GPIO0, RX=GPIO1)
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = config::BAUDRATE;

    let tx_buf = TX_BUF.init([0u8; 512]);
    let rx_buf = RX_BUF.init([0u8; 512]);

    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    info!("UART initialized at {} baud", config::BAUDRATE);

    // Status LED (R=GPIO18, G=GPIO19, B=GPIO20), dark at boot
    let dark = if config::STATUS_LED.active_low {
        Level::High
    } else {
        Level::Low
    };
    let led = RgbLed::new(
        Output::new(p.PIN_18, dark),
        Output::new(p.PIN_19, dark),
        Output::new(p.PIN_20, dark),
        Delay,
        config::STATUS_LED,
    );

    // Spawn tasks
    spawner.spawn(tasks::thruster_task()).unwrap();
    spawner.spawn(tasks::embedded_task()).unwrap();
    spawner.spawn(tasks::bus_task(uart, led)).unwrap();

    info!("All tasks spawned, firmware running");

    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}
