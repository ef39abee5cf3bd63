//! Thruster worker
//!
//! Applies throttle commands queued by the bus task. Commands are
//! fire-and-forget; nothing is sent back.

use defmt::*;

use hullbus_core::PendingExchange;
use hullbus_protocol::ids::M_ID_THRUSTER_SET;
use hullbus_protocol::ThrusterSet;

use crate::channels::THRUSTER_PORT;

/// Thrusters on the vehicle
pub const THRUSTER_COUNT: usize = 8;

/// Thruster task - waits for notifications and drains the command queue
#[embassy_executor::task]
pub async fn thruster_task() {
    info!("Thruster task started");

    let mut throttles = [0i16; THRUSTER_COUNT];

    loop {
        let id = THRUSTER_PORT.wait_notification().await;
        if id != M_ID_THRUSTER_SET {
            warn!("Thruster: unexpected message {=u16:#x}", id);
            continue;
        }

        // Several commands can be queued behind a single notification
        while let Some(exchange) = THRUSTER_PORT.try_take_request() {
            apply(&mut throttles, &exchange);
        }
    }
}

fn apply(throttles: &mut [i16; THRUSTER_COUNT], exchange: &PendingExchange) {
    let command = match ThrusterSet::from_bytes(exchange.payload()) {
        Ok(command) => command,
        Err(e) => {
            warn!("Thruster: bad command payload: {:?}", e);
            return;
        }
    };

    let Some(slot) = throttles.get_mut(command.thruster as usize) else {
        warn!("Thruster: no thruster {}", command.thruster);
        return;
    };

    *slot = command.clamped_throttle();
    debug!("Thruster {} throttle {}", command.thruster, *slot);
}
