//! Embedded controller worker
//!
//! Answers requests about the controller itself. Every notification gets
//! exactly one exchange back on the response queue.

use defmt::*;
use embassy_time::Instant;
use portable_atomic::{AtomicU32, Ordering};

use hullbus_core::PendingExchange;
use hullbus_protocol::ids::M_ID_EMBEDDED_STATUS;
use hullbus_protocol::transaction::{E_BAD_REQUEST, T_EMBEDDED_STATUS};
use hullbus_protocol::EmbeddedStatus;

use crate::channels::EMBEDDED_PORT;

/// Requests answered since boot
static REQUESTS_SERVED: AtomicU32 = AtomicU32::new(0);

/// Embedded task - one reply per notification
#[embassy_executor::task]
pub async fn embedded_task() {
    info!("Embedded task started");

    loop {
        let id = EMBEDDED_PORT.wait_notification().await;
        let reply = handle(id);
        EMBEDDED_PORT.respond(reply).await;
    }
}

fn handle(id: u16) -> PendingExchange {
    let requests = REQUESTS_SERVED.fetch_add(1, Ordering::Relaxed) + 1;

    match id {
        M_ID_EMBEDDED_STATUS => {
            let status = EmbeddedStatus {
                uptime_s: Instant::now().as_secs() as u32,
                requests,
            };
            trace!("Embedded status: {:?}", status);
            PendingExchange::response(&T_EMBEDDED_STATUS, &status.to_bytes())
                .unwrap_or_else(|_| PendingExchange::for_error(&E_BAD_REQUEST, None))
        }
        _ => {
            warn!("Embedded: no handler for {=u16:#x}", id);
            PendingExchange::for_error(&E_BAD_REQUEST, None)
        }
    }
}
