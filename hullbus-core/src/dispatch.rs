//! Dispatch table
//!
//! Routes a request to the worker that owns its message-ID range and turns
//! the worker's outcome into the reply frame.
//!
//! | Range      | Handling                                              |
//! |------------|-------------------------------------------------------|
//! | Embedded   | notify the worker, wait for its exchange, reply       |
//! | Thruster   | `THRUSTER_SET` is queued for the worker, no reply     |
//! | any other  | nothing routed; the empty exchange fails the request  |

use embedded_hal_async::delay::DelayNs;
use embedded_io_async::{Read, Write};
use hullbus_protocol::ids::M_ID_THRUSTER_SET;
use hullbus_protocol::{transaction, FrameError, Message, Payload, Subsystem};

use crate::error::BusError;
use crate::exchange::PendingExchange;
use crate::io::IoState;
use crate::traits::Workers;

/// What happens after routing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    /// Answer with the exchange now
    Respond,
    /// The worker owns the request; nothing is sent
    Deferred,
}

/// Route one request and send its reply
///
/// `exchange` is expected to be cleared by the caller; on return it holds
/// whatever was answered so a checksum report can resend it.
pub async fn handle_request<T, D, W>(
    io: &mut IoState<T, D>,
    workers: &mut W,
    exchange: &mut PendingExchange,
    message: &Message,
) -> Result<(), BusError>
where
    T: Read + Write,
    D: DelayNs,
    W: Workers,
{
    let id = message.id();
    let subsystem = Subsystem::from_id(id).ok_or(BusError::InvalidMessageId(id))?;
    debug!("Request {=u16:#x} routed to {:?}", id, subsystem);

    let route = match subsystem {
        Subsystem::Thruster => thruster_request(workers, exchange, message).await?,
        Subsystem::Embedded => embedded_request(workers, exchange, id).await?,
        Subsystem::Reserved
        | Subsystem::Core
        | Subsystem::Safety
        | Subsystem::Battery
        | Subsystem::Power
        | Subsystem::Pneumatics
        | Subsystem::Depth
        | Subsystem::Debug => Route::Respond,
    };

    match route {
        Route::Deferred => Ok(()),
        Route::Respond => {
            let reply = exchange.to_message()?;
            io.write_message(&reply).await
        }
    }
}

async fn thruster_request<W: Workers>(
    workers: &mut W,
    exchange: &mut PendingExchange,
    message: &Message,
) -> Result<Route, BusError> {
    let id = message.id();
    let set = match transaction(id) {
        Some(set) if id == M_ID_THRUSTER_SET => set,
        _ => return Ok(Route::Respond),
    };

    let expected = set.request;
    if message.payload.len() != expected {
        return Err(BusError::BadPayloadLength {
            id,
            expected,
            actual: message.payload.len(),
        });
    }

    // The queue entry owns its own copy; nothing is retained locally
    let payload = Payload::from_slice(&message.payload[..expected])
        .map_err(|_| FrameError::PayloadTooLarge)?;
    exchange.clear();

    workers
        .submit(
            Subsystem::Thruster,
            PendingExchange::for_transaction(set, Some(payload)),
        )
        .await?;
    workers.notify(Subsystem::Thruster, id)?;

    Ok(Route::Deferred)
}

async fn embedded_request<W: Workers>(
    workers: &mut W,
    exchange: &mut PendingExchange,
    id: u16,
) -> Result<Route, BusError> {
    workers.notify(Subsystem::Embedded, id)?;
    *exchange = workers.collect(Subsystem::Embedded).await?;
    Ok(Route::Respond)
}
