//! Pending-response cache
//!
//! The host reports a corrupted frame with a checksum error; the last
//! answer is rebuilt from the retained exchange and sent again. Any other
//! error report from the host is fatal for the session.

use embedded_hal_async::delay::DelayNs;
use embedded_io_async::{Read, Write};
use hullbus_protocol::ids::E_ID_CHECKSUM;
use hullbus_protocol::Message;

use crate::error::BusError;
use crate::exchange::PendingExchange;
use crate::io::IoState;

/// Answer an error report from the host
pub async fn handle_error<T, D>(
    io: &mut IoState<T, D>,
    exchange: &PendingExchange,
    message: &Message,
) -> Result<(), BusError>
where
    T: Read + Write,
    D: DelayNs,
{
    match message.id() {
        E_ID_CHECKSUM => {
            let frame = exchange.to_message()?;
            debug!("Host saw a bad checksum, resending {=u16:#x}", frame.id());
            io.write_message(&frame).await
        }
        id => {
            warn!("Host reported error {=u16:#x}", id);
            Err(BusError::PeerError(id))
        }
    }
}
