//! Subsystem worker contract

use hullbus_protocol::Subsystem;

use crate::error::WorkerError;
use crate::exchange::PendingExchange;

/// Request queues, response queues and notifications of the subsystem workers
///
/// Every subsystem has at most one worker. Implementations bound the
/// blocking operations by the link's transfer timeout.
#[allow(async_fn_in_trait)]
pub trait Workers {
    /// Enqueue an exchange on the subsystem's request queue
    ///
    /// Fails with [`WorkerError::QueueFull`] if no slot frees up in time.
    async fn submit(
        &mut self,
        subsystem: Subsystem,
        exchange: PendingExchange,
    ) -> Result<(), WorkerError>;

    /// Wake the subsystem's worker with a message ID
    ///
    /// A notification not yet consumed is overwritten.
    fn notify(&mut self, subsystem: Subsystem, id: u16) -> Result<(), WorkerError>;

    /// Receive the next completed exchange from the subsystem's response queue
    async fn collect(&mut self, subsystem: Subsystem) -> Result<PendingExchange, WorkerError>;
}
