//! Queue-backed workers
//!
//! Each worker task owns a [`WorkerPort`]: a bounded request queue, a
//! bounded response queue and a single-slot notification. The bus task
//! reaches the ports through [`QueueWorkers`].

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use embedded_hal_async::delay::DelayNs;
use hullbus_protocol::Subsystem;

use crate::error::WorkerError;
use crate::exchange::PendingExchange;
use crate::traits::Workers;

/// Entries per request and response queue
pub const QUEUE_DEPTH: usize = 4;

/// Channels between the bus task and one worker task
pub struct WorkerPort<M: RawMutex, const N: usize> {
    requests: Channel<M, PendingExchange, N>,
    responses: Channel<M, PendingExchange, N>,
    notification: Signal<M, u16>,
}

impl<M: RawMutex, const N: usize> WorkerPort<M, N> {
    pub const fn new() -> Self {
        Self {
            requests: Channel::new(),
            responses: Channel::new(),
            notification: Signal::new(),
        }
    }

    /// Wait until the bus task routes a message ID here
    pub async fn wait_notification(&self) -> u16 {
        self.notification.wait().await
    }

    /// Take the oldest queued request, waiting if none is queued
    pub async fn take_request(&self) -> PendingExchange {
        self.requests.receive().await
    }

    pub fn try_take_request(&self) -> Option<PendingExchange> {
        self.requests.try_receive().ok()
    }

    /// Hand a completed exchange back to the bus task
    pub async fn respond(&self, exchange: PendingExchange) {
        self.responses.send(exchange).await;
    }
}

impl<M: RawMutex, const N: usize> Default for WorkerPort<M, N> {
    fn default() -> Self {
        Self::new()
    }
}

/// [`Workers`] over the thruster and embedded ports
///
/// Other subsystems have no worker and fail with [`WorkerError::NoWorker`].
pub struct QueueWorkers<'a, M: RawMutex, D, const N: usize> {
    thruster: &'a WorkerPort<M, N>,
    embedded: &'a WorkerPort<M, N>,
    delay: D,
    timeout_ms: u32,
}

impl<'a, M: RawMutex, D: DelayNs, const N: usize> QueueWorkers<'a, M, D, N> {
    /// `timeout_ms` bounds every queue send and receive
    pub fn new(
        thruster: &'a WorkerPort<M, N>,
        embedded: &'a WorkerPort<M, N>,
        delay: D,
        timeout_ms: u32,
    ) -> Self {
        Self {
            thruster,
            embedded,
            delay,
            timeout_ms,
        }
    }

    fn port(&self, subsystem: Subsystem) -> Result<&'a WorkerPort<M, N>, WorkerError> {
        match subsystem {
            Subsystem::Thruster => Ok(self.thruster),
            Subsystem::Embedded => Ok(self.embedded),
            _ => Err(WorkerError::NoWorker),
        }
    }
}

impl<'a, M: RawMutex, D: DelayNs, const N: usize> Workers for QueueWorkers<'a, M, D, N> {
    async fn submit(
        &mut self,
        subsystem: Subsystem,
        exchange: PendingExchange,
    ) -> Result<(), WorkerError> {
        let port = self.port(subsystem)?;
        match select(port.requests.send(exchange), self.delay.delay_ms(self.timeout_ms)).await {
            Either::First(()) => Ok(()),
            Either::Second(()) => Err(WorkerError::QueueFull),
        }
    }

    fn notify(&mut self, subsystem: Subsystem, id: u16) -> Result<(), WorkerError> {
        let port = self.port(subsystem)?;
        // Replies to an abandoned request would be taken for this one's
        while port.responses.try_receive().is_ok() {}
        port.notification.signal(id);
        Ok(())
    }

    async fn collect(&mut self, subsystem: Subsystem) -> Result<PendingExchange, WorkerError> {
        let port = self.port(subsystem)?;
        match select(port.responses.receive(), self.delay.delay_ms(self.timeout_ms)).await {
            Either::First(exchange) => Ok(exchange),
            Either::Second(()) => Err(WorkerError::Timeout),
        }
    }
}
