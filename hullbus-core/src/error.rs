//! Error types for the bus handler
//!
//! Every variant of [`BusError`] raised while serving ends the session and
//! sends the handler back to the handshake.

use hullbus_protocol::FrameError;

/// Byte transport failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// Read or write did not finish within its timeout
    Timeout,
    /// The transport reported end of stream
    Closed,
    /// Underlying driver error
    Io(embedded_io::ErrorKind),
}

/// Worker queue and notification failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WorkerError {
    /// Request queue stayed full for the whole transfer timeout
    QueueFull,
    /// No response arrived within the transfer timeout
    Timeout,
    /// No worker is attached to that subsystem
    NoWorker,
}

/// Errors raised while connecting or serving
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusError {
    /// Byte transport failed
    Transport(TransportError),
    /// A frame could not be decoded or built
    Frame(FrameError),
    /// Message ID at or above the last range
    InvalidMessageId(u16),
    /// Request payload length differs from the transaction's request size
    BadPayloadLength { id: u16, expected: usize, actual: usize },
    /// Worker queue or notification failed
    Worker(WorkerError),
    /// Neither a transaction nor an error was produced for the request
    NoOutcome,
    /// Peer reported an error we cannot recover from
    PeerError(u16),
    /// Unexpected message during the handshake
    Handshake,
    /// Peer speaks a different protocol version
    VersionMismatch { local: u16, remote: u16 },
}

impl From<TransportError> for BusError {
    fn from(e: TransportError) -> Self {
        BusError::Transport(e)
    }
}

impl From<FrameError> for BusError {
    fn from(e: FrameError) -> Self {
        BusError::Frame(e)
    }
}

impl From<WorkerError> for BusError {
    fn from(e: WorkerError) -> Self {
        BusError::Worker(e)
    }
}
