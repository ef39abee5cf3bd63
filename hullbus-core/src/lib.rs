//! Board-agnostic core of the vehicle bus controller
//!
//! This crate contains the link logic that does not depend on a specific
//! board:
//!
//! - Transport adapter with read/write timeouts and the connect handshake
//! - Dispatch table routing requests to subsystem workers
//! - Pending-response cache answering checksum reports
//! - Link state machine driving handshake and serving sessions
//! - Worker queues and the status LED
//! - Configuration type definitions

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_code)]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod cache;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod exchange;
pub mod handler;
pub mod io;
pub mod led;
pub mod state;
pub mod traits;
pub mod workers;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{BusError, TransportError, WorkerError};
pub use exchange::PendingExchange;
pub use handler::BusHandler;
pub use io::IoState;
pub use led::RgbLed;
pub use state::{Action, LinkEvent, LinkState, SessionEnd};
pub use traits::{Color, Indicator, Workers};
pub use workers::{QueueWorkers, WorkerPort, QUEUE_DEPTH};
