//! Inter-task communication channels
//!
//! One port per subsystem worker, shared between the bus task and that
//! worker. Ranges without a worker have no port.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use hullbus_core::{WorkerPort, QUEUE_DEPTH};

pub type Port = WorkerPort<CriticalSectionRawMutex, QUEUE_DEPTH>;

/// Thruster commands from the bus task
pub static THRUSTER_PORT: Port = WorkerPort::new();

/// Embedded status requests and their answers
pub static EMBEDDED_PORT: Port = WorkerPort::new();
