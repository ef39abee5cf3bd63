//! Embassy async tasks
//!
//! Each task runs independently and communicates via the worker ports.

pub mod bus;
pub mod embedded;
pub mod thruster;

pub use bus::bus_task;
pub use embedded::embedded_task;
pub use thruster::thruster_task;
