//! Seams between the bus handler and the rest of the firmware
//!
//! The handler talks to subsystem workers and the status LED only through
//! these traits, so the serving loop runs unchanged on the host.

pub mod indicator;
pub mod worker;

pub use indicator::{Color, Indicator};
pub use worker::Workers;
