//! Configuration types
//!
//! Board-agnostic configuration structures. The firmware reads them from
//! `bus.toml` at build time.

pub mod hardware;
pub mod link;

pub use hardware::*;
pub use link::*;
