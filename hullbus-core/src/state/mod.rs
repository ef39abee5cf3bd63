//! Link state machine
//!
//! The handler is either waiting for the host handshake or serving one
//! connected session. Every session ends in exactly one event that sends
//! it back to the handshake.

pub mod events;
pub mod machine;

pub use events::{LinkEvent, SessionEnd};
pub use machine::{Action, LinkState};
