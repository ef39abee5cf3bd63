//! Vehicle Message Bus Protocol
//!
//! This crate defines the UART-based protocol between the host computer and
//! the embedded controller. The host sends requests; the controller answers
//! each one with a response or an error, keeps the link alive, and resends
//! its last answer when the host reports a corrupted frame.
//!
//! # Protocol Overview
//!
//! All messages use a simple binary frame format:
//! ```text
//! ┌───────┬────────┬──────┬─────────┬─────────────┬─────────┐
//! │ START │ LENGTH │ TYPE │ ID (LE) │ PAYLOAD     │ CRC (LE)│
//! │ 1B    │ 1B     │ 1B   │ 2B      │ 0–250B      │ 2B      │
//! └───────┴────────┴──────┴─────────┴─────────────┴─────────┘
//! ```
//!
//! Message IDs are grouped into per-subsystem ranges (see [`ids`]); each
//! implemented ID has a static [`Transaction`] describing its payload sizes.

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_code)]

pub mod frame;
pub mod ids;
pub mod message;
pub mod payloads;
pub mod transaction;

pub use frame::{FrameError, FrameParser, Payload, FRAME_START, MAX_FRAME_SIZE, MAX_PAYLOAD_LENGTH};
pub use ids::Subsystem;
pub use message::{
    create_announce, create_error, create_keep_alive, create_protocol, create_response,
    protocol_version, Header, Message, MessageType, PROTOCOL_VERSION,
};
pub use payloads::{EmbeddedStatus, ThrusterSet};
pub use transaction::{transaction, ErrorDescriptor, Transaction};
