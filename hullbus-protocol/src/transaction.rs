//! Transaction and error descriptors
//!
//! A transaction is the request/response contract for one message ID. The
//! descriptors are static; exchanges refer to them by `&'static` reference.

use crate::ids::*;
use crate::payloads::{EmbeddedStatus, ThrusterSet};

/// Request/response contract for a message ID
#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Transaction {
    pub name: &'static str,
    pub id: u16,
    /// Request payload size in bytes
    pub request: usize,
    /// Response payload size in bytes
    pub response: usize,
}

/// Error class carried by error frames
#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ErrorDescriptor {
    pub name: &'static str,
    pub id: u16,
    /// Payload size in bytes
    pub size: usize,
}

pub static T_EMBEDDED_STATUS: Transaction = Transaction {
    name: "Embedded Status",
    id: M_ID_EMBEDDED_STATUS,
    request: 0,
    response: EmbeddedStatus::SIZE,
};

pub static T_THRUSTER_STATUS: Transaction = Transaction {
    name: "Thruster Status",
    id: M_ID_THRUSTER_STATUS,
    request: 1,
    // Index and last throttle, laid out like the setpoint
    response: ThrusterSet::SIZE,
};

pub static T_THRUSTER_SET: Transaction = Transaction {
    name: "Thruster Set",
    id: M_ID_THRUSTER_SET,
    request: ThrusterSet::SIZE,
    response: 0,
};

/// Protocol versions disagree; payload is the sender's version
pub static E_PROTOCOL: ErrorDescriptor = ErrorDescriptor {
    name: "Protocol",
    id: E_ID_PROTOCOL,
    size: 2,
};

/// A worker could not serve the request
pub static E_BAD_REQUEST: ErrorDescriptor = ErrorDescriptor {
    name: "Bad Request",
    id: E_ID_BAD_REQUEST,
    size: 0,
};

static TRANSACTIONS: [&Transaction; 3] = [&T_EMBEDDED_STATUS, &T_THRUSTER_STATUS, &T_THRUSTER_SET];

/// Look up the transaction for a message ID
pub fn transaction(id: u16) -> Option<&'static Transaction> {
    TRANSACTIONS.iter().copied().find(|t| t.id == id)
}
