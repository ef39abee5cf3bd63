//! Message types for the bus protocol
//!
//! Every frame carries a message type and a 16-bit ID. Control messages
//! (announce, protocol, keepalive) use their own builders; responses and
//! errors are built from the static descriptors in [`crate::transaction`].

use crate::frame::{FrameError, Payload, MAX_PAYLOAD_LENGTH};
use crate::ids::M_ID_NULL;
use crate::transaction::{ErrorDescriptor, Transaction};

/// Protocol version exchanged during the handshake
pub const PROTOCOL_VERSION: u16 = 3;

// Wire format values
const MT_ANNOUNCE: u8 = 0x01;
const MT_PROTOCOL: u8 = 0x02;
const MT_KEEPALIVE: u8 = 0x03;
const MT_REQUEST: u8 = 0x04;
const MT_RESPONSE: u8 = 0x05;
const MT_ERROR: u8 = 0x06;

/// Message class carried in the TYPE byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MessageType {
    /// Peer is (re)starting and wants a handshake
    Announce,
    /// Protocol version exchange
    Protocol,
    /// Liveness probe, answered with a keepalive
    Keepalive,
    /// Request for a transaction
    Request,
    /// Response to a transaction
    Response,
    /// Error report; the ID field carries the error ID
    Error,
}

impl MessageType {
    /// Parse a message type from its wire format byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            MT_ANNOUNCE => Some(MessageType::Announce),
            MT_PROTOCOL => Some(MessageType::Protocol),
            MT_KEEPALIVE => Some(MessageType::Keepalive),
            MT_REQUEST => Some(MessageType::Request),
            MT_RESPONSE => Some(MessageType::Response),
            MT_ERROR => Some(MessageType::Error),
            _ => None,
        }
    }

    /// Convert to wire format byte
    pub fn to_byte(self) -> u8 {
        match self {
            MessageType::Announce => MT_ANNOUNCE,
            MessageType::Protocol => MT_PROTOCOL,
            MessageType::Keepalive => MT_KEEPALIVE,
            MessageType::Request => MT_REQUEST,
            MessageType::Response => MT_RESPONSE,
            MessageType::Error => MT_ERROR,
        }
    }
}

/// Frame header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Header {
    pub message_type: MessageType,
    /// Message ID, or error ID for [`MessageType::Error`]
    pub message_id: u16,
}

/// A decoded or constructed message
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Message {
    pub header: Header,
    pub payload: Payload,
}

impl Message {
    /// Create a message with the given type, ID and payload
    pub fn new(message_type: MessageType, message_id: u16, payload: &[u8]) -> Result<Self, FrameError> {
        if payload.len() > MAX_PAYLOAD_LENGTH {
            return Err(FrameError::PayloadTooLarge);
        }

        let mut buffer = Payload::new();
        buffer
            .extend_from_slice(payload)
            .map_err(|_| FrameError::PayloadTooLarge)?;

        Ok(Self {
            header: Header {
                message_type,
                message_id,
            },
            payload: buffer,
        })
    }

    /// Create a message with no payload
    pub fn empty(message_type: MessageType, message_id: u16) -> Self {
        Self {
            header: Header {
                message_type,
                message_id,
            },
            payload: Payload::new(),
        }
    }

    pub fn message_type(&self) -> MessageType {
        self.header.message_type
    }

    pub fn id(&self) -> u16 {
        self.header.message_id
    }
}

/// Keepalive reply
pub fn create_keep_alive() -> Message {
    Message::empty(MessageType::Keepalive, M_ID_NULL)
}

/// Announce, sent back to the host when it (re)connects
pub fn create_announce() -> Message {
    Message::empty(MessageType::Announce, M_ID_NULL)
}

/// Protocol version message
pub fn create_protocol(version: u16) -> Message {
    let mut payload = Payload::new();
    // Two bytes always fit
    let _ = payload.extend_from_slice(&version.to_le_bytes());
    Message {
        header: Header {
            message_type: MessageType::Protocol,
            message_id: M_ID_NULL,
        },
        payload,
    }
}

/// Read the version carried by a protocol message
pub fn protocol_version(message: &Message) -> Option<u16> {
    match (message.message_type(), message.payload.as_slice()) {
        (MessageType::Protocol, &[low, high]) => Some(u16::from_le_bytes([low, high])),
        _ => None,
    }
}

/// Build a response frame for a transaction
///
/// `payload` must be exactly the transaction's declared response size.
pub fn create_response(transaction: &Transaction, payload: &[u8]) -> Result<Message, FrameError> {
    check_size(transaction.response, payload)?;
    Message::new(MessageType::Response, transaction.id, payload)
}

/// Build an error frame
///
/// `payload` must be exactly the descriptor's declared size.
pub fn create_error(error: &ErrorDescriptor, payload: &[u8]) -> Result<Message, FrameError> {
    check_size(error.size, payload)?;
    Message::new(MessageType::Error, error.id, payload)
}

fn check_size(expected: usize, payload: &[u8]) -> Result<(), FrameError> {
    if payload.len() != expected {
        return Err(FrameError::PayloadSizeMismatch {
            expected,
            actual: payload.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{E_ID_PROTOCOL, M_ID_EMBEDDED_STATUS, M_ID_THRUSTER_SET};
    use crate::transaction::{E_PROTOCOL, T_EMBEDDED_STATUS, T_THRUSTER_SET};

    #[test]
    fn test_message_type_roundtrip() {
        let types = [
            MessageType::Announce,
            MessageType::Protocol,
            MessageType::Keepalive,
            MessageType::Request,
            MessageType::Response,
            MessageType::Error,
        ];

        for message_type in types {
            let byte = message_type.to_byte();
            assert_eq!(MessageType::from_byte(byte), Some(message_type));
        }
    }

    #[test]
    fn test_unknown_message_type() {
        assert!(MessageType::from_byte(0x00).is_none());
        assert!(MessageType::from_byte(0x07).is_none());
        assert!(MessageType::from_byte(0xFF).is_none());
    }

    #[test]
    fn test_keep_alive() {
        let message = create_keep_alive();
        assert_eq!(message.message_type(), MessageType::Keepalive);
        assert_eq!(message.id(), M_ID_NULL);
        assert!(message.payload.is_empty());
    }

    #[test]
    fn test_protocol_version_roundtrip() {
        let message = create_protocol(PROTOCOL_VERSION);
        assert_eq!(message.payload.as_slice(), &[3, 0]);
        assert_eq!(protocol_version(&message), Some(PROTOCOL_VERSION));
    }

    #[test]
    fn test_protocol_version_rejects_other_messages() {
        let short = Message::new(MessageType::Protocol, M_ID_NULL, &[3]).unwrap();
        assert_eq!(protocol_version(&short), None);
        assert_eq!(protocol_version(&create_announce()), None);
    }

    #[test]
    fn test_create_response() {
        let payload = [1, 0, 0, 0, 7, 0, 0, 0];
        let message = create_response(&T_EMBEDDED_STATUS, &payload).unwrap();
        assert_eq!(message.message_type(), MessageType::Response);
        assert_eq!(message.id(), M_ID_EMBEDDED_STATUS);
        assert_eq!(message.payload.as_slice(), &payload);
    }

    #[test]
    fn test_create_response_empty_payload() {
        let message = create_response(&T_THRUSTER_SET, &[]).unwrap();
        assert_eq!(message.id(), M_ID_THRUSTER_SET);
        assert!(message.payload.is_empty());
    }

    #[test]
    fn test_create_response_size_mismatch() {
        let result = create_response(&T_EMBEDDED_STATUS, &[1, 2, 3]);
        assert_eq!(
            result,
            Err(FrameError::PayloadSizeMismatch {
                expected: 8,
                actual: 3
            })
        );
    }

    #[test]
    fn test_create_error() {
        let message = create_error(&E_PROTOCOL, &PROTOCOL_VERSION.to_le_bytes()).unwrap();
        assert_eq!(message.message_type(), MessageType::Error);
        assert_eq!(message.id(), E_ID_PROTOCOL);
        assert_eq!(message.payload.as_slice(), &[3, 0]);
    }
}
