//! Frame encoding and decoding for the bus protocol.
//!
//! Frame format:
//! - START (1 byte): 0xAA synchronization byte
//! - LENGTH (1 byte): payload length (0-250)
//! - TYPE (1 byte): message type identifier
//! - ID (2 bytes, little-endian): message ID, or error ID for error frames
//! - PAYLOAD (0-250 bytes): transaction-specific data
//! - CRC (2 bytes, little-endian): CRC-16/IBM-3740 of LENGTH, TYPE, ID and PAYLOAD

use crc::{Crc, CRC_16_IBM_3740};
use heapless::Vec;

use crate::message::{Header, Message, MessageType};

/// Frame synchronization byte
pub const FRAME_START: u8 = 0xAA;

/// Maximum payload size in bytes
pub const MAX_PAYLOAD_LENGTH: usize = 250;

/// START + LENGTH + TYPE + ID
pub const HEADER_SIZE: usize = 5;

/// Trailing CRC size
pub const CRC_SIZE: usize = 2;

/// Maximum complete frame size
pub const MAX_FRAME_SIZE: usize = HEADER_SIZE + MAX_PAYLOAD_LENGTH + CRC_SIZE;

const CHECKSUM: Crc<u16> = Crc::<u16>::new(&CRC_16_IBM_3740);

/// Owned payload buffer
pub type Payload = Vec<u8, MAX_PAYLOAD_LENGTH>;

/// Errors that can occur during frame parsing or encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Payload exceeds maximum allowed size
    PayloadTooLarge,
    /// Payload length differs from the size a descriptor declares
    PayloadSizeMismatch { expected: usize, actual: usize },
    /// CRC mismatch
    InvalidChecksum,
    /// Invalid frame structure
    InvalidFrame,
    /// TYPE byte does not name a message type
    UnknownMessageType(u8),
    /// Buffer too small for encoding
    BufferTooSmall,
}

fn checksum(length: u8, msg_type: u8, id: u16, payload: &[u8]) -> u16 {
    let mut digest = CHECKSUM.digest();
    digest.update(&[length, msg_type]);
    digest.update(&id.to_le_bytes());
    digest.update(payload);
    digest.finalize()
}

impl Message {
    /// Number of bytes this message occupies on the wire
    pub fn encoded_len(&self) -> usize {
        HEADER_SIZE + self.payload.len() + CRC_SIZE
    }

    /// Encode this message into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        let frame_len = self.encoded_len();
        if buffer.len() < frame_len {
            return Err(FrameError::BufferTooSmall);
        }

        let length = self.payload.len() as u8;
        let msg_type = self.header.message_type.to_byte();
        let id = self.header.message_id;
        let crc = checksum(length, msg_type, id, &self.payload);

        buffer[0] = FRAME_START;
        buffer[1] = length;
        buffer[2] = msg_type;
        buffer[3..HEADER_SIZE].copy_from_slice(&id.to_le_bytes());
        let payload_end = HEADER_SIZE + self.payload.len();
        buffer[HEADER_SIZE..payload_end].copy_from_slice(&self.payload);
        buffer[payload_end..frame_len].copy_from_slice(&crc.to_le_bytes());

        Ok(frame_len)
    }

    /// Encode this message into a heapless Vec
    pub fn encode_to_vec(&self) -> Result<Vec<u8, MAX_FRAME_SIZE>, FrameError> {
        let mut buffer = [0u8; MAX_FRAME_SIZE];
        let len = self.encode(&mut buffer)?;
        let mut vec = Vec::new();
        vec.extend_from_slice(&buffer[..len])
            .map_err(|_| FrameError::BufferTooSmall)?;
        Ok(vec)
    }
}

/// State machine for parsing incoming frames
#[derive(Debug, Clone)]
pub struct FrameParser {
    state: ParseState,
    payload: Payload,
    expected_length: u8,
    msg_type: u8,
    id: u16,
    crc_low: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    /// Waiting for START byte
    WaitingForStart,
    /// Got START, waiting for LENGTH
    WaitingForLength,
    /// Got LENGTH, waiting for TYPE
    WaitingForType,
    /// Waiting for the low byte of the ID
    WaitingForIdLow,
    /// Waiting for the high byte of the ID
    WaitingForIdHigh,
    /// Reading payload bytes
    ReadingPayload,
    /// Waiting for the low byte of the CRC
    WaitingForCrcLow,
    /// Waiting for the high byte of the CRC
    WaitingForCrcHigh,
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameParser {
    /// Create a new frame parser
    pub fn new() -> Self {
        Self {
            state: ParseState::WaitingForStart,
            payload: Vec::new(),
            expected_length: 0,
            msg_type: 0,
            id: 0,
            crc_low: 0,
        }
    }

    /// Reset the parser state, dropping any partial frame
    pub fn reset(&mut self) {
        self.state = ParseState::WaitingForStart;
        self.payload.clear();
        self.expected_length = 0;
        self.msg_type = 0;
        self.id = 0;
        self.crc_low = 0;
    }

    /// True while no partial frame is buffered
    pub fn is_idle(&self) -> bool {
        self.state == ParseState::WaitingForStart
    }

    /// Feed a single byte to the parser
    ///
    /// Returns `Ok(Some(message))` when a complete valid frame is parsed,
    /// `Ok(None)` when more bytes are needed, or `Err` on parse error.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Message>, FrameError> {
        match self.state {
            ParseState::WaitingForStart => {
                if byte == FRAME_START {
                    self.state = ParseState::WaitingForLength;
                }
                // Silently ignore non-START bytes while waiting
                Ok(None)
            }
            ParseState::WaitingForLength => {
                if byte as usize > MAX_PAYLOAD_LENGTH {
                    self.reset();
                    return Err(FrameError::InvalidFrame);
                }
                self.expected_length = byte;
                self.state = ParseState::WaitingForType;
                Ok(None)
            }
            ParseState::WaitingForType => {
                self.msg_type = byte;
                self.state = ParseState::WaitingForIdLow;
                Ok(None)
            }
            ParseState::WaitingForIdLow => {
                self.id = byte as u16;
                self.state = ParseState::WaitingForIdHigh;
                Ok(None)
            }
            ParseState::WaitingForIdHigh => {
                self.id |= (byte as u16) << 8;
                self.payload.clear();
                self.state = if self.expected_length == 0 {
                    ParseState::WaitingForCrcLow
                } else {
                    ParseState::ReadingPayload
                };
                Ok(None)
            }
            ParseState::ReadingPayload => {
                // Cannot overflow: expected_length <= MAX_PAYLOAD_LENGTH
                let _ = self.payload.push(byte);
                if self.payload.len() == self.expected_length as usize {
                    self.state = ParseState::WaitingForCrcLow;
                }
                Ok(None)
            }
            ParseState::WaitingForCrcLow => {
                self.crc_low = byte;
                self.state = ParseState::WaitingForCrcHigh;
                Ok(None)
            }
            ParseState::WaitingForCrcHigh => {
                let received = u16::from_le_bytes([self.crc_low, byte]);
                let expected =
                    checksum(self.expected_length, self.msg_type, self.id, &self.payload);

                if received != expected {
                    self.reset();
                    return Err(FrameError::InvalidChecksum);
                }

                let Some(message_type) = MessageType::from_byte(self.msg_type) else {
                    let unknown = self.msg_type;
                    self.reset();
                    return Err(FrameError::UnknownMessageType(unknown));
                };

                let message = Message {
                    header: Header {
                        message_type,
                        message_id: self.id,
                    },
                    payload: self.payload.clone(),
                };

                self.reset();
                Ok(Some(message))
            }
        }
    }

    /// Feed multiple bytes to the parser
    ///
    /// Returns the first complete message found, if any.
    /// Remaining bytes after a complete frame are not consumed.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Result<Option<Message>, FrameError> {
        for &byte in bytes {
            if let Some(message) = self.feed(byte)? {
                return Ok(Some(message));
            }
        }
        Ok(None)
    }
}
