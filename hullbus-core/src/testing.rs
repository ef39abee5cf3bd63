//! Host-side doubles for the handler tests

use std::collections::VecDeque;
use std::vec::Vec;

use embedded_hal_async::delay::DelayNs;
use embedded_io::ErrorKind;
use embedded_io_async::{ErrorType, Read, Write};
use hullbus_protocol::{FrameParser, Message, MessageType, Subsystem};

use crate::config::LinkConfig;
use crate::error::WorkerError;
use crate::exchange::PendingExchange;
use crate::io::IoState;
use crate::traits::{Color, Indicator, Workers};

/// Scripted serial port
///
/// Each read returns bytes from at most one queued chunk. When the script
/// runs out, reads report end of stream, or never complete with `stall_reads`.
/// `writes_left` lets that many writes through before every write fails.
#[derive(Debug, Default)]
pub struct MockSerial {
    chunks: VecDeque<Vec<u8>>,
    pub tx: Vec<u8>,
    pub fail_writes: bool,
    pub writes_left: Option<usize>,
    pub stall_reads: bool,
    pub stall_writes: bool,
}

impl MockSerial {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue bytes that arrive together in one read
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        if !bytes.is_empty() {
            self.chunks.push_back(bytes.to_vec());
        }
    }

    pub fn push_message(&mut self, message: &Message) {
        self.push_messages(core::slice::from_ref(message));
    }

    /// Queue several frames that arrive together in one read
    pub fn push_messages(&mut self, messages: &[Message]) {
        let mut bytes = Vec::new();
        for message in messages {
            bytes.extend_from_slice(&message.encode_to_vec().unwrap());
        }
        self.push_bytes(&bytes);
    }

    /// Frames written so far, decoded
    pub fn sent(&self) -> Vec<Message> {
        let mut parser = FrameParser::new();
        self.tx
            .iter()
            .filter_map(|byte| parser.feed(*byte).unwrap())
            .collect()
    }
}

impl ErrorType for MockSerial {
    type Error = ErrorKind;
}

impl Read for MockSerial {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, ErrorKind> {
        let Some(chunk) = self.chunks.front_mut() else {
            if self.stall_reads {
                core::future::pending::<()>().await;
            }
            return Ok(0);
        };

        let n = chunk.len().min(buf.len());
        buf[..n].copy_from_slice(&chunk[..n]);
        chunk.drain(..n);
        if chunk.is_empty() {
            self.chunks.pop_front();
        }
        Ok(n)
    }
}

impl Write for MockSerial {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, ErrorKind> {
        if self.stall_writes {
            core::future::pending::<()>().await;
        }
        match self.writes_left.as_mut() {
            Some(0) => self.fail_writes = true,
            Some(left) => *left -= 1,
            None => {}
        }
        if self.fail_writes {
            return Err(ErrorKind::Other);
        }
        self.tx.extend_from_slice(buf);
        Ok(buf.len())
    }

    async fn flush(&mut self) -> Result<(), ErrorKind> {
        Ok(())
    }
}

/// Delay that completes immediately, so every timeout fires at once
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDelay;

impl DelayNs for NoDelay {
    async fn delay_ns(&mut self, _ns: u32) {}
}

/// Indicator that records what it was asked to show
#[derive(Debug, Default)]
pub struct RecordingIndicator {
    pub blinks: Vec<(Color, u8)>,
}

impl Indicator for RecordingIndicator {
    async fn blink(&mut self, color: Color, count: u8) {
        self.blinks.push((color, count));
    }
}

/// Workers that record submissions and notifications and replay canned replies
#[derive(Debug, Default)]
pub struct MockWorkers {
    pub submitted: Vec<(Subsystem, PendingExchange)>,
    pub notified: Vec<(Subsystem, u16)>,
    pub replies: VecDeque<PendingExchange>,
    pub queue_full: bool,
}

impl Workers for MockWorkers {
    async fn submit(
        &mut self,
        subsystem: Subsystem,
        exchange: PendingExchange,
    ) -> Result<(), WorkerError> {
        if self.queue_full {
            return Err(WorkerError::QueueFull);
        }
        self.submitted.push((subsystem, exchange));
        Ok(())
    }

    fn notify(&mut self, subsystem: Subsystem, id: u16) -> Result<(), WorkerError> {
        self.notified.push((subsystem, id));
        Ok(())
    }

    async fn collect(&mut self, _subsystem: Subsystem) -> Result<PendingExchange, WorkerError> {
        self.replies.pop_front().ok_or(WorkerError::Timeout)
    }
}

pub fn io_with(serial: MockSerial) -> IoState<MockSerial, NoDelay> {
    IoState::new(serial, NoDelay, LinkConfig::default())
}

pub fn request(id: u16, payload: &[u8]) -> Message {
    Message::new(MessageType::Request, id, payload).unwrap()
}

pub fn error_report(id: u16) -> Message {
    Message::empty(MessageType::Error, id)
}
