//! Transport adapter
//!
//! Owns the byte transport, the delay used for timeouts, the link timing and
//! the receive side of the codec. Every blocking transport operation races
//! a sleep; the sleep winning is reported as [`TransportError::Timeout`].

use embassy_futures::select::{select, Either};
use embedded_hal_async::delay::DelayNs;
use embedded_io::Error as _;
use embedded_io_async::{Read, Write};
use hullbus_protocol::transaction::E_PROTOCOL;
use hullbus_protocol::{
    create_announce, create_error, create_protocol, protocol_version, FrameParser, Message,
    MessageType, MAX_FRAME_SIZE, PROTOCOL_VERSION,
};

use crate::config::LinkConfig;
use crate::error::{BusError, TransportError};

/// Bytes pulled from the transport per read
pub const RX_CHUNK_SIZE: usize = 64;

/// Bytes read from the transport but not yet fed to the parser
struct RxBuffer {
    parser: FrameParser,
    buf: [u8; RX_CHUNK_SIZE],
    pos: usize,
    len: usize,
}

impl RxBuffer {
    fn new() -> Self {
        Self {
            parser: FrameParser::new(),
            buf: [0; RX_CHUNK_SIZE],
            pos: 0,
            len: 0,
        }
    }

    fn clear(&mut self) {
        self.parser.reset();
        self.pos = 0;
        self.len = 0;
    }

    fn is_empty(&self) -> bool {
        self.pos == self.len && self.parser.is_idle()
    }

    async fn next_message<T: Read>(&mut self, transport: &mut T) -> Result<Message, BusError> {
        loop {
            while self.pos < self.len {
                let byte = self.buf[self.pos];
                self.pos += 1;
                if let Some(message) = self.parser.feed(byte)? {
                    return Ok(message);
                }
            }

            let n = transport
                .read(&mut self.buf)
                .await
                .map_err(|e| TransportError::Io(e.kind()))?;
            if n == 0 {
                return Err(TransportError::Closed.into());
            }
            self.pos = 0;
            self.len = n;
        }
    }
}

/// Connection-level context shared by the handshake and the serving loop
pub struct IoState<T, D> {
    transport: T,
    delay: D,
    config: LinkConfig,
    rx: RxBuffer,
}

impl<T, D> IoState<T, D>
where
    T: Read + Write,
    D: DelayNs,
{
    pub fn new(transport: T, delay: D, config: LinkConfig) -> Self {
        Self {
            transport,
            delay,
            config,
            rx: RxBuffer::new(),
        }
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Drop buffered input and any partial frame
    pub fn discard_input(&mut self) {
        self.rx.clear();
    }

    /// True if no received byte is waiting to be parsed
    pub fn input_is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Sleep on the link's delay source
    pub async fn sleep_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms).await;
    }

    /// Read the next complete frame within the read timeout
    pub async fn read_message(&mut self) -> Result<Message, BusError> {
        let timeout_ms = self.config.read_timeout_ms;
        let message = match select(
            self.rx.next_message(&mut self.transport),
            self.delay.delay_ms(timeout_ms),
        )
        .await
        {
            Either::First(result) => result?,
            Either::Second(()) => return Err(TransportError::Timeout.into()),
        };

        trace!("rx {:?} id={=u16:#x}", message.header.message_type, message.id());
        Ok(message)
    }

    /// Encode, write and flush one frame within the transfer timeout
    pub async fn write_message(&mut self, message: &Message) -> Result<(), BusError> {
        let mut frame = [0u8; MAX_FRAME_SIZE];
        let len = message.encode(&mut frame)?;

        let timeout_ms = self.config.transfer_timeout_ms;
        let transport = &mut self.transport;
        let write = async {
            transport.write_all(&frame[..len]).await?;
            transport.flush().await
        };

        match select(write, self.delay.delay_ms(timeout_ms)).await {
            Either::First(Ok(())) => {
                trace!("tx {:?} id={=u16:#x}", message.header.message_type, message.id());
                Ok(())
            }
            Either::First(Err(e)) => Err(TransportError::Io(e.kind()).into()),
            Either::Second(()) => Err(TransportError::Timeout.into()),
        }
    }

    /// One handshake attempt
    ///
    /// Expects Announce then Protocol from the host and mirrors both. A
    /// version mismatch is answered with a protocol error carrying our
    /// version before the attempt fails.
    pub async fn wait_connect(&mut self) -> Result<(), BusError> {
        self.discard_input();

        let announce = self.read_message().await?;
        if announce.message_type() != MessageType::Announce {
            return Err(BusError::Handshake);
        }
        self.write_message(&create_announce()).await?;

        let protocol = self.read_message().await?;
        let remote = protocol_version(&protocol).ok_or(BusError::Handshake)?;
        if remote != PROTOCOL_VERSION {
            let reply = create_error(&E_PROTOCOL, &PROTOCOL_VERSION.to_le_bytes())?;
            self.write_message(&reply).await?;
            return Err(BusError::VersionMismatch {
                local: PROTOCOL_VERSION,
                remote,
            });
        }

        self.write_message(&create_protocol(PROTOCOL_VERSION)).await
    }
}
