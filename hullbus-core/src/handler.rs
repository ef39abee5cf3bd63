//! Bus handler
//!
//! Drives the link forever: handshake, serve until the host re-announces
//! or something fails, then start over. A faulted session flashes the
//! indicator red once; a successful handshake flashes it green.

use embedded_hal_async::delay::DelayNs;
use embedded_io_async::{Read, Write};
use hullbus_protocol::create_keep_alive;

use crate::cache::handle_error;
use crate::dispatch::handle_request;
use crate::error::BusError;
use crate::exchange::PendingExchange;
use crate::io::IoState;
use crate::state::{Action, LinkEvent, LinkState, SessionEnd};
use crate::traits::{Color, Indicator, Workers};

/// Connection state machine over a transport, the workers and an indicator
pub struct BusHandler<T, D, W, I> {
    io: IoState<T, D>,
    workers: W,
    indicator: I,
    state: LinkState,
    sessions: u32,
    faults: u32,
    last_fault: Option<BusError>,
}

impl<T, D, W, I> BusHandler<T, D, W, I>
where
    T: Read + Write,
    D: DelayNs,
    W: Workers,
    I: Indicator,
{
    pub fn new(io: IoState<T, D>, workers: W, indicator: I) -> Self {
        Self {
            io,
            workers,
            indicator,
            state: LinkState::AwaitingConnect,
            sessions: 0,
            faults: 0,
            last_fault: None,
        }
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Completed handshakes since start
    pub fn sessions(&self) -> u32 {
        self.sessions
    }

    /// Sessions that ended in a fault
    pub fn faults(&self) -> u32 {
        self.faults
    }

    pub fn last_fault(&self) -> Option<BusError> {
        self.last_fault
    }

    pub fn io(&self) -> &IoState<T, D> {
        &self.io
    }

    pub fn io_mut(&mut self) -> &mut IoState<T, D> {
        &mut self.io
    }

    pub fn workers(&self) -> &W {
        &self.workers
    }

    pub fn workers_mut(&mut self) -> &mut W {
        &mut self.workers
    }

    pub fn indicator(&self) -> &I {
        &self.indicator
    }

    /// Run the link forever
    pub async fn run(&mut self) -> ! {
        loop {
            self.step().await;
        }
    }

    /// Complete one handshake or one session and return the new state
    pub async fn step(&mut self) -> LinkState {
        let event = match self.state {
            LinkState::AwaitingConnect => {
                self.connect().await;
                self.sessions = self.sessions.wrapping_add(1);
                info!("Host connected");
                self.indicator.blink(Color::Green, 1).await;
                LinkEvent::Connected
            }
            LinkState::Serving => {
                let end = self.serve().await;
                if let Some(e) = end.fault() {
                    warn!("Session fault: {:?}", e);
                    self.faults = self.faults.wrapping_add(1);
                    self.last_fault = Some(e);
                    self.indicator.blink(Color::Red, 1).await;
                } else {
                    info!("Host re-announced, reconnecting");
                }
                self.io.discard_input();
                end.event()
            }
        };

        self.state = self.state.transition(event);
        self.state
    }

    /// Retry the handshake until it succeeds
    async fn connect(&mut self) {
        let retry_ms = self.io.config().connect_retry_ms;
        loop {
            match self.io.wait_connect().await {
                Ok(()) => return,
                Err(e) => {
                    debug!("Handshake failed: {:?}", e);
                    self.io.sleep_ms(retry_ms).await;
                }
            }
        }
    }

    /// Answer host messages until the session ends
    async fn serve(&mut self) -> SessionEnd {
        let mut exchange = PendingExchange::new();

        loop {
            let message = match self.io.read_message().await {
                Ok(message) => message,
                Err(e) => return SessionEnd::Fault(e),
            };

            let result = match Action::from(message.message_type()) {
                Action::Reconnect => return SessionEnd::Announce,
                Action::KeepAlive => self.io.write_message(&create_keep_alive()).await,
                Action::Request => {
                    exchange.clear();
                    handle_request(&mut self.io, &mut self.workers, &mut exchange, &message).await
                }
                Action::PeerError => handle_error(&mut self.io, &exchange, &message).await,
            };

            if let Err(e) = result {
                return SessionEnd::Fault(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{TransportError, WorkerError};
    use crate::testing::{
        error_report, io_with, request, MockSerial, MockWorkers, NoDelay, RecordingIndicator,
    };
    use embassy_futures::block_on;
    use embedded_io::ErrorKind;
    use hullbus_protocol::ids::{
        E_ID_BAD_REQUEST, E_ID_CHECKSUM, E_ID_PROTOCOL, M_ID_EMBEDDED_STATUS, M_ID_OFFSET_DEPTH,
        M_ID_THRUSTER_SET,
    };
    use hullbus_protocol::transaction::T_EMBEDDED_STATUS;
    use hullbus_protocol::{
        create_announce, create_protocol, EmbeddedStatus, FrameError, Message, MessageType,
        Subsystem, PROTOCOL_VERSION,
    };

    type Handler = BusHandler<MockSerial, NoDelay, MockWorkers, RecordingIndicator>;

    fn handler(serial: MockSerial) -> Handler {
        BusHandler::new(
            io_with(serial),
            MockWorkers::default(),
            RecordingIndicator::default(),
        )
    }

    fn push_handshake(serial: &mut MockSerial) {
        serial.push_message(&create_announce());
        serial.push_message(&create_protocol(PROTOCOL_VERSION));
    }

    /// Handler that has completed the handshake; its handshake replies are cleared
    fn connected(serial: MockSerial) -> Handler {
        let mut handler = handler(serial);
        assert_eq!(block_on(handler.step()), LinkState::Serving);
        handler.io_mut().transport_mut().tx.clear();
        handler
    }

    fn status_reply() -> PendingExchange {
        let status = EmbeddedStatus {
            uptime_s: 10,
            requests: 1,
        };
        PendingExchange::response(&T_EMBEDDED_STATUS, &status.to_bytes()).unwrap()
    }

    fn sent(handler: &Handler) -> Vec<Message> {
        handler.io().transport().sent()
    }

    #[test]
    fn test_connect_blinks_green() {
        let mut serial = MockSerial::new();
        push_handshake(&mut serial);
        let mut handler = handler(serial);

        assert_eq!(block_on(handler.step()), LinkState::Serving);
        assert_eq!(handler.sessions(), 1);
        assert_eq!(handler.indicator().blinks, vec![(Color::Green, 1)]);
        assert_eq!(
            sent(&handler),
            vec![create_announce(), create_protocol(PROTOCOL_VERSION)]
        );
    }

    #[test]
    fn test_connect_retries_after_version_mismatch() {
        let mut serial = MockSerial::new();
        serial.push_message(&create_announce());
        serial.push_message(&create_protocol(PROTOCOL_VERSION - 1));
        push_handshake(&mut serial);
        let mut handler = handler(serial);

        assert_eq!(block_on(handler.step()), LinkState::Serving);

        let types: Vec<_> = sent(&handler).iter().map(|m| m.message_type()).collect();
        assert_eq!(
            types,
            vec![
                MessageType::Announce,
                MessageType::Error,
                MessageType::Announce,
                MessageType::Protocol,
            ]
        );
        assert_eq!(sent(&handler)[1].id(), E_ID_PROTOCOL);
        assert_eq!(handler.indicator().blinks, vec![(Color::Green, 1)]);
    }

    #[test]
    fn test_keepalive_and_protocol_are_answered() {
        let mut serial = MockSerial::new();
        push_handshake(&mut serial);
        serial.push_message(&create_keep_alive());
        serial.push_message(&create_protocol(PROTOCOL_VERSION));
        let mut handler = connected(serial);

        // Script runs out after the two replies
        assert_eq!(block_on(handler.step()), LinkState::AwaitingConnect);
        assert_eq!(sent(&handler), vec![create_keep_alive(), create_keep_alive()]);
        assert_eq!(
            handler.last_fault(),
            Some(BusError::Transport(TransportError::Closed))
        );
    }

    #[test]
    fn test_embedded_request_is_answered() {
        let mut serial = MockSerial::new();
        push_handshake(&mut serial);
        serial.push_message(&request(M_ID_EMBEDDED_STATUS, &[]));
        let mut handler = connected(serial);
        handler.workers_mut().replies.push_back(status_reply());

        block_on(handler.step());

        assert_eq!(
            handler.workers().notified,
            vec![(Subsystem::Embedded, M_ID_EMBEDDED_STATUS)]
        );
        assert_eq!(sent(&handler), vec![status_reply().to_message().unwrap()]);
    }

    #[test]
    fn test_checksum_error_resends_last_reply() {
        let mut serial = MockSerial::new();
        push_handshake(&mut serial);
        serial.push_message(&request(M_ID_EMBEDDED_STATUS, &[]));
        serial.push_message(&error_report(E_ID_CHECKSUM));
        let mut handler = connected(serial);
        handler.workers_mut().replies.push_back(status_reply());

        block_on(handler.step());

        let tx = &handler.io().transport().tx;
        let half = tx.len() / 2;
        assert_eq!(tx[..half], tx[half..]);
        assert_eq!(sent(&handler).len(), 2);
    }

    #[test]
    fn test_response_frame_is_treated_as_error_report() {
        let mut serial = MockSerial::new();
        push_handshake(&mut serial);
        serial.push_message(&request(M_ID_EMBEDDED_STATUS, &[]));
        serial.push_message(&Message::empty(MessageType::Response, E_ID_CHECKSUM));
        let mut handler = connected(serial);
        handler.workers_mut().replies.push_back(status_reply());

        block_on(handler.step());
        assert_eq!(sent(&handler).len(), 2);
    }

    #[test]
    fn test_checksum_error_before_any_request() {
        let mut serial = MockSerial::new();
        push_handshake(&mut serial);
        serial.push_message(&error_report(E_ID_CHECKSUM));
        let mut handler = connected(serial);

        assert_eq!(block_on(handler.step()), LinkState::AwaitingConnect);
        assert_eq!(handler.last_fault(), Some(BusError::NoOutcome));
    }

    #[test]
    fn test_other_peer_error_faults() {
        let mut serial = MockSerial::new();
        push_handshake(&mut serial);
        serial.push_message(&error_report(E_ID_BAD_REQUEST));
        serial.push_message(&create_keep_alive());
        let mut handler = connected(serial);

        assert_eq!(block_on(handler.step()), LinkState::AwaitingConnect);
        assert_eq!(
            handler.last_fault(),
            Some(BusError::PeerError(E_ID_BAD_REQUEST))
        );
        assert!(sent(&handler).is_empty());
        assert_eq!(
            handler.indicator().blinks,
            vec![(Color::Green, 1), (Color::Red, 1)]
        );
    }

    #[test]
    fn test_announce_ends_session_without_fault() {
        let mut serial = MockSerial::new();
        push_handshake(&mut serial);
        // The request arrives in the same read as the announce and is dropped
        serial.push_messages(&[create_announce(), request(M_ID_EMBEDDED_STATUS, &[])]);
        let mut handler = connected(serial);
        handler.workers_mut().replies.push_back(status_reply());

        assert_eq!(block_on(handler.step()), LinkState::AwaitingConnect);
        assert!(handler.io().input_is_empty());
        assert!(handler.workers().notified.is_empty());
        assert!(sent(&handler).is_empty());
        assert_eq!(handler.faults(), 0);
        assert_eq!(handler.indicator().blinks, vec![(Color::Green, 1)]);
    }

    #[test]
    fn test_reconnect_after_announce() {
        let mut serial = MockSerial::new();
        push_handshake(&mut serial);
        serial.push_message(&create_announce());
        push_handshake(&mut serial);
        let mut handler = connected(serial);

        assert_eq!(block_on(handler.step()), LinkState::AwaitingConnect);
        assert_eq!(block_on(handler.step()), LinkState::Serving);
        assert_eq!(handler.sessions(), 2);
    }

    #[test]
    fn test_write_failure_blinks_red_once() {
        let mut serial = MockSerial::new();
        push_handshake(&mut serial);
        serial.push_message(&request(M_ID_EMBEDDED_STATUS, &[]));
        let mut handler = connected(serial);
        handler.workers_mut().replies.push_back(status_reply());
        handler.io_mut().transport_mut().fail_writes = true;

        assert_eq!(block_on(handler.step()), LinkState::AwaitingConnect);
        assert_eq!(
            handler.last_fault(),
            Some(BusError::Transport(TransportError::Io(ErrorKind::Other)))
        );
        assert_eq!(handler.faults(), 1);
        let red = handler
            .indicator()
            .blinks
            .iter()
            .filter(|(color, _)| *color == Color::Red)
            .count();
        assert_eq!(red, 1);
    }

    #[test]
    fn test_keepalive_write_failure_blinks_red_once() {
        let mut serial = MockSerial::new();
        push_handshake(&mut serial);
        serial.push_message(&create_keep_alive());
        let mut handler = connected(serial);
        handler.io_mut().transport_mut().fail_writes = true;

        assert_eq!(block_on(handler.step()), LinkState::AwaitingConnect);
        assert_eq!(
            handler.last_fault(),
            Some(BusError::Transport(TransportError::Io(ErrorKind::Other)))
        );
        assert_eq!(handler.faults(), 1);
        assert_eq!(
            handler.indicator().blinks,
            vec![(Color::Green, 1), (Color::Red, 1)]
        );
    }

    #[test]
    fn test_resend_write_failure_blinks_red_once() {
        let mut serial = MockSerial::new();
        push_handshake(&mut serial);
        serial.push_message(&request(M_ID_EMBEDDED_STATUS, &[]));
        serial.push_message(&error_report(E_ID_CHECKSUM));
        let mut handler = connected(serial);
        handler.workers_mut().replies.push_back(status_reply());
        // The reply goes out, the resend does not
        handler.io_mut().transport_mut().writes_left = Some(1);

        assert_eq!(block_on(handler.step()), LinkState::AwaitingConnect);
        assert_eq!(sent(&handler), vec![status_reply().to_message().unwrap()]);
        assert_eq!(
            handler.last_fault(),
            Some(BusError::Transport(TransportError::Io(ErrorKind::Other)))
        );
        assert_eq!(handler.faults(), 1);
        assert_eq!(
            handler.indicator().blinks,
            vec![(Color::Green, 1), (Color::Red, 1)]
        );
    }

    #[test]
    fn test_corrupt_frame_faults() {
        let mut frame = create_keep_alive().encode_to_vec().unwrap();
        frame[3] ^= 0x01;
        let mut serial = MockSerial::new();
        push_handshake(&mut serial);
        serial.push_bytes(&frame);
        let mut handler = connected(serial);

        assert_eq!(block_on(handler.step()), LinkState::AwaitingConnect);
        assert_eq!(
            handler.last_fault(),
            Some(BusError::Frame(FrameError::InvalidChecksum))
        );
    }

    #[test]
    fn test_thruster_set_sends_nothing() {
        let mut serial = MockSerial::new();
        push_handshake(&mut serial);
        serial.push_message(&request(M_ID_THRUSTER_SET, &[1, 0xF4, 0x01]));
        let mut handler = connected(serial);

        block_on(handler.step());

        assert!(sent(&handler).is_empty());
        let (subsystem, queued) = &handler.workers().submitted[0];
        assert_eq!(*subsystem, Subsystem::Thruster);
        assert_eq!(queued.payload(), &[1, 0xF4, 0x01]);
        // Only the end of the script ends this session
        assert_eq!(
            handler.last_fault(),
            Some(BusError::Transport(TransportError::Closed))
        );
    }

    #[test]
    fn test_unrouted_request_faults() {
        let mut serial = MockSerial::new();
        push_handshake(&mut serial);
        serial.push_message(&request(M_ID_OFFSET_DEPTH, &[]));
        let mut handler = connected(serial);

        block_on(handler.step());
        assert_eq!(handler.last_fault(), Some(BusError::NoOutcome));
    }

    #[test]
    fn test_worker_timeout_faults() {
        let mut serial = MockSerial::new();
        push_handshake(&mut serial);
        serial.push_message(&request(M_ID_EMBEDDED_STATUS, &[]));
        let mut handler = connected(serial);

        block_on(handler.step());
        assert_eq!(
            handler.last_fault(),
            Some(BusError::Worker(WorkerError::Timeout))
        );
    }
}
