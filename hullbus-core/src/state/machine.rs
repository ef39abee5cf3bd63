//! Link state definition
//!
//! The connection lifecycle is a function of the current state and an
//! event; message handling while serving is a function of the message type.

use hullbus_protocol::MessageType;

use super::events::LinkEvent;

/// Link states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkState {
    /// Waiting for the host's Announce/Protocol handshake
    #[default]
    AwaitingConnect,
    /// Handshake done, answering host messages
    Serving,
}

impl LinkState {
    /// Process an event and return the next state
    pub fn transition(self, event: LinkEvent) -> Self {
        use LinkEvent::*;
        use LinkState::*;

        match (self, event) {
            (AwaitingConnect, Connected) => Serving,
            (Serving, AnnounceReceived) => AwaitingConnect,
            (Serving, Fault) => AwaitingConnect,

            // Default: stay in current state
            _ => self,
        }
    }
}

/// What a serving session does with an incoming message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    /// End the session and redo the handshake
    Reconnect,
    /// Answer with a keepalive
    KeepAlive,
    /// Route through the dispatch table
    Request,
    /// Hand to the pending-response cache
    PeerError,
}

impl From<MessageType> for Action {
    fn from(message_type: MessageType) -> Self {
        match message_type {
            MessageType::Announce => Action::Reconnect,
            // A late Protocol frame is answered like a keepalive
            MessageType::Protocol | MessageType::Keepalive => Action::KeepAlive,
            MessageType::Request => Action::Request,
            // The host never sends plain responses; treat them as error reports
            MessageType::Response | MessageType::Error => Action::PeerError,
        }
    }
}
