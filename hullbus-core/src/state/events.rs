//! Events that move the link between states

use crate::error::BusError;

/// Events that can trigger link transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkEvent {
    /// Handshake completed
    Connected,
    /// Host announced itself while a session was running
    AnnounceReceived,
    /// Serving failed
    Fault,
}

/// How a serving session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionEnd {
    /// The host restarted the handshake; not a fault
    Announce,
    /// Reading, dispatching or writing failed
    Fault(BusError),
}

impl SessionEnd {
    pub fn event(&self) -> LinkEvent {
        match self {
            SessionEnd::Announce => LinkEvent::AnnounceReceived,
            SessionEnd::Fault(_) => LinkEvent::Fault,
        }
    }

    pub fn fault(&self) -> Option<BusError> {
        match self {
            SessionEnd::Fault(e) => Some(*e),
            SessionEnd::Announce => None,
        }
    }
}
