//! Pending exchange
//!
//! The outcome of the request being served: either a transaction response
//! or an error, plus the payload that goes with it. The value lives in the
//! serving session and is kept after the reply is sent so a corrupted reply
//! can be rebuilt byte for byte.

use hullbus_protocol::{
    create_error, create_response, ErrorDescriptor, FrameError, Message, Payload, Transaction,
};

use crate::error::BusError;

/// What an exchange resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum ExchangeKind {
    /// Nothing produced yet; never transmitted
    #[default]
    Empty,
    /// Answer with a response for this transaction
    Transaction(&'static Transaction),
    /// Answer with this error
    Error(&'static ErrorDescriptor),
}

/// One request's outcome and its owned payload
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PendingExchange {
    kind: ExchangeKind,
    payload: Option<Payload>,
}

impl PendingExchange {
    /// An empty exchange
    pub const fn new() -> Self {
        Self {
            kind: ExchangeKind::Empty,
            payload: None,
        }
    }

    /// Exchange answered by a transaction response
    pub fn for_transaction(transaction: &'static Transaction, payload: Option<Payload>) -> Self {
        Self {
            kind: ExchangeKind::Transaction(transaction),
            payload,
        }
    }

    /// Exchange answered by an error
    pub fn for_error(error: &'static ErrorDescriptor, payload: Option<Payload>) -> Self {
        Self {
            kind: ExchangeKind::Error(error),
            payload,
        }
    }

    /// Transaction response with a payload copied from `bytes`
    pub fn response(transaction: &'static Transaction, bytes: &[u8]) -> Result<Self, FrameError> {
        let payload = Payload::from_slice(bytes).map_err(|_| FrameError::PayloadTooLarge)?;
        Ok(Self::for_transaction(transaction, Some(payload)))
    }

    pub fn transaction(&self) -> Option<&'static Transaction> {
        match self.kind {
            ExchangeKind::Transaction(transaction) => Some(transaction),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&'static ErrorDescriptor> {
        match self.kind {
            ExchangeKind::Error(error) => Some(error),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.kind == ExchangeKind::Empty
    }

    /// Payload bytes; empty when no buffer is held
    pub fn payload(&self) -> &[u8] {
        self.payload.as_deref().unwrap_or(&[])
    }

    pub fn has_payload(&self) -> bool {
        self.payload.is_some()
    }

    /// Drop the outcome and release the payload
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Build the frame this exchange answers with
    pub fn to_message(&self) -> Result<Message, BusError> {
        let message = match self.kind {
            ExchangeKind::Transaction(transaction) => create_response(transaction, self.payload())?,
            ExchangeKind::Error(error) => create_error(error, self.payload())?,
            ExchangeKind::Empty => return Err(BusError::NoOutcome),
        };
        Ok(message)
    }
}
