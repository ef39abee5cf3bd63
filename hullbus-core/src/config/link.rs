//! Link timing configuration

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Timeouts governing one bus connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LinkConfig {
    /// Longest silence tolerated while waiting for the next frame (ms)
    ///
    /// The host sends keepalives well inside this window; hitting it drops
    /// the connection.
    pub read_timeout_ms: u32,
    /// Bound on a frame write and on every worker queue hand-off (ms)
    pub transfer_timeout_ms: u32,
    /// Pause between failed handshake attempts (ms)
    pub connect_retry_ms: u32,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            read_timeout_ms: 1000,
            transfer_timeout_ms: 100,
            connect_retry_ms: 50,
        }
    }
}

/// Link configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkConfigError {
    /// A timeout is zero
    ZeroTimeout,
    /// Transfer timeout longer than the read timeout
    TransferExceedsRead,
}

impl LinkConfig {
    /// Check the timeouts are usable
    pub fn validate(&self) -> Result<(), LinkConfigError> {
        if self.read_timeout_ms == 0 || self.transfer_timeout_ms == 0 || self.connect_retry_ms == 0 {
            return Err(LinkConfigError::ZeroTimeout);
        }
        // A worker hand-off must finish before the host gives up on us
        if self.transfer_timeout_ms > self.read_timeout_ms {
            return Err(LinkConfigError::TransferExceedsRead);
        }
        Ok(())
    }
}
