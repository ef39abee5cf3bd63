//! Fixed-layout payloads
//!
//! All multi-byte fields are little-endian.

use crate::frame::FrameError;

fn expect_len(bytes: &[u8], expected: usize) -> Result<(), FrameError> {
    if bytes.len() != expected {
        return Err(FrameError::PayloadSizeMismatch {
            expected,
            actual: bytes.len(),
        });
    }
    Ok(())
}

/// Thruster setpoint request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ThrusterSet {
    /// Thruster index
    pub thruster: u8,
    /// Throttle in per-mille of full scale (-1000..=1000)
    pub throttle: i16,
}

impl ThrusterSet {
    pub const SIZE: usize = 3;

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let throttle = self.throttle.to_le_bytes();
        [self.thruster, throttle[0], throttle[1]]
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FrameError> {
        expect_len(bytes, Self::SIZE)?;
        Ok(Self {
            thruster: bytes[0],
            throttle: i16::from_le_bytes([bytes[1], bytes[2]]),
        })
    }

    /// Throttle limited to the valid per-mille range
    pub fn clamped_throttle(&self) -> i16 {
        self.throttle.clamp(-1000, 1000)
    }
}

/// Embedded controller status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EmbeddedStatus {
    /// Seconds since boot
    pub uptime_s: u32,
    /// Requests served by the embedded worker since boot
    pub requests: u32,
}

impl EmbeddedStatus {
    pub const SIZE: usize = 8;

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[..4].copy_from_slice(&self.uptime_s.to_le_bytes());
        bytes[4..].copy_from_slice(&self.requests.to_le_bytes());
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FrameError> {
        expect_len(bytes, Self::SIZE)?;
        Ok(Self {
            uptime_s: u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            requests: u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
        })
    }
}
