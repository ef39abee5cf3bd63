//! Hardware configuration types
//!
//! Serial port and status LED settings for the bus controller board.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::link::{LinkConfig, LinkConfigError};

/// Baud rates the host side supports
pub const SUPPORTED_BAUDRATES: [u32; 4] = [9_600, 57_600, 115_200, 230_400];

/// Host serial port settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct UartSettings {
    /// Baud rate in bits per second
    pub baudrate: u32,
}

impl Default for UartSettings {
    fn default() -> Self {
        Self { baudrate: 115_200 }
    }
}

/// RGB status LED wiring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StatusLedConfig {
    /// LED channels are lit by driving the pin low
    pub active_low: bool,
    /// On and off time of one blink (ms)
    pub blink_ms: u32,
}

impl Default for StatusLedConfig {
    fn default() -> Self {
        Self {
            active_low: false,
            blink_ms: 150,
        }
    }
}

/// Complete bus controller configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BusConfig {
    pub uart: UartSettings,
    pub status_led: StatusLedConfig,
    pub link: LinkConfig,
}

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Baud rate not in [`SUPPORTED_BAUDRATES`]
    UnsupportedBaudrate(u32),
    /// Blink time of zero
    ZeroBlinkTime,
    /// Link timing is unusable
    Link(LinkConfigError),
}

impl From<LinkConfigError> for ConfigError {
    fn from(e: LinkConfigError) -> Self {
        ConfigError::Link(e)
    }
}

impl BusConfig {
    /// Validate every section
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !SUPPORTED_BAUDRATES.contains(&self.uart.baudrate) {
            return Err(ConfigError::UnsupportedBaudrate(self.uart.baudrate));
        }
        if self.status_led.blink_ms == 0 {
            return Err(ConfigError::ZeroBlinkTime);
        }
        self.link.validate()?;
        Ok(())
    }
}
