//! Build-time configuration
//!
//! Constants generated by `build.rs` from `bus.toml`.

use hullbus_core::config::{LinkConfig, StatusLedConfig};

include!(concat!(env!("OUT_DIR"), "/bus_config.rs"));
