//! Build script for hullbus-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates bus.toml and turns it into constants

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use hullbus_core::config::{BusConfig, ConfigError, LinkConfigError, SUPPORTED_BAUDRATES};

fn main() {
    setup_linker();
    let config = load_config();
    generate_config(&config);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Read, parse and validate bus.toml
fn load_config() -> BusConfig {
    println!("cargo:rerun-if-changed=bus.toml");

    let config_path = Path::new("bus.toml");
    if !config_path.exists() {
        fail(
            "bus.toml not found",
            &["The firmware requires a bus.toml next to Cargo.toml."],
        );
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read bus.toml", &[&e.to_string()]),
    };

    let config: BusConfig = match toml::from_str(&content) {
        Ok(config) => config,
        Err(e) => {
            let message = e.to_string();
            let lines: Vec<&str> = message.lines().collect();
            fail("Invalid bus.toml", &lines)
        }
    };

    if let Err(e) = config.validate() {
        fail("Invalid bus.toml", &[&describe(e)]);
    }

    println!("cargo:warning=bus.toml validated successfully");
    config
}

fn describe(error: ConfigError) -> String {
    match error {
        ConfigError::UnsupportedBaudrate(baud) => format!(
            "[uart] baudrate {} is not one of {:?}",
            baud, SUPPORTED_BAUDRATES
        ),
        ConfigError::ZeroBlinkTime => "[status_led] blink_ms must be above 0".to_string(),
        ConfigError::Link(LinkConfigError::ZeroTimeout) => {
            "[link] timeouts must all be above 0".to_string()
        }
        ConfigError::Link(LinkConfigError::TransferExceedsRead) => {
            "[link] transfer_timeout_ms must not exceed read_timeout_ms".to_string()
        }
    }
}

/// Abort the build with a boxed message
fn fail(title: &str, lines: &[&str]) -> ! {
    let body = lines
        .iter()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n");

    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title, body
    );
}

/// Write the validated settings as Rust constants into OUT_DIR
fn generate_config(config: &BusConfig) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let source = format!(
        "// Generated from bus.toml\n\
        pub const BAUDRATE: u32 = {baudrate};\n\
        pub const LINK: LinkConfig = LinkConfig {{\n    \
            read_timeout_ms: {read},\n    \
            transfer_timeout_ms: {transfer},\n    \
            connect_retry_ms: {retry},\n\
        }};\n\
        pub const STATUS_LED: StatusLedConfig = StatusLedConfig {{\n    \
            active_low: {active_low},\n    \
            blink_ms: {blink},\n\
        }};\n",
        baudrate = config.uart.baudrate,
        read = config.link.read_timeout_ms,
        transfer = config.link.transfer_timeout_ms,
        retry = config.link.connect_retry_ms,
        active_low = config.status_led.active_low,
        blink = config.status_led.blink_ms,
    );
    fs::write(out_dir.join("bus_config.rs"), source).unwrap();
}
