//! # Bloom Telemetry
//!
//! Logging setup shared by Shard-Bloom binaries.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bloom_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     init_telemetry(&TelemetryConfig::from_env()).expect("Failed to init telemetry");
//!     tracing::info!("ready");
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `BLOOM_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `BLOOM_JSON_LOGS` | `false` | JSON lines instead of pretty output |
//! | `BLOOM_SERVICE_NAME` | `shard-bloom` | Service name in logs |

mod config;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use tracing_setup::init_tracing;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to install tracing subscriber: {0}")]
    SubscriberInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging for a binary.
///
/// Fails if a global subscriber is already installed.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    init_tracing(config)?;
    tracing::info!(service = %config.service_name, "Telemetry initialized");
    Ok(())
}
