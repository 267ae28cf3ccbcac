//! # Aval Telemetry
//!
//! Logging setup shared by the registry binaries.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use aval_telemetry::{init_logging, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     init_logging(&TelemetryConfig::from_env())?;
//!     // events from aval-registry are now emitted
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `AVAL_LOG_LEVEL` / `RUST_LOG` | `info` | Level filter or directive |
//! | `AVAL_JSON_LOGS` | `false` | JSON lines instead of plain text |
//! | `AVAL_SERVICE_NAME` | `aval-registry` | Service name |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::{env_filter, init_logging};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Global subscriber already installed: {0}")]
    AlreadyInitialized(String),
}
