//! # CMW Telemetry
//!
//! Installs the process-wide `tracing` subscriber used by map widget hosts.
//! Library crates only emit events; binaries and test harnesses call
//! [`init_logging`] once at startup.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cmw_telemetry::{init_logging, TelemetryConfig};
//!
//! init_logging(&TelemetryConfig::from_env())?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `CMW_SERVICE_NAME` | `common-map-widget` | Service name on the startup line |
//! | `CMW_LOG_LEVEL` / `RUST_LOG` | `info` | Filter directive |
//! | `CMW_JSON_LOGS` | `false` | JSON output instead of pretty text |

#![warn(clippy::all)]

mod config;

pub use config::TelemetryConfig;

use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log filter '{directive}': {reason}")]
    Filter { directive: String, reason: String },

    #[error("Failed to install subscriber: {0}")]
    SubscriberInit(String),
}

/// Build the filter for a configuration.
pub fn env_filter(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(&config.log_level).map_err(|e| TelemetryError::Filter {
        directive: config.log_level.clone(),
        reason: e.to_string(),
    })
}

/// Install the global subscriber.
///
/// Fails if a global subscriber is already set.
pub fn init_logging(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let filter = env_filter(config)?;

    if config.json_logs {
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true);

        tracing_subscriber::registry()
            .with(filter)
            .with(json_layer)
            .try_init()
            .map_err(|e| TelemetryError::SubscriberInit(e.to_string()))?;
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TelemetryError::SubscriberInit(e.to_string()))?;
    }

    tracing::info!(
        service = %config.service_name,
        json_logs = config.json_logs,
        "Logging initialized"
    );
    Ok(())
}
