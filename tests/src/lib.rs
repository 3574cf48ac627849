//! # Common Map Widget Test Suite
//!
//! Cross-crate flows: several widgets attached to one in-memory bus, talking
//! over the CMWAPI 1.1 channels.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── fixtures.rs       # fake map engine, widget harness
//!     ├── channel_flows.rs  # channel layer between widgets
//!     └── map_flows.rs      # UI widgets driving map widgets
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p cmw-tests
//! cargo test -p cmw-tests integration::map_flows::
//! ```

pub mod integration;

use cmw_telemetry::{init_logging, TelemetryConfig};

/// Route test logs through the regular subscriber. Only the first call in a
/// test binary installs it.
pub fn init_test_logging() {
    let config = TelemetryConfig {
        log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string()),
        ..TelemetryConfig::default()
    };
    let _ = init_logging(&config);
}
