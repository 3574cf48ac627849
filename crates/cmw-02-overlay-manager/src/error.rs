//! Error types for the overlay manager

use crate::domain::EngineHandle;
use cmw_01_channels::ValidationError;
use thiserror::Error;

/// Failures of tree operations.
///
/// The `Display` text is the `msg` published on `map.error`.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TreeError {
    /// Target of an overlay operation does not exist.
    #[error("Overlay not found with id {id}")]
    OverlayNotFound { id: String },

    /// Owner overlay named by a feature operation does not exist.
    #[error("Overlay could not be found with id {id}")]
    OwnerOverlayNotFound { id: String },

    #[error("Feature could not be found with id {feature_id} and overlayId {overlay_id}")]
    FeatureNotFound {
        feature_id: String,
        overlay_id: String,
    },

    #[error("Unsupported format '{format}'")]
    UnsupportedFormat { format: String },

    #[error("{0}")]
    Engine(#[from] EngineError),
}

impl TreeError {
    /// Short machine-readable kind, carried in the `error` field of reports.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            TreeError::OverlayNotFound { .. } | TreeError::OwnerOverlayNotFound { .. } => {
                "overlay_not_found"
            }
            TreeError::FeatureNotFound { .. } => "feature_not_found",
            TreeError::UnsupportedFormat { .. } => "unsupported_format",
            TreeError::Engine(_) => "engine",
        }
    }
}

/// Failures raised by a map engine.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("Feature could not be plotted: {reason}")]
    PlotFailed { reason: String },

    #[error("No feature is plotted under engine handle {handle}")]
    UnknownHandle { handle: EngineHandle },

    #[error("Map engine error: {0}")]
    Other(String),
}

/// Invalid adapter configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0}")]
    InvalidMapType(#[from] ValidationError),

    #[error("Configuration value '{field}' must not be empty")]
    Empty { field: &'static str },
}
