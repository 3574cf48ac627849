//! Outbound Ports (Driven Ports)

use crate::domain::{EngineHandle, FeatureDescriptor};
use crate::error::{EngineError, TreeError};
use cmw_01_channels::messages::{Bounds, LatLon};
use shared_types::FeatureFormat;

/// What the map currently shows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapView {
    pub bounds: Bounds,
    pub center: LatLon,
    /// Camera range in meters.
    pub range: f64,
}

/// The rendering engine behind the map.
pub trait MapEngine: Send + Sync {
    /// Draw a feature. New features are drawn visible.
    fn plot(&self, feature: &FeatureDescriptor) -> Result<EngineHandle, EngineError>;

    fn unplot(&self, handle: EngineHandle);

    fn hide(&self, handle: EngineHandle);

    fn show(&self, handle: EngineHandle);

    /// Center the view on a feature.
    fn zoom_to(&self, _handle: EngineHandle) {}

    /// Formats this engine can draw.
    fn supported_formats(&self) -> Vec<FeatureFormat> {
        FeatureFormat::ALL.to_vec()
    }

    fn view(&self) -> MapView;

    /// Fields of a plotted feature whose values are numeric and can be
    /// reported on `map.feature.status.report`.
    fn numeric_fields(&self, _handle: EngineHandle) -> Vec<String> {
        Vec::new()
    }
}

/// Sink for failures of tree operations.
pub trait ErrorReporter: Send + Sync {
    /// `error_type` is the topic the failed operation belongs to.
    fn report(&self, sender: &str, error_type: &str, error: &TreeError);
}
