//! Inbound Ports (Driving Ports)
//!
//! Every operation takes the id of the widget that asked for it, used when
//! reporting failures. Operations report their own failures and then return
//! them, so callers may inspect or ignore the result.

use crate::error::TreeError;
use cmw_01_channels::messages::{FeaturePlot, FeaturePlotUrl};
use serde_json::Value;
use shared_types::{FeatureId, OverlayId};

/// Plot a feature from inline data.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotRequest {
    pub overlay_id: OverlayId,
    pub feature_id: FeatureId,
    /// Defaults to the feature id.
    pub name: Option<String>,
    /// Wire name; parsed by the manager.
    pub format: String,
    pub feature: Value,
    pub zoom: bool,
}

impl From<FeaturePlot> for PlotRequest {
    fn from(msg: FeaturePlot) -> Self {
        Self {
            overlay_id: msg.overlay_id,
            feature_id: msg.feature_id,
            name: Some(msg.name),
            format: msg.format,
            feature: msg.feature,
            zoom: msg.zoom,
        }
    }
}

/// Plot a feature the engine fetches from a URL.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotUrlRequest {
    pub overlay_id: OverlayId,
    pub feature_id: FeatureId,
    pub name: Option<String>,
    pub format: String,
    pub url: String,
    pub params: Option<Value>,
    pub zoom: bool,
}

impl From<FeaturePlotUrl> for PlotUrlRequest {
    fn from(msg: FeaturePlotUrl) -> Self {
        Self {
            overlay_id: msg.overlay_id,
            feature_id: msg.feature_id,
            name: Some(msg.name),
            format: msg.format,
            url: msg.url,
            params: msg.params,
            zoom: msg.zoom,
        }
    }
}

/// Overlay operations.
pub trait OverlayApi {
    /// Create an overlay. An existing id is updated instead.
    fn create_overlay(
        &mut self,
        sender: &str,
        id: &str,
        name: Option<&str>,
        parent_id: Option<&str>,
    ) -> Result<(), TreeError>;

    /// Remove an overlay, its descendants and all their features.
    ///
    /// Removing an unknown id does nothing and reports nothing.
    fn remove_overlay(&mut self, sender: &str, id: &str) -> Result<(), TreeError>;

    /// Rename and/or reparent an overlay.
    fn update_overlay(
        &mut self,
        sender: &str,
        id: &str,
        name: Option<&str>,
        parent_id: Option<&str>,
    ) -> Result<(), TreeError>;

    fn hide_overlay(&mut self, sender: &str, id: &str) -> Result<(), TreeError>;

    fn show_overlay(&mut self, sender: &str, id: &str) -> Result<(), TreeError>;
}

/// Feature operations.
pub trait FeatureApi {
    /// Plot inline data, replacing any feature with the same id.
    fn plot_feature(&mut self, sender: &str, request: PlotRequest) -> Result<(), TreeError>;

    /// Plot from a URL, replacing any feature with the same id.
    fn plot_feature_url(&mut self, sender: &str, request: PlotUrlRequest)
        -> Result<(), TreeError>;

    fn delete_feature(
        &mut self,
        sender: &str,
        overlay_id: &str,
        feature_id: &str,
    ) -> Result<(), TreeError>;

    fn hide_feature(
        &mut self,
        sender: &str,
        overlay_id: &str,
        feature_id: &str,
    ) -> Result<(), TreeError>;

    fn show_feature(
        &mut self,
        sender: &str,
        overlay_id: &str,
        feature_id: &str,
        zoom: bool,
    ) -> Result<(), TreeError>;

    /// Rename a feature and/or move it to another overlay.
    fn update_feature(
        &mut self,
        sender: &str,
        overlay_id: &str,
        feature_id: &str,
        name: Option<&str>,
        new_overlay_id: Option<&str>,
    ) -> Result<(), TreeError>;
}
