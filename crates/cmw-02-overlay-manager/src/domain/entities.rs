//! Overlays, features and engine handles

use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::{FeatureFormat, FeatureId, OverlayId};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Opaque reference to something the map engine has drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EngineHandle(pub u64);

impl fmt::Display for EngineHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where a feature's data comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureSource {
    /// Fetched by the engine from a URL.
    Url { url: String, params: Option<Value> },
    /// Carried inline (KML text, GeoJSON object, ...).
    Data(Value),
}

/// Everything an engine needs to draw a feature.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureDescriptor {
    pub overlay_id: OverlayId,
    pub feature_id: FeatureId,
    pub name: String,
    pub format: FeatureFormat,
    pub source: FeatureSource,
    pub zoom: bool,
}

/// A plotted feature.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub id: FeatureId,
    pub overlay_id: OverlayId,
    pub name: String,
    pub format: FeatureFormat,
    pub source: FeatureSource,
    pub handle: EngineHandle,
    /// Hidden by a feature-level hide.
    pub hidden_explicitly: bool,
    /// Effective state: own flag OR owner hidden.
    pub is_hidden: bool,
}

impl Feature {
    #[must_use]
    pub fn new(descriptor: FeatureDescriptor, handle: EngineHandle) -> Self {
        Self {
            id: descriptor.feature_id,
            overlay_id: descriptor.overlay_id,
            name: descriptor.name,
            format: descriptor.format,
            source: descriptor.source,
            handle,
            hidden_explicitly: false,
            is_hidden: false,
        }
    }
}

/// A node of the overlay forest.
///
/// Parent and children are held as ids; the [`OverlayTree`](super::OverlayTree)
/// owns every node.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub id: OverlayId,
    pub name: String,
    /// May name an overlay that does not exist (yet).
    pub parent_id: Option<OverlayId>,
    pub children: BTreeSet<OverlayId>,
    pub features: BTreeMap<FeatureId, Feature>,
    pub hidden_explicitly: bool,
    /// Effective state: own flag OR any ancestor hidden.
    pub is_hidden: bool,
}

impl Overlay {
    #[must_use]
    pub fn new(id: impl Into<OverlayId>, name: impl Into<String>, parent_id: Option<OverlayId>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parent_id,
            children: BTreeSet::new(),
            features: BTreeMap::new(),
            hidden_explicitly: false,
            is_hidden: false,
        }
    }
}

/// An engine call owed after a visibility recompute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityChange {
    Hide(EngineHandle),
    Show(EngineHandle),
}

impl VisibilityChange {
    #[must_use]
    pub fn for_state(handle: EngineHandle, hidden: bool) -> Self {
        if hidden {
            VisibilityChange::Hide(handle)
        } else {
            VisibilityChange::Show(handle)
        }
    }
}

/// Outcome of moving a feature between overlays.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureMove {
    /// Engine call owed for the moved feature.
    pub change: Option<VisibilityChange>,
    /// Same-id feature the move replaced in the target overlay.
    pub displaced: Option<Feature>,
}
