//! Detached tree snapshots handed to tree-change observers.

use super::entities::{EngineHandle, Feature, Overlay};
use serde::Serialize;
use shared_types::{FeatureFormat, FeatureId, OverlayId};

/// An overlay and everything under it, copied out of the tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayNode {
    pub id: OverlayId,
    pub name: String,
    pub parent_id: Option<OverlayId>,
    pub is_hidden: bool,
    pub hidden_explicitly: bool,
    pub features: Vec<FeatureNode>,
    pub children: Vec<OverlayNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureNode {
    pub id: FeatureId,
    pub overlay_id: OverlayId,
    pub name: String,
    pub format: FeatureFormat,
    pub handle: EngineHandle,
    pub is_hidden: bool,
    pub hidden_explicitly: bool,
}

impl OverlayNode {
    pub(crate) fn from_overlay(overlay: &Overlay, children: Vec<OverlayNode>) -> Self {
        Self {
            id: overlay.id.clone(),
            name: overlay.name.clone(),
            parent_id: overlay.parent_id.clone(),
            is_hidden: overlay.is_hidden,
            hidden_explicitly: overlay.hidden_explicitly,
            features: overlay.features.values().map(FeatureNode::from).collect(),
            children,
        }
    }

    /// This overlay plus all descendants.
    #[must_use]
    pub fn count_overlays(&self) -> usize {
        1 + self.children.iter().map(OverlayNode::count_overlays).sum::<usize>()
    }

    /// Features held by this overlay and all descendants.
    #[must_use]
    pub fn count_features(&self) -> usize {
        self.features.len()
            + self
                .children
                .iter()
                .map(OverlayNode::count_features)
                .sum::<usize>()
    }

    /// Depth-first search for an overlay by id.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&OverlayNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }
}

impl From<&Feature> for FeatureNode {
    fn from(feature: &Feature) -> Self {
        Self {
            id: feature.id.clone(),
            overlay_id: feature.overlay_id.clone(),
            name: feature.name.clone(),
            format: feature.format,
            handle: feature.handle,
            is_hidden: feature.is_hidden,
            hidden_explicitly: feature.hidden_explicitly,
        }
    }
}
