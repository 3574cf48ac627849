//! Feature status subscriptions.
//!
//! A widget asks which numeric fields the plotted features carry
//! (`map.feature.status.request` answered by `map.feature.status.sublayers`),
//! then starts and stops value reports per field. Value changes outside any
//! active subscription are dropped.

use crate::domain::OverlayNode;
use crate::ports::MapEngine;
use cmw_01_channels::messages::FeatureSublayer;
use shared_types::{FeatureId, OverlayId};
use std::collections::HashSet;

type Key = (OverlayId, FeatureId, Option<String>);

/// Active `(overlayId, featureId, subfeatureId)` subscriptions.
///
/// A subscription without a subfeature covers every field of the feature.
#[derive(Debug, Default)]
pub(crate) struct StatusSubscriptions {
    active: HashSet<Key>,
}

impl StatusSubscriptions {
    /// Returns false if the subscription was already active.
    pub(crate) fn start(&mut self, overlay_id: &str, feature_id: &str, field: Option<&str>) -> bool {
        self.active.insert(key(overlay_id, feature_id, field))
    }

    /// Returns false if nothing was subscribed under that key.
    pub(crate) fn stop(&mut self, overlay_id: &str, feature_id: &str, field: Option<&str>) -> bool {
        self.active.remove(&key(overlay_id, feature_id, field))
    }

    pub(crate) fn is_active(&self, overlay_id: &str, feature_id: &str, field: &str) -> bool {
        self.active.contains(&key(overlay_id, feature_id, Some(field)))
            || self.active.contains(&key(overlay_id, feature_id, None))
    }

    /// Drop subscriptions whose feature is no longer in the tree.
    pub(crate) fn retain_plotted(&mut self, forest: &[OverlayNode]) {
        self.active.retain(|(overlay_id, feature_id, _)| {
            forest
                .iter()
                .filter_map(|root| root.find(overlay_id))
                .any(|overlay| overlay.features.iter().any(|f| &f.id == feature_id))
        });
    }

    pub(crate) fn len(&self) -> usize {
        self.active.len()
    }
}

fn key(overlay_id: &str, feature_id: &str, field: Option<&str>) -> Key {
    (
        overlay_id.to_string(),
        feature_id.to_string(),
        field.map(str::to_string),
    )
}

/// One entry per numeric field of every plotted feature, depth first.
pub(crate) fn sublayers<E: MapEngine + ?Sized>(
    engine: &E,
    forest: &[OverlayNode],
) -> Vec<FeatureSublayer> {
    let mut out = Vec::new();
    for root in forest {
        collect(engine, root, &mut out);
    }
    out
}

fn collect<E: MapEngine + ?Sized>(engine: &E, overlay: &OverlayNode, out: &mut Vec<FeatureSublayer>) {
    for feature in &overlay.features {
        for field in engine.numeric_fields(feature.handle) {
            out.push(FeatureSublayer {
                overlay_id: overlay.id.clone(),
                overlay_name: overlay.name.clone(),
                feature_id: feature.id.clone(),
                feature_name: feature.name.clone(),
                sublayer_id: field,
            });
        }
    }
    for child in &overlay.children {
        collect(engine, child, out);
    }
}
