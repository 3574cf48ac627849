//! # Overlay Tree
//!
//! Arena storage for the overlay forest. Every traversal runs in two phases:
//! collect ids first, then mutate, so no borrow of one node is held while
//! another is updated.
//!
//! ## Invariants
//!
//! - Overlay ids are unique; feature ids are unique within their owner.
//! - `overlay.is_hidden == overlay.hidden_explicitly || parent.is_hidden`
//! - `feature.is_hidden == feature.hidden_explicitly || owner.is_hidden`
//! - A parent that does not exist yet leaves the child orphaned until an
//!   overlay with that id is created, which then adopts it.
//!
//! Reparenting is not checked for cycles. A cycle is logged and every
//! traversal carries a visited set, so walks always terminate.

use super::entities::{Feature, FeatureMove, Overlay, VisibilityChange};
use super::snapshot::OverlayNode;
use super::EngineHandle;
use crate::error::TreeError;
use shared_types::OverlayId;
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::{debug, warn};

/// The overlay forest.
#[derive(Debug, Default, Clone)]
pub struct OverlayTree {
    overlays: HashMap<OverlayId, Overlay>,
}

impl OverlayTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.overlays.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.overlays.contains_key(id)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Overlay> {
        self.overlays.get(id)
    }

    /// All overlays, keyed by id.
    #[must_use]
    pub fn overlays(&self) -> &HashMap<OverlayId, Overlay> {
        &self.overlays
    }

    #[must_use]
    pub fn feature(&self, overlay_id: &str, feature_id: &str) -> Option<&Feature> {
        self.overlays.get(overlay_id)?.features.get(feature_id)
    }

    /// Like [`OverlayTree::feature`], but tells a missing owner from a
    /// missing feature.
    pub fn require_feature(&self, overlay_id: &str, feature_id: &str) -> Result<&Feature, TreeError> {
        self.owner(overlay_id)?
            .features
            .get(feature_id)
            .ok_or_else(|| not_found(overlay_id, feature_id))
    }

    /// Find the feature an engine handle belongs to.
    #[must_use]
    pub fn locate(&self, handle: EngineHandle) -> Option<&Feature> {
        self.overlays
            .values()
            .flat_map(|overlay| overlay.features.values())
            .find(|feature| feature.handle == handle)
    }

    // =========================================================================
    // OVERLAYS
    // =========================================================================

    /// Insert a new overlay. The caller checks the id is not taken.
    ///
    /// Orphans waiting for this id are adopted.
    pub fn insert_overlay(
        &mut self,
        id: &str,
        name: &str,
        parent_id: Option<&str>,
    ) -> Vec<VisibilityChange> {
        let mut overlay = Overlay::new(id, name, parent_id.map(str::to_string));

        let orphans: Vec<OverlayId> = self
            .overlays
            .values()
            .filter(|o| o.parent_id.as_deref() == Some(id))
            .map(|o| o.id.clone())
            .collect();
        for orphan in orphans {
            debug!(overlay_id = id, child_id = %orphan, "Adopting orphaned overlay");
            overlay.children.insert(orphan);
        }

        if let Some(parent) = parent_id {
            match self.overlays.get_mut(parent) {
                Some(p) => {
                    p.children.insert(id.to_string());
                }
                None => debug!(overlay_id = id, parent_id = parent, "Parent not present yet"),
            }
        }

        self.overlays.insert(id.to_string(), overlay);

        if let Some(parent) = parent_id {
            if self.ancestors_contain(parent, id) {
                warn!(overlay_id = id, parent_id = parent, "Overlay hierarchy contains a cycle");
            }
        }

        self.recompute(id)
    }

    /// Rename an overlay. Returns false if it does not exist.
    pub fn rename(&mut self, id: &str, name: &str) -> bool {
        match self.overlays.get_mut(id) {
            Some(overlay) => {
                overlay.name = name.to_string();
                true
            }
            None => false,
        }
    }

    /// Move an overlay under a new parent, or to the root with `None`.
    pub fn set_parent(&mut self, id: &str, parent_id: Option<&str>) -> Vec<VisibilityChange> {
        let Some(old_parent) = self.overlays.get(id).map(|o| o.parent_id.clone()) else {
            return Vec::new();
        };

        if let Some(old) = old_parent.as_deref() {
            if let Some(p) = self.overlays.get_mut(old) {
                p.children.remove(id);
            }
        }

        if let Some(new) = parent_id {
            if self.ancestors_contain(new, id) {
                warn!(overlay_id = id, parent_id = new, "Reparent creates a cycle");
            }
            if let Some(p) = self.overlays.get_mut(new) {
                p.children.insert(id.to_string());
            }
        }

        if let Some(overlay) = self.overlays.get_mut(id) {
            overlay.parent_id = parent_id.map(str::to_string);
        }

        self.recompute(id)
    }

    /// Set an overlay's own hidden flag and cascade.
    pub fn set_overlay_hidden(&mut self, id: &str, hidden: bool) -> Vec<VisibilityChange> {
        match self.overlays.get_mut(id) {
            Some(overlay) => overlay.hidden_explicitly = hidden,
            None => return Vec::new(),
        }
        self.recompute(id)
    }

    /// Remove an overlay and all its descendants.
    ///
    /// Returns every feature that was removed, for the caller to unplot.
    pub fn remove_overlay(&mut self, id: &str) -> Vec<Feature> {
        let order = self.subtree(id);
        if order.is_empty() {
            return Vec::new();
        }

        let parent = self.overlays.get(id).and_then(|o| o.parent_id.clone());
        if let Some(parent) = parent {
            if let Some(p) = self.overlays.get_mut(&parent) {
                p.children.remove(id);
            }
        }

        let mut removed = Vec::new();
        for overlay_id in order {
            if let Some(overlay) = self.overlays.remove(&overlay_id) {
                removed.extend(overlay.features.into_values());
            }
        }
        removed
    }

    // =========================================================================
    // FEATURES
    // =========================================================================

    /// Attach a feature to its owner.
    ///
    /// Returns a hide if the owner is effectively hidden; engines draw new
    /// features visible.
    pub fn insert_feature(
        &mut self,
        mut feature: Feature,
    ) -> Result<Option<VisibilityChange>, TreeError> {
        let owner = self
            .overlays
            .get_mut(&feature.overlay_id)
            .ok_or_else(|| TreeError::OwnerOverlayNotFound {
                id: feature.overlay_id.clone(),
            })?;

        feature.is_hidden = feature.hidden_explicitly || owner.is_hidden;
        let change = feature
            .is_hidden
            .then_some(VisibilityChange::Hide(feature.handle));
        owner.features.insert(feature.id.clone(), feature);
        Ok(change)
    }

    pub fn remove_feature(&mut self, overlay_id: &str, feature_id: &str) -> Result<Feature, TreeError> {
        self.owner_mut(overlay_id)?
            .features
            .remove(feature_id)
            .ok_or_else(|| not_found(overlay_id, feature_id))
    }

    pub fn rename_feature(
        &mut self,
        overlay_id: &str,
        feature_id: &str,
        name: &str,
    ) -> Result<(), TreeError> {
        let feature = self.feature_mut(overlay_id, feature_id)?;
        feature.name = name.to_string();
        Ok(())
    }

    /// Set a feature's own hidden flag.
    pub fn set_feature_hidden(
        &mut self,
        overlay_id: &str,
        feature_id: &str,
        hidden: bool,
    ) -> Result<Option<VisibilityChange>, TreeError> {
        let owner_hidden = self.owner(overlay_id)?.is_hidden;
        let feature = self.feature_mut(overlay_id, feature_id)?;
        feature.hidden_explicitly = hidden;
        Ok(refresh(feature, owner_hidden))
    }

    /// Move a feature to another overlay, keeping its own hidden flag.
    ///
    /// A feature with the same id already in the target is replaced and
    /// handed back; the caller owns its engine handle from then on.
    pub fn move_feature(
        &mut self,
        overlay_id: &str,
        feature_id: &str,
        new_overlay_id: &str,
    ) -> Result<FeatureMove, TreeError> {
        if overlay_id == new_overlay_id {
            self.feature_mut(overlay_id, feature_id)?;
            return Ok(FeatureMove::default());
        }
        let target_hidden = self.owner(new_overlay_id)?.is_hidden;
        let mut feature = self.remove_feature(overlay_id, feature_id)?;

        feature.overlay_id = new_overlay_id.to_string();
        let change = refresh(&mut feature, target_hidden);
        let displaced = self
            .owner_mut(new_overlay_id)?
            .features
            .insert(feature.id.clone(), feature);
        Ok(FeatureMove { change, displaced })
    }

    // =========================================================================
    // SNAPSHOT
    // =========================================================================

    /// Detached copy of the forest, roots sorted by id.
    ///
    /// Overlays unreachable from any root (only possible through a cycle) are
    /// listed as extra roots.
    #[must_use]
    pub fn snapshot(&self) -> Vec<OverlayNode> {
        let mut roots: Vec<&Overlay> = self
            .overlays
            .values()
            .filter(|o| {
                o.parent_id
                    .as_deref()
                    .map_or(true, |parent| !self.overlays.contains_key(parent))
            })
            .collect();
        roots.sort_by(|a, b| a.id.cmp(&b.id));

        let mut visited = HashSet::new();
        let mut nodes: Vec<OverlayNode> = roots
            .into_iter()
            .map(|root| self.node(root, &mut visited))
            .collect();

        let mut stranded: Vec<&Overlay> = self
            .overlays
            .values()
            .filter(|o| !visited.contains(o.id.as_str()))
            .collect();
        stranded.sort_by(|a, b| a.id.cmp(&b.id));
        for overlay in stranded {
            // an earlier stranded overlay may have reached this one
            if !visited.contains(overlay.id.as_str()) {
                nodes.push(self.node(overlay, &mut visited));
            }
        }
        nodes
    }

    fn node<'a>(&'a self, overlay: &'a Overlay, visited: &mut HashSet<&'a str>) -> OverlayNode {
        visited.insert(overlay.id.as_str());
        let mut children = Vec::new();
        for child in overlay.children.iter().filter_map(|id| self.overlays.get(id)) {
            if visited.contains(child.id.as_str()) {
                continue;
            }
            children.push(self.node(child, visited));
        }
        OverlayNode::from_overlay(overlay, children)
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    /// Breadth-first ids of `root` and its descendants, `root` first.
    fn subtree(&self, root: &str) -> Vec<OverlayId> {
        if !self.overlays.contains_key(root) {
            return Vec::new();
        }
        let mut order = Vec::new();
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([root.to_string()]);
        while let Some(id) = queue.pop_front() {
            if !seen.insert(id.clone()) {
                continue;
            }
            if let Some(overlay) = self.overlays.get(&id) {
                queue.extend(overlay.children.iter().cloned());
                order.push(id);
            }
        }
        order
    }

    /// Whether walking up from `start` reaches `target` (inclusive).
    fn ancestors_contain(&self, start: &str, target: &str) -> bool {
        let mut seen = HashSet::new();
        let mut current = Some(start.to_string());
        while let Some(id) = current {
            if id == target {
                return true;
            }
            if !seen.insert(id.clone()) {
                return false;
            }
            current = self.overlays.get(&id).and_then(|o| o.parent_id.clone());
        }
        false
    }

    /// Recompute effective visibility below `root`.
    fn recompute(&mut self, root: &str) -> Vec<VisibilityChange> {
        let order = self.subtree(root);
        let mut computed: HashMap<OverlayId, bool> = HashMap::with_capacity(order.len());
        let mut changes = Vec::new();

        for id in &order {
            let parent_hidden = match self.overlays.get(id).and_then(|o| o.parent_id.as_deref()) {
                Some(parent) if order.iter().any(|id| id == parent) => {
                    computed.get(parent).copied().unwrap_or(false)
                }
                Some(parent) => self.overlays.get(parent).is_some_and(|p| p.is_hidden),
                None => false,
            };

            let Some(overlay) = self.overlays.get_mut(id) else {
                continue;
            };
            overlay.is_hidden = overlay.hidden_explicitly || parent_hidden;
            computed.insert(id.clone(), overlay.is_hidden);

            let overlay_hidden = overlay.is_hidden;
            changes.extend(
                overlay
                    .features
                    .values_mut()
                    .filter_map(|feature| refresh(feature, overlay_hidden)),
            );
        }
        changes
    }

    fn owner(&self, overlay_id: &str) -> Result<&Overlay, TreeError> {
        self.overlays
            .get(overlay_id)
            .ok_or_else(|| TreeError::OwnerOverlayNotFound {
                id: overlay_id.to_string(),
            })
    }

    fn owner_mut(&mut self, overlay_id: &str) -> Result<&mut Overlay, TreeError> {
        self.overlays
            .get_mut(overlay_id)
            .ok_or_else(|| TreeError::OwnerOverlayNotFound {
                id: overlay_id.to_string(),
            })
    }

    fn feature_mut(&mut self, overlay_id: &str, feature_id: &str) -> Result<&mut Feature, TreeError> {
        self.owner_mut(overlay_id)?
            .features
            .get_mut(feature_id)
            .ok_or_else(|| not_found(overlay_id, feature_id))
    }
}

fn not_found(overlay_id: &str, feature_id: &str) -> TreeError {
    TreeError::FeatureNotFound {
        feature_id: feature_id.to_string(),
        overlay_id: overlay_id.to_string(),
    }
}

/// Re-derive a feature's effective state; returns the engine call if it moved.
fn refresh(feature: &mut Feature, owner_hidden: bool) -> Option<VisibilityChange> {
    let hidden = feature.hidden_explicitly || owner_hidden;
    if hidden == feature.is_hidden {
        return None;
    }
    feature.is_hidden = hidden;
    Some(VisibilityChange::for_state(feature.handle, hidden))
}
