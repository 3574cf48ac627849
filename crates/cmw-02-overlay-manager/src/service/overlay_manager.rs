//! # Overlay Manager
//!
//! Applies overlay and feature operations to the [`OverlayTree`], drives the
//! map engine for every effective visibility change, reports failures and
//! notifies tree observers after structural changes.
//!
//! Observers get a detached snapshot and run while the manager is borrowed,
//! so they cannot mutate the tree directly. To change it they publish a
//! message, which the bus delivers after the current operation.

use crate::domain::{
    EngineHandle, Feature, FeatureDescriptor, FeatureSource, Overlay, OverlayNode, OverlayTree,
    VisibilityChange,
};
use crate::error::TreeError;
use crate::ports::{ErrorReporter, FeatureApi, MapEngine, OverlayApi, PlotRequest, PlotUrlRequest};
use cmw_01_channels::topics::{
    MAP_FEATURE_HIDE, MAP_FEATURE_PLOT, MAP_FEATURE_PLOT_URL, MAP_FEATURE_SHOW,
    MAP_FEATURE_UNPLOT, MAP_FEATURE_UPDATE, MAP_OVERLAY_HIDE, MAP_OVERLAY_SHOW,
    MAP_OVERLAY_UPDATE,
};
use shared_types::{FeatureFormat, OverlayId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Observer of structural tree changes.
pub type TreeChangeHandler = Box<dyn Fn(&[OverlayNode]) + Send + Sync>;

/// Owner of the overlay/feature tree.
pub struct OverlayManager<E: MapEngine, R: ErrorReporter> {
    tree: OverlayTree,
    engine: Arc<E>,
    reporter: Arc<R>,
    observers: Vec<TreeChangeHandler>,
}

impl<E: MapEngine, R: ErrorReporter> OverlayManager<E, R> {
    pub fn new(engine: Arc<E>, reporter: Arc<R>) -> Self {
        Self {
            tree: OverlayTree::new(),
            engine,
            reporter,
            observers: Vec::new(),
        }
    }

    /// Register an observer. Observers cannot be removed.
    pub fn bind_tree_change_handler<F>(&mut self, handler: F)
    where
        F: Fn(&[OverlayNode]) + Send + Sync + 'static,
    {
        self.observers.push(Box::new(handler));
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    #[must_use]
    pub fn tree(&self) -> &OverlayTree {
        &self.tree
    }

    #[must_use]
    pub fn overlays(&self) -> &HashMap<OverlayId, Overlay> {
        self.tree.overlays()
    }

    #[must_use]
    pub fn overlay(&self, id: &str) -> Option<&Overlay> {
        self.tree.get(id)
    }

    /// Detached copy of the whole forest.
    #[must_use]
    pub fn overlay_tree(&self) -> Vec<OverlayNode> {
        self.tree.snapshot()
    }

    #[must_use]
    pub fn locate(&self, handle: EngineHandle) -> Option<&Feature> {
        self.tree.locate(handle)
    }

    #[must_use]
    pub fn engine(&self) -> &Arc<E> {
        &self.engine
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    fn fail(&self, sender: &str, topic: &'static str, error: TreeError) -> Result<(), TreeError> {
        warn!(sender = sender, topic = topic, error = %error, "Tree operation failed");
        self.reporter.report(sender, topic, &error);
        Err(error)
    }

    fn apply(&self, changes: impl IntoIterator<Item = VisibilityChange>) {
        for change in changes {
            match change {
                VisibilityChange::Hide(handle) => self.engine.hide(handle),
                VisibilityChange::Show(handle) => self.engine.show(handle),
            }
        }
    }

    fn notify(&self) {
        if self.observers.is_empty() {
            return;
        }
        let snapshot = self.tree.snapshot();
        for observer in &self.observers {
            observer(&snapshot);
        }
    }

    fn unplot_all(&self, features: Vec<Feature>) {
        for feature in features {
            debug!(
                overlay_id = %feature.overlay_id,
                feature_id = %feature.id,
                handle = %feature.handle,
                "Unplotting feature"
            );
            self.engine.unplot(feature.handle);
        }
    }

    /// Shared body of both plot operations.
    fn plot(
        &mut self,
        sender: &str,
        topic: &'static str,
        format: &str,
        partial: impl FnOnce(FeatureFormat) -> FeatureDescriptor,
    ) -> Result<(), TreeError> {
        let format = match format.parse::<FeatureFormat>() {
            Ok(format) if self.engine.supported_formats().contains(&format) => format,
            _ => {
                return self.fail(
                    sender,
                    topic,
                    TreeError::UnsupportedFormat {
                        format: format.to_string(),
                    },
                )
            }
        };
        let descriptor = partial(format);
        let overlay_id = descriptor.overlay_id.clone();
        let feature_id = descriptor.feature_id.clone();

        if !self.tree.contains(&overlay_id) {
            debug!(overlay_id = %overlay_id, "Creating overlay for plotted feature");
            let changes = self.tree.insert_overlay(&overlay_id, &overlay_id, None);
            self.apply(changes);
        }

        if self.tree.feature(&overlay_id, &feature_id).is_some() {
            debug!(overlay_id = %overlay_id, feature_id = %feature_id, "Replacing feature");
            if let Ok(old) = self.tree.remove_feature(&overlay_id, &feature_id) {
                self.unplot_all(vec![old]);
            }
        }

        let handle = match self.engine.plot(&descriptor) {
            Ok(handle) => handle,
            Err(e) => {
                self.notify();
                return self.fail(sender, topic, e.into());
            }
        };
        debug!(
            overlay_id = %overlay_id,
            feature_id = %feature_id,
            handle = %handle,
            "Feature plotted"
        );

        match self.tree.insert_feature(Feature::new(descriptor, handle)) {
            Ok(change) => self.apply(change),
            Err(e) => {
                self.engine.unplot(handle);
                return self.fail(sender, topic, e);
            }
        }
        self.notify();
        Ok(())
    }
}

impl<E: MapEngine, R: ErrorReporter> OverlayApi for OverlayManager<E, R> {
    fn create_overlay(
        &mut self,
        sender: &str,
        id: &str,
        name: Option<&str>,
        parent_id: Option<&str>,
    ) -> Result<(), TreeError> {
        if self.tree.contains(id) {
            debug!(overlay_id = id, "Overlay exists; updating");
            return self.update_overlay(sender, id, name, parent_id);
        }

        let name = name.filter(|n| !n.is_empty()).unwrap_or(id);
        debug!(sender = sender, overlay_id = id, parent_id = ?parent_id, "Creating overlay");
        let changes = self.tree.insert_overlay(id, name, parent_id);
        self.apply(changes);
        self.notify();
        Ok(())
    }

    fn remove_overlay(&mut self, sender: &str, id: &str) -> Result<(), TreeError> {
        if !self.tree.contains(id) {
            debug!(sender = sender, overlay_id = id, "Remove of unknown overlay ignored");
            return Ok(());
        }

        debug!(sender = sender, overlay_id = id, "Removing overlay");
        let features = self.tree.remove_overlay(id);
        self.unplot_all(features);
        self.notify();
        Ok(())
    }

    fn update_overlay(
        &mut self,
        sender: &str,
        id: &str,
        name: Option<&str>,
        parent_id: Option<&str>,
    ) -> Result<(), TreeError> {
        let Some(overlay) = self.tree.get(id) else {
            return self.fail(
                sender,
                MAP_OVERLAY_UPDATE,
                TreeError::OverlayNotFound { id: id.to_string() },
            );
        };
        let current_parent = overlay.parent_id.clone();

        if let Some(name) = name.filter(|n| !n.is_empty()) {
            self.tree.rename(id, name);
        }

        if let Some(parent) = parent_id.filter(|p| !p.is_empty()) {
            if current_parent.as_deref() != Some(parent) {
                debug!(overlay_id = id, parent_id = parent, "Reparenting overlay");
                let changes = self.tree.set_parent(id, Some(parent));
                self.apply(changes);
            }
        }

        self.notify();
        Ok(())
    }

    fn hide_overlay(&mut self, sender: &str, id: &str) -> Result<(), TreeError> {
        if !self.tree.contains(id) {
            return self.fail(
                sender,
                MAP_OVERLAY_HIDE,
                TreeError::OverlayNotFound { id: id.to_string() },
            );
        }
        let changes = self.tree.set_overlay_hidden(id, true);
        debug!(overlay_id = id, engine_calls = changes.len(), "Overlay hidden");
        self.apply(changes);
        Ok(())
    }

    fn show_overlay(&mut self, sender: &str, id: &str) -> Result<(), TreeError> {
        if !self.tree.contains(id) {
            return self.fail(
                sender,
                MAP_OVERLAY_SHOW,
                TreeError::OverlayNotFound { id: id.to_string() },
            );
        }
        let changes = self.tree.set_overlay_hidden(id, false);
        debug!(overlay_id = id, engine_calls = changes.len(), "Overlay shown");
        self.apply(changes);
        Ok(())
    }
}

impl<E: MapEngine, R: ErrorReporter> FeatureApi for OverlayManager<E, R> {
    fn plot_feature(&mut self, sender: &str, request: PlotRequest) -> Result<(), TreeError> {
        let PlotRequest {
            overlay_id,
            feature_id,
            name,
            format,
            feature,
            zoom,
        } = request;
        self.plot(sender, MAP_FEATURE_PLOT, &format, |format| FeatureDescriptor {
            name: name.filter(|n| !n.is_empty()).unwrap_or_else(|| feature_id.clone()),
            overlay_id,
            feature_id,
            format,
            source: FeatureSource::Data(feature),
            zoom,
        })
    }

    fn plot_feature_url(
        &mut self,
        sender: &str,
        request: PlotUrlRequest,
    ) -> Result<(), TreeError> {
        let PlotUrlRequest {
            overlay_id,
            feature_id,
            name,
            format,
            url,
            params,
            zoom,
        } = request;
        self.plot(sender, MAP_FEATURE_PLOT_URL, &format, |format| FeatureDescriptor {
            name: name.filter(|n| !n.is_empty()).unwrap_or_else(|| feature_id.clone()),
            overlay_id,
            feature_id,
            format,
            source: FeatureSource::Url { url, params },
            zoom,
        })
    }

    fn delete_feature(
        &mut self,
        sender: &str,
        overlay_id: &str,
        feature_id: &str,
    ) -> Result<(), TreeError> {
        match self.tree.remove_feature(overlay_id, feature_id) {
            Ok(feature) => {
                self.unplot_all(vec![feature]);
                self.notify();
                Ok(())
            }
            Err(e) => self.fail(sender, MAP_FEATURE_UNPLOT, e),
        }
    }

    fn hide_feature(
        &mut self,
        sender: &str,
        overlay_id: &str,
        feature_id: &str,
    ) -> Result<(), TreeError> {
        match self.tree.set_feature_hidden(overlay_id, feature_id, true) {
            Ok(change) => {
                self.apply(change);
                Ok(())
            }
            Err(e) => self.fail(sender, MAP_FEATURE_HIDE, e),
        }
    }

    fn show_feature(
        &mut self,
        sender: &str,
        overlay_id: &str,
        feature_id: &str,
        zoom: bool,
    ) -> Result<(), TreeError> {
        match self.tree.set_feature_hidden(overlay_id, feature_id, false) {
            Ok(change) => {
                self.apply(change);
                if zoom {
                    if let Some(feature) = self.tree.feature(overlay_id, feature_id) {
                        self.engine.zoom_to(feature.handle);
                    }
                }
                Ok(())
            }
            Err(e) => self.fail(sender, MAP_FEATURE_SHOW, e),
        }
    }

    fn update_feature(
        &mut self,
        sender: &str,
        overlay_id: &str,
        feature_id: &str,
        name: Option<&str>,
        new_overlay_id: Option<&str>,
    ) -> Result<(), TreeError> {
        let target = new_overlay_id.filter(|n| !n.is_empty() && *n != overlay_id);
        let checked = self.tree.require_feature(overlay_id, feature_id).and_then(|_| {
            match target {
                Some(target) if !self.tree.contains(target) => Err(TreeError::OwnerOverlayNotFound {
                    id: target.to_string(),
                }),
                _ => Ok(()),
            }
        });
        if let Err(e) = checked {
            return self.fail(sender, MAP_FEATURE_UPDATE, e);
        }

        if let Some(name) = name.filter(|n| !n.is_empty()) {
            if let Err(e) = self.tree.rename_feature(overlay_id, feature_id, name) {
                return self.fail(sender, MAP_FEATURE_UPDATE, e);
            }
        }

        if let Some(target) = target {
            debug!(
                overlay_id = overlay_id,
                feature_id = feature_id,
                new_overlay_id = target,
                "Moving feature"
            );
            match self.tree.move_feature(overlay_id, feature_id, target) {
                Ok(moved) => {
                    if let Some(displaced) = moved.displaced {
                        debug!(overlay_id = target, feature_id = feature_id, "Replacing feature");
                        self.unplot_all(vec![displaced]);
                    }
                    self.apply(moved.change);
                }
                Err(e) => return self.fail(sender, MAP_FEATURE_UPDATE, e),
            }
        }

        self.notify();
        Ok(())
    }
}
