//! # Map Adapter
//!
//! Glue between the CMWAPI channels, the overlay manager and the map engine.
//!
//! - Inbound: every overlay, feature and status-request message is forwarded
//!   record by record to the manager. Failures are already on `map.error` by
//!   the time the manager returns.
//! - Outbound: engine events become `map.feature.status.report`,
//!   `map.feature.selected` and `map.error` messages; status requests are
//!   answered from the engine and [`AdapterConfig`].
//! - Value reports flow only between `map.feature.status.start` and
//!   `map.feature.status.stop` for the same overlay, feature and field.
//!
//! Handlers hold the adapter weakly, so dropping the last `Arc<MapAdapter>`
//! turns them into no-ops. Call [`MapAdapter::unbind`] to unsubscribe.
//!
//! Tree observers run while the manager lock is held and must not lock it
//! again; publish a message instead.

use crate::adapters::feature_status::{self, StatusSubscriptions};
use crate::adapters::relay::UiRelay;
use crate::config::AdapterConfig;
use crate::domain::EngineHandle;
use crate::error::{EngineError, TreeError};
use crate::ports::{ErrorReporter, FeatureApi, MapEngine, OverlayApi};
use crate::service::OverlayManager;
use cmw_01_channels::messages::{
    FeaturePlot, FeaturePlotUrl, FeatureRef, FeatureSelected, FeatureShow, FeatureStatusReport,
    FeatureStatusRequest, FeatureStatusSubscription, FeatureUpdate, OverlayCreate, OverlayRef,
    OverlayUpdate, StatusAbout, StatusFormat, StatusRequest, StatusView,
};
use cmw_01_channels::topics::{
    MAP_ERROR, MAP_FEATURE_SELECTED, MAP_FEATURE_STATUS_REPORT, MAP_FEATURE_STATUS_START,
    MAP_FEATURE_STATUS_STOP,
};
use cmw_01_channels::{Channel, ErrorChannel, MapApi, Payload, RequestType};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// The overlay manager as shared by an adapter and its handlers.
pub type SharedManager<E> = Arc<Mutex<OverlayManager<E, ErrorChannel>>>;

/// Binds one map widget's channels to its engine.
pub struct MapAdapter<E: MapEngine> {
    api: MapApi,
    engine: Arc<E>,
    manager: SharedManager<E>,
    config: AdapterConfig,
    subscriptions: Mutex<StatusSubscriptions>,
}

impl<E: MapEngine + 'static> MapAdapter<E> {
    pub fn new(api: MapApi, engine: Arc<E>, config: AdapterConfig) -> Arc<Self> {
        let manager = OverlayManager::new(Arc::clone(&engine), Arc::clone(&api.error));
        Arc::new(Self {
            api,
            engine,
            manager: Arc::new(Mutex::new(manager)),
            config,
            subscriptions: Mutex::new(StatusSubscriptions::default()),
        })
    }

    #[must_use]
    pub fn api(&self) -> &MapApi {
        &self.api
    }

    #[must_use]
    pub fn manager(&self) -> SharedManager<E> {
        Arc::clone(&self.manager)
    }

    #[must_use]
    pub fn engine(&self) -> &Arc<E> {
        &self.engine
    }

    #[must_use]
    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    /// Outbound helpers publishing as this widget.
    #[must_use]
    pub fn relay(&self) -> UiRelay {
        UiRelay::new(self.api.clone())
    }

    // =========================================================================
    // INBOUND
    // =========================================================================

    /// Subscribe to every topic the map acts on.
    pub fn bind(self: &Arc<Self>) {
        let api = &self.api;

        self.on(&api.overlay.create, |a, sender, m: OverlayCreate| {
            a.manager.lock().create_overlay(
                sender,
                &m.overlay_id,
                Some(&m.name),
                m.parent_id.as_deref(),
            )
        });
        self.on(&api.overlay.remove, |a, sender, m: OverlayRef| {
            a.manager.lock().remove_overlay(sender, &m.overlay_id)
        });
        self.on(&api.overlay.hide, |a, sender, m: OverlayRef| {
            a.manager.lock().hide_overlay(sender, &m.overlay_id)
        });
        self.on(&api.overlay.show, |a, sender, m: OverlayRef| {
            a.manager.lock().show_overlay(sender, &m.overlay_id)
        });
        self.on(&api.overlay.update, |a, sender, m: OverlayUpdate| {
            a.manager.lock().update_overlay(
                sender,
                &m.overlay_id,
                m.name.as_deref(),
                m.parent_id.as_deref(),
            )
        });

        self.on(&api.feature.plot, |a, sender, m: FeaturePlot| {
            a.manager.lock().plot_feature(sender, m.into())
        });
        self.on(&api.feature.plot_url, |a, sender, m: FeaturePlotUrl| {
            a.manager.lock().plot_feature_url(sender, m.into())
        });
        self.on(&api.feature.unplot, |a, sender, m: FeatureRef| {
            a.manager.lock().delete_feature(sender, &m.overlay_id, &m.feature_id)
        });
        self.on(&api.feature.hide, |a, sender, m: FeatureRef| {
            a.manager.lock().hide_feature(sender, &m.overlay_id, &m.feature_id)
        });
        self.on(&api.feature.show, |a, sender, m: FeatureShow| {
            a.manager
                .lock()
                .show_feature(sender, &m.overlay_id, &m.feature_id, m.zoom)
        });
        self.on(&api.feature.update, |a, sender, m: FeatureUpdate| {
            a.manager.lock().update_feature(
                sender,
                &m.overlay_id,
                &m.feature_id,
                m.name.as_deref(),
                m.new_overlay_id.as_deref(),
            )
        });

        self.on(&api.feature.status_request, |a, sender, _: FeatureStatusRequest| {
            a.publish_sublayers(sender);
            Ok(())
        });
        self.on(&api.feature.status_start, |a, sender, m: FeatureStatusSubscription| {
            a.start_status(sender, &m)
        });
        self.on(&api.feature.status_stop, |a, sender, m: FeatureStatusSubscription| {
            a.stop_status(sender, &m)
        });

        self.on(&api.status.request, |a, sender, m: StatusRequest| {
            a.publish_status(sender, &m.types);
            Ok(())
        });

        debug!(instance_id = %api.instance_id(), "Map adapter bound");
    }

    /// Unsubscribe from every topic [`MapAdapter::bind`] subscribed to.
    pub fn unbind(&self) {
        for channel in self.inbound() {
            channel.remove_handlers();
        }
    }

    fn inbound(&self) -> [&Channel; 15] {
        let api = &self.api;
        [
            &api.overlay.create,
            &api.overlay.remove,
            &api.overlay.hide,
            &api.overlay.show,
            &api.overlay.update,
            &api.feature.plot,
            &api.feature.plot_url,
            &api.feature.unplot,
            &api.feature.hide,
            &api.feature.show,
            &api.feature.update,
            &api.feature.status_request,
            &api.feature.status_start,
            &api.feature.status_stop,
            &api.status.request,
        ]
    }

    fn on<M, F>(self: &Arc<Self>, channel: &Channel, op: F)
    where
        M: DeserializeOwned + 'static,
        F: Fn(&Self, &str, M) -> Result<(), TreeError> + Send + Sync + 'static,
    {
        let adapter = Arc::downgrade(self);
        let topic = channel.topic();
        channel.add_typed_handler(move |sender, payload: Payload<M>| {
            let Some(adapter) = adapter.upgrade() else {
                debug!(topic = topic, "Adapter dropped; message ignored");
                return;
            };
            for message in payload.into_vec() {
                if let Err(e) = op(&adapter, sender, message) {
                    debug!(topic = topic, sender = sender, error = %e, "Operation failed");
                }
            }
        });
    }

    // =========================================================================
    // STATUS
    // =========================================================================

    /// Answer a status request with one message per requested type.
    pub fn publish_status(&self, requester: &str, types: &[RequestType]) {
        for request_type in RequestType::ALL {
            if !types.contains(&request_type) {
                continue;
            }
            match request_type {
                RequestType::View => {
                    let view = self.engine.view();
                    self.api.status.view.send(&StatusView {
                        requester: Some(requester.to_string()),
                        bounds: view.bounds,
                        center: view.center,
                        range: view.range,
                    });
                }
                RequestType::About => self.api.status.about.send(&StatusAbout {
                    version: self.config.version.clone(),
                    map_type: self.config.map_type,
                    widget_name: self.config.widget_name.clone(),
                }),
                RequestType::Format => self.api.status.format.send(&StatusFormat {
                    formats: self.engine.supported_formats(),
                }),
            }
        }
    }

    // =========================================================================
    // FEATURE STATUS
    // =========================================================================

    /// Publish every numeric field of every plotted feature. Nothing is sent
    /// when there is none.
    pub fn publish_sublayers(&self, requester: &str) {
        let forest = self.manager.lock().overlay_tree();
        let sublayers = feature_status::sublayers(self.engine.as_ref(), &forest);
        if sublayers.is_empty() {
            debug!(requester = requester, "No numeric feature fields to report");
            return;
        }
        self.api.feature.status_sublayers.send(&sublayers);
    }

    fn start_status(&self, sender: &str, m: &FeatureStatusSubscription) -> Result<(), TreeError> {
        self.check_plotted(sender, MAP_FEATURE_STATUS_START, m)?;
        let forest = self.manager.lock().overlay_tree();
        let mut subscriptions = self.subscriptions.lock();
        subscriptions.retain_plotted(&forest);
        if subscriptions.start(&m.overlay_id, &m.feature_id, m.subfeature_id.as_deref()) {
            debug!(
                overlay_id = %m.overlay_id,
                feature_id = %m.feature_id,
                subfeature_id = ?m.subfeature_id,
                active = subscriptions.len(),
                "Feature status reporting started"
            );
        }
        Ok(())
    }

    fn stop_status(&self, sender: &str, m: &FeatureStatusSubscription) -> Result<(), TreeError> {
        self.check_plotted(sender, MAP_FEATURE_STATUS_STOP, m)?;
        if self
            .subscriptions
            .lock()
            .stop(&m.overlay_id, &m.feature_id, m.subfeature_id.as_deref())
        {
            debug!(
                overlay_id = %m.overlay_id,
                feature_id = %m.feature_id,
                subfeature_id = ?m.subfeature_id,
                "Feature status reporting stopped"
            );
        }
        Ok(())
    }

    fn check_plotted(
        &self,
        sender: &str,
        topic: &'static str,
        m: &FeatureStatusSubscription,
    ) -> Result<(), TreeError> {
        let manager = self.manager.lock();
        let found = match manager.overlay(&m.overlay_id) {
            None => Err(TreeError::OverlayNotFound {
                id: m.overlay_id.clone(),
            }),
            Some(_) => manager
                .tree()
                .require_feature(&m.overlay_id, &m.feature_id)
                .map(|_| ()),
        };
        drop(manager);
        if let Err(error) = &found {
            warn!(
                sender = sender,
                topic = topic,
                error = %error,
                "Feature status subscription failed"
            );
            self.api.error.report(sender, topic, error);
        }
        found
    }

    // =========================================================================
    // ENGINE EVENTS
    // =========================================================================

    /// A plotted feature reported a new value for one of its fields.
    ///
    /// Published only while a status subscription covers the field.
    pub fn on_feature_value_changed(&self, handle: EngineHandle, field: &str, value: Value) {
        let Some((overlay_id, feature_id)) = self.resolve(handle, MAP_FEATURE_STATUS_REPORT) else {
            return;
        };
        if !self
            .subscriptions
            .lock()
            .is_active(&overlay_id, &feature_id, field)
        {
            return;
        }
        self.api.feature.status_report.send(&FeatureStatusReport {
            overlay_id,
            feature_id,
            subfeature_id: field.to_string(),
            feature_value: value,
        });
    }

    /// The user clicked a feature (or a part of it).
    pub fn on_feature_selected(
        &self,
        handle: EngineHandle,
        selected_id: Option<&str>,
        selected_name: Option<&str>,
    ) {
        let Some((overlay_id, feature_id)) = self.resolve(handle, MAP_FEATURE_SELECTED) else {
            return;
        };
        self.api.feature.selected.send(&FeatureSelected {
            overlay_id,
            feature_id,
            selected_id: selected_id.map(str::to_string),
            selected_name: selected_name.map(str::to_string),
        });
    }

    /// The engine failed on its own, outside any tree operation.
    pub fn on_engine_error(&self, msg: &str, error: Value) {
        warn!(error = msg, "Map engine error");
        self.api
            .error
            .send_error(&self.api.instance_id(), MAP_ERROR, msg, error);
    }

    fn resolve(&self, handle: EngineHandle, topic: &'static str) -> Option<(String, String)> {
        let located = self
            .manager
            .lock()
            .locate(handle)
            .map(|feature| (feature.overlay_id.clone(), feature.id.clone()));
        if located.is_none() {
            let error = TreeError::Engine(EngineError::UnknownHandle { handle });
            warn!(handle = %handle, topic = topic, "Engine event for unknown handle");
            self.api.error.report(&self.api.instance_id(), topic, &error);
        }
        located
    }
}
