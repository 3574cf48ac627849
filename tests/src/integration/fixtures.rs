//! Shared fixtures for integration flows.

use cmw_01_channels::messages::{Bounds, ErrorMessage, LatLon};
use cmw_01_channels::{Channel, MapApi, Payload};
use cmw_02_overlay_manager::{
    AdapterConfig, EngineError, EngineHandle, FeatureDescriptor, MapAdapter, MapEngine, MapView,
};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use shared_bus::InMemoryBus;
use shared_types::{FeatureFormat, JsonCodec};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// One layer on the fake map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    pub overlay_id: String,
    pub feature_id: String,
    pub visible: bool,
}

/// A map engine that keeps its layers in memory.
#[derive(Default)]
pub struct FakeMap {
    layers: Mutex<BTreeMap<EngineHandle, Layer>>,
    next_handle: AtomicU64,
}

impl FakeMap {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn layer_count(&self) -> usize {
        self.layers.lock().len()
    }

    /// `(overlay_id, feature_id)` of every visible layer, sorted.
    pub fn visible(&self) -> Vec<(String, String)> {
        self.layers
            .lock()
            .values()
            .filter(|layer| layer.visible)
            .map(|layer| (layer.overlay_id.clone(), layer.feature_id.clone()))
            .collect()
    }

    fn set_visible(&self, handle: EngineHandle, visible: bool) {
        if let Some(layer) = self.layers.lock().get_mut(&handle) {
            layer.visible = visible;
        }
    }
}

impl MapEngine for FakeMap {
    fn plot(&self, feature: &FeatureDescriptor) -> Result<EngineHandle, EngineError> {
        let handle = EngineHandle(self.next_handle.fetch_add(1, Ordering::SeqCst) + 1);
        self.layers.lock().insert(
            handle,
            Layer {
                overlay_id: feature.overlay_id.clone(),
                feature_id: feature.feature_id.clone(),
                visible: true,
            },
        );
        Ok(handle)
    }

    fn unplot(&self, handle: EngineHandle) {
        self.layers.lock().remove(&handle);
    }

    fn hide(&self, handle: EngineHandle) {
        self.set_visible(handle, false);
    }

    fn show(&self, handle: EngineHandle) {
        self.set_visible(handle, true);
    }

    fn supported_formats(&self) -> Vec<FeatureFormat> {
        vec![FeatureFormat::Kml, FeatureFormat::GeoJson]
    }

    /// Every layer carries an altitude.
    fn numeric_fields(&self, handle: EngineHandle) -> Vec<String> {
        if self.layers.lock().contains_key(&handle) {
            vec!["altitude".to_string()]
        } else {
            Vec::new()
        }
    }

    fn view(&self) -> MapView {
        MapView {
            bounds: Bounds {
                south_west: LatLon { lat: -10.0, lon: -20.0 },
                north_east: LatLon { lat: 10.0, lon: 20.0 },
            },
            center: LatLon { lat: 0.0, lon: 0.0 },
            range: 12_000.0,
        }
    }
}

/// A map widget attached to a bus.
pub struct MapWidget {
    pub adapter: Arc<MapAdapter<FakeMap>>,
    pub engine: Arc<FakeMap>,
}

impl MapWidget {
    pub fn attach(bus: &Arc<InMemoryBus>, id: &str) -> Self {
        let engine = FakeMap::new();
        let adapter = MapAdapter::new(api(bus, id), Arc::clone(&engine), AdapterConfig::default());
        adapter.bind();
        Self { adapter, engine }
    }
}

pub fn bus() -> Arc<InMemoryBus> {
    crate::init_test_logging();
    InMemoryBus::new(Arc::new(JsonCodec))
}

pub fn api(bus: &Arc<InMemoryBus>, id: &str) -> MapApi {
    MapApi::new(Arc::new(bus.connect(id)), Arc::new(JsonCodec))
}

/// Every `(sender, message)` a channel delivers.
pub fn collect<M>(channel: &Channel) -> Arc<Mutex<Vec<(String, M)>>>
where
    M: DeserializeOwned + Send + 'static,
{
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    channel.add_typed_handler(move |sender, payload: Payload<M>| {
        let mut sink = sink.lock();
        for message in payload.into_vec() {
            sink.push((sender.to_string(), message));
        }
    });
    seen
}

/// Every `(publisher, report)` seen on `map.error`.
pub fn collect_errors(api: &MapApi) -> Arc<Mutex<Vec<(String, ErrorMessage)>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    api.error.add_handler(move |sender, payload| {
        let mut sink = sink.lock();
        for report in payload.into_vec() {
            sink.push((sender.to_string(), report));
        }
    });
    seen
}
