//! # CMW-02 Overlay Manager
//!
//! Keeps the live overlay/feature tree of a map widget and connects it to the
//! CMWAPI 1.1 channels and a rendering engine.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): the arena-backed [`OverlayTree`], pure
//! - **Ports Layer** (`ports/`)
//!   - `OverlayApi`, `FeatureApi`: driving ports
//!   - `MapEngine`, `ErrorReporter`: driven ports
//! - **Service Layer** (`service/`): [`OverlayManager`]
//! - **Adapters Layer** (`adapters/`)
//!   - [`MapAdapter`]: channels → manager, engine events → channels
//!   - [`UiRelay`]: outbound helpers for widget UIs
//!
//! ## Invariants
//!
//! - Effective visibility is derived: own flag OR any ancestor hidden.
//! - Hide/show calls the engine only for features whose effective state
//!   changed; show restores exactly what hide changed.
//! - Creating an existing overlay updates it; removing an unknown overlay
//!   does nothing.
//! - Every failed operation is reported on `map.error`. A not-found failure
//!   leaves the tree as it was. A failed engine plot keeps an overlay it
//!   auto-created and drops any feature it was replacing.
//! - Feature value changes are published only while a status subscription
//!   covers them.
//!
//! ## Usage
//!
//! ```ignore
//! let bus = InMemoryBus::new(Arc::new(JsonCodec));
//! let api = MapApi::new(Arc::new(bus.connect("map")), Arc::new(JsonCodec));
//! let adapter = MapAdapter::new(api, Arc::new(engine), AdapterConfig::from_env()?);
//! adapter.bind();
//! tokio::spawn(bus.clone().run());
//! ```

#![warn(clippy::all)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

#[cfg(test)]
mod test_support;

pub use adapters::{MapAdapter, SharedManager, UiRelay};
pub use config::AdapterConfig;
pub use domain::{
    EngineHandle, Feature, FeatureDescriptor, FeatureMove, FeatureNode, FeatureSource, Overlay,
    OverlayNode, OverlayTree, VisibilityChange,
};
pub use error::{ConfigError, EngineError, TreeError};
pub use ports::{ErrorReporter, FeatureApi, MapEngine, MapView, OverlayApi, PlotRequest, PlotUrlRequest};
pub use service::{OverlayManager, TreeChangeHandler};
