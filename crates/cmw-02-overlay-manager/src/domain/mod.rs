//! Domain Layer
//!
//! The overlay/feature hierarchy with no I/O. Engine side effects are returned
//! as [`VisibilityChange`]s and removed [`Feature`]s for the service to apply.

pub mod entities;
pub mod snapshot;
pub mod tree;

pub use entities::{
    EngineHandle, Feature, FeatureDescriptor, FeatureMove, FeatureSource, Overlay, VisibilityChange,
};
pub use snapshot::{FeatureNode, OverlayNode};
pub use tree::OverlayTree;
