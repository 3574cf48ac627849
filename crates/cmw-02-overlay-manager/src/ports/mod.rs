//! Ports Layer
//!
//! - Driving ports (inbound): what channel handlers and UIs call
//! - Driven ports (outbound): the map engine and the error sink

pub mod inbound;
pub mod outbound;

pub use inbound::{FeatureApi, OverlayApi, PlotRequest, PlotUrlRequest};
pub use outbound::{ErrorReporter, MapEngine, MapView};
