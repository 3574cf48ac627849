//! Recording doubles for the driven ports.

use crate::domain::{EngineHandle, FeatureDescriptor};
use crate::error::{EngineError, TreeError};
use crate::ports::{ErrorReporter, MapEngine, MapView};
use cmw_01_channels::messages::{Bounds, LatLon};
use parking_lot::Mutex;
use shared_types::FeatureFormat;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum EngineCall {
    Plot { overlay_id: String, feature_id: String },
    Unplot(EngineHandle),
    Hide(EngineHandle),
    Show(EngineHandle),
    ZoomTo(EngineHandle),
}

pub(crate) struct RecordingEngine {
    calls: Mutex<Vec<EngineCall>>,
    next_handle: AtomicU64,
    fail_plots: AtomicBool,
    formats: Vec<FeatureFormat>,
    numeric_fields: Mutex<Vec<String>>,
}

impl RecordingEngine {
    pub(crate) fn new() -> Arc<Self> {
        Self::with_formats(FeatureFormat::ALL.to_vec())
    }

    pub(crate) fn with_formats(formats: Vec<FeatureFormat>) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            next_handle: AtomicU64::new(1),
            fail_plots: AtomicBool::new(false),
            formats,
            numeric_fields: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().clone()
    }

    pub(crate) fn clear(&self) {
        self.calls.lock().clear();
    }

    pub(crate) fn fail_plots(&self, fail: bool) {
        self.fail_plots.store(fail, Ordering::SeqCst);
    }

    /// Fields every plotted feature reports as numeric.
    pub(crate) fn set_numeric_fields(&self, fields: &[&str]) {
        *self.numeric_fields.lock() = fields.iter().map(|f| f.to_string()).collect();
    }

    pub(crate) fn count(&self, pred: impl Fn(&EngineCall) -> bool) -> usize {
        self.calls.lock().iter().filter(|c| pred(c)).count()
    }
}

impl MapEngine for RecordingEngine {
    fn plot(&self, feature: &FeatureDescriptor) -> Result<EngineHandle, EngineError> {
        if self.fail_plots.load(Ordering::SeqCst) {
            return Err(EngineError::PlotFailed {
                reason: "layer rejected".to_string(),
            });
        }
        self.calls.lock().push(EngineCall::Plot {
            overlay_id: feature.overlay_id.clone(),
            feature_id: feature.feature_id.clone(),
        });
        Ok(EngineHandle(self.next_handle.fetch_add(1, Ordering::SeqCst)))
    }

    fn unplot(&self, handle: EngineHandle) {
        self.calls.lock().push(EngineCall::Unplot(handle));
    }

    fn hide(&self, handle: EngineHandle) {
        self.calls.lock().push(EngineCall::Hide(handle));
    }

    fn show(&self, handle: EngineHandle) {
        self.calls.lock().push(EngineCall::Show(handle));
    }

    fn zoom_to(&self, handle: EngineHandle) {
        self.calls.lock().push(EngineCall::ZoomTo(handle));
    }

    fn supported_formats(&self) -> Vec<FeatureFormat> {
        self.formats.clone()
    }

    fn view(&self) -> MapView {
        MapView {
            bounds: Bounds {
                south_west: LatLon { lat: 10.0, lon: 20.0 },
                north_east: LatLon { lat: 30.0, lon: 40.0 },
            },
            center: LatLon { lat: 20.0, lon: 30.0 },
            range: 5000.0,
        }
    }

    fn numeric_fields(&self, _handle: EngineHandle) -> Vec<String> {
        self.numeric_fields.lock().clone()
    }
}

/// `(sender, type, msg)` per report.
#[derive(Default)]
pub(crate) struct RecordingReporter {
    reports: Mutex<Vec<(String, String, String)>>,
}

impl RecordingReporter {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn reports(&self) -> Vec<(String, String, String)> {
        self.reports.lock().clone()
    }
}

impl ErrorReporter for RecordingReporter {
    fn report(&self, sender: &str, error_type: &str, error: &TreeError) {
        self.reports
            .lock()
            .push((sender.to_string(), error_type.to_string(), error.to_string()));
    }
}
