//! # Map API bundle
//!
//! Every CMWAPI 1.1 channel a widget needs, wired to one transport, one codec,
//! one error channel and one set of counters.

use crate::channel::Channel;
use crate::error_channel::ErrorChannel;
use crate::metrics::{ChannelMetrics, MetricsSnapshot};
use crate::topics::{self, TopicSpec};
use shared_bus::Transport;
use shared_types::{WidgetId, WireCodec};
use std::sync::Arc;

/// `map.overlay.*`
#[derive(Debug, Clone)]
pub struct OverlayChannels {
    pub create: Channel,
    pub remove: Channel,
    pub hide: Channel,
    pub show: Channel,
    pub update: Channel,
}

/// `map.feature.*`
#[derive(Debug, Clone)]
pub struct FeatureChannels {
    pub plot: Channel,
    pub plot_url: Channel,
    pub unplot: Channel,
    pub hide: Channel,
    pub show: Channel,
    pub selected: Channel,
    pub update: Channel,
    pub status_report: Channel,
    pub status_request: Channel,
    pub status_start: Channel,
    pub status_stop: Channel,
    pub status_sublayers: Channel,
}

/// `map.status.*`
#[derive(Debug, Clone)]
pub struct StatusChannels {
    pub request: Channel,
    pub view: Channel,
    pub about: Channel,
    pub format: Channel,
}

/// The full channel set for one widget.
#[derive(Clone)]
pub struct MapApi {
    pub overlay: OverlayChannels,
    pub feature: FeatureChannels,
    pub status: StatusChannels,
    pub error: Arc<ErrorChannel>,
    transport: Arc<dyn Transport>,
    metrics: Arc<ChannelMetrics>,
}

impl MapApi {
    pub fn new(transport: Arc<dyn Transport>, codec: Arc<dyn WireCodec>) -> Self {
        let metrics = Arc::new(ChannelMetrics::new());
        let error = Arc::new(ErrorChannel::new(
            Arc::clone(&transport),
            Arc::clone(&codec),
            Arc::clone(&metrics),
        ));

        let channel = |spec: &'static TopicSpec| {
            Channel::new(
                spec,
                Arc::clone(&transport),
                Arc::clone(&codec),
                Some(Arc::clone(&error)),
                Arc::clone(&metrics),
            )
        };

        let overlay = OverlayChannels {
            create: channel(&topics::OVERLAY_CREATE),
            remove: channel(&topics::OVERLAY_REMOVE),
            hide: channel(&topics::OVERLAY_HIDE),
            show: channel(&topics::OVERLAY_SHOW),
            update: channel(&topics::OVERLAY_UPDATE),
        };
        let feature = FeatureChannels {
            plot: channel(&topics::FEATURE_PLOT),
            plot_url: channel(&topics::FEATURE_PLOT_URL),
            unplot: channel(&topics::FEATURE_UNPLOT),
            hide: channel(&topics::FEATURE_HIDE),
            show: channel(&topics::FEATURE_SHOW),
            selected: channel(&topics::FEATURE_SELECTED),
            update: channel(&topics::FEATURE_UPDATE),
            status_report: channel(&topics::FEATURE_STATUS_REPORT),
            status_request: channel(&topics::FEATURE_STATUS_REQUEST),
            status_start: channel(&topics::FEATURE_STATUS_START),
            status_stop: channel(&topics::FEATURE_STATUS_STOP),
            status_sublayers: channel(&topics::FEATURE_STATUS_SUBLAYERS),
        };
        let status = StatusChannels {
            request: channel(&topics::STATUS_REQUEST),
            view: channel(&topics::STATUS_VIEW),
            about: channel(&topics::STATUS_ABOUT),
            format: channel(&topics::STATUS_FORMAT),
        };

        Self {
            overlay,
            feature,
            status,
            error,
            transport,
            metrics,
        }
    }

    /// Id this widget publishes as.
    #[must_use]
    pub fn instance_id(&self) -> WidgetId {
        self.transport.instance_id()
    }

    #[must_use]
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Every non-error channel, in catalog order.
    pub fn channels(&self) -> [&Channel; 21] {
        [
            &self.overlay.create,
            &self.overlay.remove,
            &self.overlay.hide,
            &self.overlay.show,
            &self.overlay.update,
            &self.feature.plot,
            &self.feature.plot_url,
            &self.feature.unplot,
            &self.feature.hide,
            &self.feature.show,
            &self.feature.selected,
            &self.feature.update,
            &self.feature.status_report,
            &self.feature.status_request,
            &self.feature.status_start,
            &self.feature.status_stop,
            &self.feature.status_sublayers,
            &self.status.request,
            &self.status.view,
            &self.status.about,
            &self.status.format,
        ]
    }

    /// Unsubscribe everything this widget registered, error channel included.
    pub fn remove_all_handlers(&self) {
        for channel in self.channels() {
            channel.remove_handlers();
        }
        self.error.remove_handlers();
    }
}

impl std::fmt::Debug for MapApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapApi")
            .field("instance_id", &self.transport.instance_id())
            .field("metrics", &self.metrics.snapshot())
            .finish_non_exhaustive()
    }
}
