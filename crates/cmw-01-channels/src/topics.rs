//! CMWAPI 1.1 topic catalog
//!
//! Wire names are fixed for interoperability with other map widgets. Each
//! topic's default and check rules live here as data; the generic
//! [`Channel`](crate::Channel) interprets them.

use crate::rules::{FieldCheck, FieldRule, Literal};

// =============================================================================
// WIRE NAMES
// =============================================================================

pub const MAP_OVERLAY_CREATE: &str = "map.overlay.create";
pub const MAP_OVERLAY_REMOVE: &str = "map.overlay.remove";
pub const MAP_OVERLAY_HIDE: &str = "map.overlay.hide";
pub const MAP_OVERLAY_SHOW: &str = "map.overlay.show";
pub const MAP_OVERLAY_UPDATE: &str = "map.overlay.update";

pub const MAP_FEATURE_PLOT: &str = "map.feature.plot";
pub const MAP_FEATURE_PLOT_URL: &str = "map.feature.plot.url";
pub const MAP_FEATURE_UNPLOT: &str = "map.feature.unplot";
pub const MAP_FEATURE_HIDE: &str = "map.feature.hide";
pub const MAP_FEATURE_SHOW: &str = "map.feature.show";
pub const MAP_FEATURE_SELECTED: &str = "map.feature.selected";
pub const MAP_FEATURE_UPDATE: &str = "map.feature.update";
pub const MAP_FEATURE_STATUS_REPORT: &str = "map.feature.status.report";
pub const MAP_FEATURE_STATUS_REQUEST: &str = "map.feature.status.request";
pub const MAP_FEATURE_STATUS_START: &str = "map.feature.status.start";
pub const MAP_FEATURE_STATUS_STOP: &str = "map.feature.status.stop";
pub const MAP_FEATURE_STATUS_SUBLAYERS: &str = "map.feature.status.sublayers";

pub const MAP_STATUS_REQUEST: &str = "map.status.request";
pub const MAP_STATUS_VIEW: &str = "map.status.view";
pub const MAP_STATUS_ABOUT: &str = "map.status.about";
pub const MAP_STATUS_FORMAT: &str = "map.status.format";

pub const MAP_ERROR: &str = "map.error";

/// A topic name together with its rule table.
#[derive(Debug, PartialEq, Eq)]
pub struct TopicSpec {
    pub name: &'static str,
    pub rules: &'static [FieldRule],
}

const OVERLAY_ID_ONLY: &[FieldRule] = &[FieldRule::sender("overlayId")];

const FEATURE_IDS: &[FieldRule] = &[FieldRule::sender("overlayId"), FieldRule::sender("featureId")];

// =============================================================================
// OVERLAY TOPICS
// =============================================================================

pub static OVERLAY_CREATE: TopicSpec = TopicSpec {
    name: MAP_OVERLAY_CREATE,
    rules: &[
        FieldRule::sender("overlayId"),
        FieldRule::copy_of("name", "overlayId"),
    ],
};

pub static OVERLAY_REMOVE: TopicSpec = TopicSpec {
    name: MAP_OVERLAY_REMOVE,
    rules: OVERLAY_ID_ONLY,
};

pub static OVERLAY_HIDE: TopicSpec = TopicSpec {
    name: MAP_OVERLAY_HIDE,
    rules: OVERLAY_ID_ONLY,
};

pub static OVERLAY_SHOW: TopicSpec = TopicSpec {
    name: MAP_OVERLAY_SHOW,
    rules: OVERLAY_ID_ONLY,
};

pub static OVERLAY_UPDATE: TopicSpec = TopicSpec {
    name: MAP_OVERLAY_UPDATE,
    rules: OVERLAY_ID_ONLY,
};

// =============================================================================
// FEATURE TOPICS
// =============================================================================

pub static FEATURE_PLOT: TopicSpec = TopicSpec {
    name: MAP_FEATURE_PLOT,
    rules: &[
        FieldRule::sender("overlayId"),
        FieldRule::sender("featureId"),
        FieldRule::copy_of("name", "featureId"),
        FieldRule::literal("format", Literal::Str("kml")),
        FieldRule::required("feature"),
        FieldRule::literal("zoom", Literal::Bool(false)),
    ],
};

pub static FEATURE_PLOT_URL: TopicSpec = TopicSpec {
    name: MAP_FEATURE_PLOT_URL,
    rules: &[
        FieldRule::sender("overlayId"),
        FieldRule::sender("featureId"),
        FieldRule::copy_of("name", "featureId"),
        FieldRule::literal("format", Literal::Str("kml")),
        FieldRule::required("url"),
        FieldRule::literal("zoom", Literal::Bool(false)),
    ],
};

pub static FEATURE_UNPLOT: TopicSpec = TopicSpec {
    name: MAP_FEATURE_UNPLOT,
    rules: FEATURE_IDS,
};

pub static FEATURE_HIDE: TopicSpec = TopicSpec {
    name: MAP_FEATURE_HIDE,
    rules: FEATURE_IDS,
};

pub static FEATURE_SHOW: TopicSpec = TopicSpec {
    name: MAP_FEATURE_SHOW,
    rules: &[
        FieldRule::sender("overlayId"),
        FieldRule::sender("featureId"),
        FieldRule::literal("zoom", Literal::Bool(false)),
    ],
};

pub static FEATURE_SELECTED: TopicSpec = TopicSpec {
    name: MAP_FEATURE_SELECTED,
    rules: FEATURE_IDS,
};

pub static FEATURE_UPDATE: TopicSpec = TopicSpec {
    name: MAP_FEATURE_UPDATE,
    rules: FEATURE_IDS,
};

pub static FEATURE_STATUS_REPORT: TopicSpec = TopicSpec {
    name: MAP_FEATURE_STATUS_REPORT,
    rules: &[
        FieldRule::sender("overlayId"),
        FieldRule::sender("featureId"),
        FieldRule::required("subfeatureId"),
    ],
};

/// Asks every map to list the reportable sublayers of everything it has
/// plotted. Carries no ids.
pub static FEATURE_STATUS_REQUEST: TopicSpec = TopicSpec {
    name: MAP_FEATURE_STATUS_REQUEST,
    rules: &[],
};

/// `subfeatureId` is optional; without it every field of the feature reports.
pub static FEATURE_STATUS_START: TopicSpec = TopicSpec {
    name: MAP_FEATURE_STATUS_START,
    rules: FEATURE_IDS,
};

pub static FEATURE_STATUS_STOP: TopicSpec = TopicSpec {
    name: MAP_FEATURE_STATUS_STOP,
    rules: FEATURE_IDS,
};

pub static FEATURE_STATUS_SUBLAYERS: TopicSpec = TopicSpec {
    name: MAP_FEATURE_STATUS_SUBLAYERS,
    rules: &[
        FieldRule::sender("overlayId"),
        FieldRule::copy_of("overlayName", "overlayId"),
        FieldRule::sender("featureId"),
        FieldRule::copy_of("featureName", "featureId"),
        FieldRule::required("sublayerId"),
    ],
};

// =============================================================================
// STATUS TOPICS
// =============================================================================

pub static STATUS_REQUEST: TopicSpec = TopicSpec {
    name: MAP_STATUS_REQUEST,
    rules: &[
        FieldRule::literal("types", Literal::StrList(&["about", "format", "view"])),
        FieldRule::check("types", FieldCheck::RequestTypes),
    ],
};

pub static STATUS_VIEW: TopicSpec = TopicSpec {
    name: MAP_STATUS_VIEW,
    rules: &[
        FieldRule::required("bounds"),
        FieldRule::required("center"),
        FieldRule::required("range"),
    ],
};

pub static STATUS_ABOUT: TopicSpec = TopicSpec {
    name: MAP_STATUS_ABOUT,
    rules: &[
        FieldRule::required("version"),
        FieldRule::required("type"),
        FieldRule::check("type", FieldCheck::MapType),
        FieldRule::required("widgetName"),
    ],
};

pub static STATUS_FORMAT: TopicSpec = TopicSpec {
    name: MAP_STATUS_FORMAT,
    rules: &[
        FieldRule::literal("formats", Literal::StrList(&["kml"])),
        FieldRule::check("formats", FieldCheck::Formats),
    ],
};

// =============================================================================
// ERROR TOPIC
// =============================================================================

pub static ERROR: TopicSpec = TopicSpec {
    name: MAP_ERROR,
    rules: &[],
};

/// Every topic in the catalog.
pub static ALL: [&TopicSpec; 22] = [
    &OVERLAY_CREATE,
    &OVERLAY_REMOVE,
    &OVERLAY_HIDE,
    &OVERLAY_SHOW,
    &OVERLAY_UPDATE,
    &FEATURE_PLOT,
    &FEATURE_PLOT_URL,
    &FEATURE_UNPLOT,
    &FEATURE_HIDE,
    &FEATURE_SHOW,
    &FEATURE_SELECTED,
    &FEATURE_UPDATE,
    &FEATURE_STATUS_REPORT,
    &FEATURE_STATUS_REQUEST,
    &FEATURE_STATUS_START,
    &FEATURE_STATUS_STOP,
    &FEATURE_STATUS_SUBLAYERS,
    &STATUS_REQUEST,
    &STATUS_VIEW,
    &STATUS_ABOUT,
    &STATUS_FORMAT,
    &ERROR,
];

/// Find a topic by wire name.
#[must_use]
pub fn lookup(name: &str) -> Option<&'static TopicSpec> {
    ALL.iter().copied().find(|spec| spec.name == name)
}
