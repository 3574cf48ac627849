//! # Feature Formats
//!
//! The closed set of data formats a feature can be plotted from.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Format of a plotted feature's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FeatureFormat {
    #[serde(rename = "kml")]
    Kml,
    #[serde(rename = "geojson")]
    GeoJson,
    #[serde(rename = "wms")]
    Wms,
    #[serde(rename = "arcgis-feature")]
    ArcgisFeature,
    #[serde(rename = "arcgis-dynamicmapservice")]
    ArcgisDynamicMapService,
    #[serde(rename = "arcgis-imageservice")]
    ArcgisImageService,
}

/// A format string outside [`FeatureFormat`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unsupported format '{0}'")]
pub struct UnsupportedFormat(pub String);

impl FeatureFormat {
    /// Every known format, in wire-name order.
    pub const ALL: [FeatureFormat; 6] = [
        FeatureFormat::Kml,
        FeatureFormat::GeoJson,
        FeatureFormat::Wms,
        FeatureFormat::ArcgisFeature,
        FeatureFormat::ArcgisDynamicMapService,
        FeatureFormat::ArcgisImageService,
    ];

    /// The wire name of the format.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureFormat::Kml => "kml",
            FeatureFormat::GeoJson => "geojson",
            FeatureFormat::Wms => "wms",
            FeatureFormat::ArcgisFeature => "arcgis-feature",
            FeatureFormat::ArcgisDynamicMapService => "arcgis-dynamicmapservice",
            FeatureFormat::ArcgisImageService => "arcgis-imageservice",
        }
    }
}

impl FromStr for FeatureFormat {
    type Err = UnsupportedFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FeatureFormat::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| UnsupportedFormat(s.to_string()))
    }
}

impl fmt::Display for FeatureFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
