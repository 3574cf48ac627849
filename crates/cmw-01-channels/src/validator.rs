//! Payload Validator
//!
//! Pure checks on untrusted payloads. Nothing here touches the transport.
//!
//! - `valid_object_or_array`: shape classification and normalization
//! - `valid_request_types` / `valid_map_type` / `valid_formats`: membership in
//!   the fixed CMWAPI 1.1 enumerations

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::{FeatureFormat, Record};
use std::fmt;
use std::str::FromStr;

/// Status types a widget may ask the map for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestType {
    About,
    Format,
    View,
}

impl RequestType {
    pub const ALL: [RequestType; 3] = [RequestType::About, RequestType::Format, RequestType::View];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestType::About => "about",
            RequestType::Format => "format",
            RequestType::View => "view",
        }
    }
}

impl FromStr for RequestType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RequestType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidRequestType {
                value: s.to_string(),
            })
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rendering dimensionality a map reports about itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MapType {
    #[serde(rename = "2-D")]
    TwoD,
    #[serde(rename = "3-D")]
    ThreeD,
    #[serde(rename = "other")]
    Other,
}

impl MapType {
    pub const ALL: [MapType; 3] = [MapType::TwoD, MapType::ThreeD, MapType::Other];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            MapType::TwoD => "2-D",
            MapType::ThreeD => "3-D",
            MapType::Other => "other",
        }
    }
}

impl FromStr for MapType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MapType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidMapType {
                value: s.to_string(),
            })
    }
}

impl fmt::Display for MapType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalize a payload into a list of records.
///
/// - absent → one empty record
/// - object → one record
/// - non-empty array of objects → those records, in order
///
/// Anything else (null, scalars, arrays holding non-objects, empty arrays) is
/// rejected.
pub fn valid_object_or_array(data: Option<&Value>) -> Result<Vec<Record>, ValidationError> {
    match data {
        None => Ok(vec![Record::new()]),
        Some(Value::Object(record)) => Ok(vec![record.clone()]),
        Some(Value::Array(items)) => {
            if items.is_empty() {
                return Err(ValidationError::EmptyArray);
            }
            items
                .iter()
                .enumerate()
                .map(|(index, item)| match item {
                    Value::Object(record) => Ok(record.clone()),
                    other => Err(ValidationError::ElementNotObject {
                        index,
                        found: kind_of(other),
                    }),
                })
                .collect()
        }
        Some(other) => Err(ValidationError::NotObjectOrArray {
            found: kind_of(other),
        }),
    }
}

/// Check every entry is a known request type.
pub fn valid_request_types<S: AsRef<str>>(types: &[S]) -> Result<Vec<RequestType>, ValidationError> {
    types.iter().map(|t| t.as_ref().parse()).collect()
}

/// Check a map type string.
pub fn valid_map_type(map_type: &str) -> Result<MapType, ValidationError> {
    map_type.parse()
}

/// Check every entry is a known feature format.
pub fn valid_formats<S: AsRef<str>>(formats: &[S]) -> Result<Vec<FeatureFormat>, ValidationError> {
    formats
        .iter()
        .map(|f| {
            f.as_ref()
                .parse()
                .map_err(|_| ValidationError::InvalidFormat {
                    value: f.as_ref().to_string(),
                })
        })
        .collect()
}

/// Human-readable name of a JSON value's kind.
pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
