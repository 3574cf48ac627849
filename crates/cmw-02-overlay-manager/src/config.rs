//! Adapter configuration from environment variables.

use crate::error::ConfigError;
use cmw_01_channels::MapType;
use std::env;

const DEFAULT_WIDGET_NAME: &str = "Common Map Widget";
const DEFAULT_VERSION: &str = "1.1";

/// What a map says about itself on `map.status.about`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterConfig {
    /// Human-readable widget name
    pub widget_name: String,

    /// Rendering dimensionality (2-D, 3-D, other)
    pub map_type: MapType,

    /// CMWAPI version implemented
    pub version: String,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            widget_name: DEFAULT_WIDGET_NAME.to_string(),
            map_type: MapType::TwoD,
            version: DEFAULT_VERSION.to_string(),
        }
    }
}

impl AdapterConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `CMW_WIDGET_NAME`: Widget name (default: Common Map Widget)
    /// - `CMW_MAP_TYPE`: One of 2-D, 3-D, other (default: 2-D)
    /// - `CMW_MAP_VERSION`: CMWAPI version (default: 1.1)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Like [`AdapterConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = Self {
            widget_name: lookup("CMW_WIDGET_NAME").unwrap_or(defaults.widget_name),
            map_type: match lookup("CMW_MAP_TYPE") {
                Some(value) => value.parse()?,
                None => defaults.map_type,
            },
            version: lookup("CMW_MAP_VERSION").unwrap_or(defaults.version),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.widget_name.trim().is_empty() {
            return Err(ConfigError::Empty {
                field: "widget_name",
            });
        }
        if self.version.trim().is_empty() {
            return Err(ConfigError::Empty { field: "version" });
        }
        Ok(())
    }
}
