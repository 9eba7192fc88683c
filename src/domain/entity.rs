//! Monitored-entity identity
//!
//! Identifies the device (and optional sub-component) a threshold is
//! attached to, and builds the keys used for count tracking and series
//! lookups.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a monitored entity
///
/// Carries the human-readable device/component name pair used on event
/// records, plus the base path under which the entity's series live in
/// historical storage. The key parts are stable across the lifetime of
/// the attachment and scope all violation counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityContext {
    device: String,
    component: Option<String>,
    series_path: String,
}

impl EntityContext {
    /// Create a context for a whole device
    pub fn device(device: impl Into<String>, series_path: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            component: None,
            series_path: series_path.into(),
        }
    }

    /// Create a context for a component of a device
    pub fn component(
        device: impl Into<String>,
        component: impl Into<String>,
        series_path: impl Into<String>,
    ) -> Self {
        Self {
            device: device.into(),
            component: Some(component.into()),
            series_path: series_path.into(),
        }
    }

    /// Device name for event records
    pub fn device_name(&self) -> &str {
        &self.device
    }

    /// Component name for event records, empty when the context is
    /// device-wide
    pub fn component_name(&self) -> &str {
        self.component.as_deref().unwrap_or("")
    }

    /// Base path for series lookups in historical storage
    pub fn series_path(&self) -> &str {
        &self.series_path
    }

    /// Stable identity parts, device first
    pub fn key_parts(&self) -> Vec<&str> {
        match &self.component {
            Some(component) => vec![self.device.as_str(), component.as_str()],
            None => vec![self.device.as_str()],
        }
    }

    /// Composite key scoping a violation count to this entity and one
    /// data point
    pub fn count_key(&self, data_point: &str) -> String {
        let mut key = self.key_parts().join(":");
        key.push(':');
        key.push_str(data_point);
        key
    }
}

impl fmt::Display for EntityContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.component {
            Some(component) => write!(f, "{}/{}", self.device, component),
            None => write!(f, "{}", self.device),
        }
    }
}
