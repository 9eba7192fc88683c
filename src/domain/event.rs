//! Threshold event records
//!
//! The record shape consumed by the host event system. The engine only
//! produces these; delivery belongs to the event sink.

use super::severity::Severity;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One alert or clear event produced by a threshold check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdEvent {
    /// Device the event applies to
    pub device: String,
    /// Component within the device, empty for device-wide events
    pub component: String,
    /// De-duplication key; the rule identifier
    pub event_key: String,
    /// Host-system classification tag
    pub event_class: String,
    /// Severity of the event; Clear on restore
    pub severity: Severity,
    /// Human-readable one-line summary
    pub summary: String,
}

impl ThresholdEvent {
    /// Whether this event clears a previously raised alert
    pub fn is_clear(&self) -> bool {
        self.severity.is_clear()
    }
}

impl fmt::Display for ThresholdEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}{}{}: {}",
            self.severity,
            self.device,
            if self.component.is_empty() { "" } else { "/" },
            self.component,
            self.summary
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_detection() {
        let event = ThresholdEvent {
            device: "core-sw1".to_string(),
            component: "eth0".to_string(),
            event_key: "linkDown".to_string(),
            event_class: "/Perf/Snmp".to_string(),
            severity: Severity::Clear,
            summary: "Threshold of linkDown restored: current value: 1.00".to_string(),
        };
        assert!(event.is_clear());
    }

    #[test]
    fn test_display_includes_component() {
        let event = ThresholdEvent {
            device: "core-sw1".to_string(),
            component: "eth0".to_string(),
            event_key: "linkDown".to_string(),
            event_class: "/Perf/Snmp".to_string(),
            severity: Severity::Warning,
            summary: "Threshold of linkDown met: current value 2.00".to_string(),
        };
        let rendered = event.to_string();
        assert!(rendered.contains("core-sw1/eth0"));
        assert!(rendered.contains("WARNING"));
    }
}
