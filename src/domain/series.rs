//! Time-series domain types
//!
//! Metadata and sample shapes for the round-robin historical store, plus
//! the loosely-typed sample value handed over by collectors.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a stored series accumulates values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SeriesKind {
    /// Instantaneous reading
    Gauge,
    /// Cumulative, ever-increasing counter
    Counter,
    /// Counter that may decrease (rate derived on read)
    Derive,
    /// Counter reset on every read
    Absolute,
}

impl SeriesKind {
    /// Whether samples are instantaneous readings usable as-is
    pub const fn is_gauge(self) -> bool {
        matches!(self, Self::Gauge)
    }
}

impl fmt::Display for SeriesKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gauge => write!(f, "GAUGE"),
            Self::Counter => write!(f, "COUNTER"),
            Self::Derive => write!(f, "DERIVE"),
            Self::Absolute => write!(f, "ABSOLUTE"),
        }
    }
}

/// Native storage parameters of one series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesMetadata {
    /// Native sampling period in seconds
    pub step_secs: u64,
    /// Accumulation kind of the series
    pub kind: SeriesKind,
}

impl SeriesMetadata {
    /// Create series metadata
    pub const fn new(step_secs: u64, kind: SeriesKind) -> Self {
        Self { step_secs, kind }
    }
}

/// One slot of a fetched series window
///
/// Storage returns a value for every slot in the requested range; slots
/// with no data carry `None`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Slot timestamp, seconds since the epoch
    pub timestamp: u64,
    /// Sampled value, absent when the slot holds no data
    pub value: Option<f64>,
}

impl Sample {
    /// A slot holding a value
    pub const fn present(timestamp: u64, value: f64) -> Self {
        Self {
            timestamp,
            value: Some(value),
        }
    }

    /// An empty slot
    pub const fn missing(timestamp: u64) -> Self {
        Self {
            timestamp,
            value: None,
        }
    }
}

/// Consolidation applied by storage when fetching a window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Aggregation {
    /// Mean of the covered slots
    Average,
    /// Minimum of the covered slots
    Min,
    /// Maximum of the covered slots
    Max,
    /// Most recent covered slot
    Last,
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Average => write!(f, "AVERAGE"),
            Self::Min => write!(f, "MIN"),
            Self::Max => write!(f, "MAX"),
            Self::Last => write!(f, "LAST"),
        }
    }
}

/// A freshly collected sample value as handed over by a collector
///
/// Collectors deliver numbers for most protocols, but some (SNMP string
/// tables, command output) deliver text that must be coerced before
/// comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleValue {
    /// Collection produced no value
    Missing,
    /// Numeric sample
    Numeric(f64),
    /// Text sample, coerced to a number at the evaluation boundary
    Text(String),
}

impl SampleValue {
    /// Coerce to a float
    ///
    /// Unparsable text is treated as an absent value; a check can degrade
    /// but never abort on a malformed sample.
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Self::Missing => None,
            Self::Numeric(value) => Some(*value),
            Self::Text(text) => match text.trim().parse::<f64>() {
                Ok(value) => Some(value),
                Err(_) => {
                    log::debug!("Discarding unparsable sample value '{}'", text);
                    None
                }
            },
        }
    }
}

impl From<f64> for SampleValue {
    fn from(value: f64) -> Self {
        Self::Numeric(value)
    }
}

impl From<Option<f64>> for SampleValue {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(v) => Self::Numeric(v),
            None => Self::Missing,
        }
    }
}

impl From<&str> for SampleValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_kind_gauge() {
        assert!(SeriesKind::Gauge.is_gauge());
        assert!(!SeriesKind::Counter.is_gauge());
        assert!(!SeriesKind::Derive.is_gauge());
    }

    #[test]
    fn test_series_kind_display() {
        assert_eq!(SeriesKind::Gauge.to_string(), "GAUGE");
        assert_eq!(SeriesKind::Counter.to_string(), "COUNTER");
    }

    #[test]
    fn test_sample_value_coercion() {
        assert_eq!(SampleValue::Numeric(4.5).to_f64(), Some(4.5));
        assert_eq!(SampleValue::Text("42".to_string()).to_f64(), Some(42.0));
        assert_eq!(SampleValue::Text(" 3.5 ".to_string()).to_f64(), Some(3.5));
        assert_eq!(SampleValue::Missing.to_f64(), None);
    }

    #[test]
    fn test_unparsable_text_is_absent() {
        assert_eq!(SampleValue::Text("up".to_string()).to_f64(), None);
    }

    #[test]
    fn test_aggregation_display() {
        assert_eq!(Aggregation::Average.to_string(), "AVERAGE");
        assert_eq!(Aggregation::Last.to_string(), "LAST");
    }
}
