//! Event severity scale
//!
//! The six-level severity scale of the host event system, 0 (Clear)
//! through 5 (Critical).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity carried on clear events.
///
/// Restore events always use this level unless the engine is configured
/// otherwise; see `EngineSettings::clear_severity`.
pub const CLEAR_SEVERITY: Severity = Severity::Clear;

/// Event severity levels, ordered from Clear (0) to Critical (5)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Condition no longer holds
    #[default]
    Clear,
    /// Diagnostic noise
    Debug,
    /// Informational, no action needed
    Info,
    /// Attention recommended
    Warning,
    /// Action required soon
    Error,
    /// Immediate action required
    Critical,
}

impl Severity {
    /// Numeric level on the host 0-5 scale
    pub const fn level(self) -> u8 {
        match self {
            Self::Clear => 0,
            Self::Debug => 1,
            Self::Info => 2,
            Self::Warning => 3,
            Self::Error => 4,
            Self::Critical => 5,
        }
    }

    /// Severity for a numeric level, if in range
    pub const fn from_level(level: u8) -> Option<Self> {
        match level {
            0 => Some(Self::Clear),
            1 => Some(Self::Debug),
            2 => Some(Self::Info),
            3 => Some(Self::Warning),
            4 => Some(Self::Error),
            5 => Some(Self::Critical),
            _ => None,
        }
    }

    /// The next level up, capped at Critical
    pub const fn escalated(self) -> Self {
        match self {
            Self::Clear => Self::Debug,
            Self::Debug => Self::Info,
            Self::Info => Self::Warning,
            Self::Warning => Self::Error,
            Self::Error | Self::Critical => Self::Critical,
        }
    }

    /// Whether this is the clear level
    pub const fn is_clear(self) -> bool {
        matches!(self, Self::Clear)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clear => write!(f, "CLEAR"),
            Self::Debug => write!(f, "DEBUG"),
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARNING"),
            Self::Error => write!(f, "ERROR"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}
