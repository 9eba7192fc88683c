//! Threshold configuration
//!
//! Provides TOML-based configuration for threshold definitions and
//! engine settings. The engine itself only reads definitions; editing
//! belongs to configuration tooling.

use crate::domain::Severity;
use crate::engine::EngineConfig;
use crate::error::ConfigError;
use crate::threshold::PointThreshold;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Threshold configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdsFile {
    /// Global engine settings
    #[serde(default)]
    pub settings: EngineSettings,
    /// Threshold definitions
    #[serde(default)]
    pub thresholds: Vec<ThresholdDefConfig>,
}

impl ThresholdsFile {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().display().to_string();
        let contents =
            fs::read_to_string(path.as_ref()).map_err(|_| ConfigError::FileNotFound(path_str))?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError(format!("{}", e)))
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::ParseError(format!("Failed to serialize: {}", e)))?;

        fs::write(path.as_ref(), contents)?;

        Ok(())
    }

    /// Get default configuration path
    pub fn default_path() -> PathBuf {
        if let Some(config_dir) = dirs::config_dir() {
            config_dir.join("pointmon").join("thresholds.toml")
        } else {
            PathBuf::from("thresholds.toml")
        }
    }

    /// Convert to threshold definitions, skipping disabled entries
    pub fn to_definitions(&self) -> Result<Vec<PointThreshold>, ConfigError> {
        self.thresholds
            .iter()
            .filter(|t| t.enabled)
            .map(|t| t.to_definition())
            .collect()
    }
}

impl Default for ThresholdsFile {
    fn default() -> Self {
        Self {
            settings: EngineSettings::default(),
            thresholds: Vec::new(),
        }
    }
}

/// Global engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Whether evaluation is enabled globally
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Severity name placed on clear events
    #[serde(default = "default_clear_severity")]
    pub clear_severity: String,
}

impl EngineSettings {
    /// Convert to the engine's runtime configuration
    pub fn to_engine_config(&self) -> Result<EngineConfig, ConfigError> {
        Ok(EngineConfig {
            enabled: self.enabled,
            clear_severity: parse_severity("clear_severity", &self.clear_severity)?,
        })
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            clear_severity: default_clear_severity(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_clear_severity() -> String {
    "clear".to_string()
}

fn default_event_class() -> String {
    crate::threshold::DEFAULT_EVENT_CLASS.to_string()
}

fn default_severity() -> String {
    "warning".to_string()
}

/// Threshold definition (TOML-friendly format)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdDefConfig {
    /// Rule identifier
    pub id: String,
    /// Literal target value
    #[serde(default)]
    pub target: f64,
    /// Optional expression producing the target dynamically
    pub target_expression: Option<String>,
    /// Event classification tag
    #[serde(default = "default_event_class")]
    pub event_class: String,
    /// Severity level (name or numeric 0-5)
    #[serde(default = "default_severity")]
    pub severity: String,
    /// Consecutive violations before severity escalates; 0 disables
    #[serde(default)]
    pub escalate_count: u32,
    /// Data points the rule watches
    pub data_points: Vec<String>,
    /// Whether the definition is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl ThresholdDefConfig {
    /// Convert to a PointThreshold definition
    pub fn to_definition(&self) -> Result<PointThreshold, ConfigError> {
        if self.data_points.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "data_points".to_string(),
                message: format!("threshold '{}' watches no data points", self.id),
            });
        }

        let severity = parse_severity("severity", &self.severity)?;

        let mut rule = PointThreshold::new(self.id.clone(), self.target)
            .with_event_class(self.event_class.clone())
            .with_severity(severity)
            .with_escalation(self.escalate_count)
            .with_data_points(self.data_points.clone());

        if let Some(expression) = &self.target_expression {
            rule = rule.with_expression(expression.clone());
        }

        Ok(rule)
    }
}

fn parse_severity(key: &str, value: &str) -> Result<Severity, ConfigError> {
    if let Ok(level) = value.parse::<u8>() {
        return Severity::from_level(level).ok_or_else(|| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("severity level {} out of range 0-5", level),
        });
    }
    match value.to_lowercase().as_str() {
        "clear" => Ok(Severity::Clear),
        "debug" => Ok(Severity::Debug),
        "info" => Ok(Severity::Info),
        "warning" => Ok(Severity::Warning),
        "error" => Ok(Severity::Error),
        "critical" => Ok(Severity::Critical),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("Unknown severity level: {}", value),
        }),
    }
}
