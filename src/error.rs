//! Unified error types for pointmon
//!
//! This module defines all error types used throughout the engine.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;

/// Top-level engine error type
#[derive(Error, Debug)]
pub enum EngineError {
    /// Error from expression evaluation
    #[error("Expression error: {0}")]
    Expression(#[from] ExpressionError),

    /// Error from the historical series store
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Error from RPN evaluation
    #[error("RPN error: {0}")]
    Rpn(#[from] RpnError),

    /// Error from graph annotation
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    /// Error from configuration parsing/validation
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO error (event sinks, file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the RPN evaluator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RpnError {
    /// Token stream could not be evaluated to a single value
    #[error("Malformed RPN expression '{tokens}': {reason}")]
    MalformedExpression { tokens: String, reason: String },
}

/// Errors from the expression-evaluation collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExpressionError {
    /// The expression itself failed to evaluate
    #[error("Expression '{expression}' failed to evaluate: {message}")]
    EvaluationFailed { expression: String, message: String },

    /// The expression evaluated, but not to a number
    #[error("Expression '{expression}' did not produce a numeric value")]
    NotNumeric { expression: String },

    /// The expression evaluated, but not to text
    #[error("Expression '{expression}' did not produce a text value")]
    NotText { expression: String },
}

/// Errors from the historical series store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Sampling metadata could not be read for a data point
    #[error("No series metadata for data point '{data_point}': {message}")]
    MetadataUnavailable { data_point: String, message: String },

    /// Sample fetch failed
    #[error("Failed to fetch samples for data point '{data_point}': {message}")]
    FetchFailed { data_point: String, message: String },

    /// The store did not answer within its deadline
    #[error("Series store timed out reading data point '{data_point}'")]
    Timeout { data_point: String },
}

/// Errors from graph annotation building
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// The RPN transform string itself failed to evaluate
    #[error("RPN transform for threshold '{threshold}' failed: {source}")]
    TransformFailed {
        threshold: String,
        #[source]
        source: ExpressionError,
    },

    /// RPN evaluation against the target value failed
    #[error("RPN evaluation failed for threshold '{threshold}': {source}")]
    RpnEvaluationFailed {
        threshold: String,
        #[source]
        source: RpnError,
    },
}

/// Errors from configuration parsing and validation
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Failed to parse config file
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Invalid config value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// IO error reading or writing the config file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using EngineError
pub type Result<T> = std::result::Result<T, EngineError>;
