//! Mock implementations for testing
//!
//! Provides a scriptable series store, expression evaluator, and event
//! sink for unit testing without a real storage backend or expression
//! engine.

use crate::domain::{Aggregation, EntityContext, Sample, SeriesMetadata, ThresholdEvent};
use crate::error::{ExpressionError, Result, StorageError};
use crate::expr::ExpressionEvaluator;
use crate::sink::EventSink;
use crate::storage::SeriesStore;

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

/// Mock series store for testing
///
/// Series are keyed by data point name only; the series path is
/// accepted and ignored. Lookup counters expose how often the engine
/// actually hit the store.
#[derive(Debug, Default)]
pub struct MockStore {
    metadata: Mutex<HashMap<String, SeriesMetadata>>,
    samples: Mutex<HashMap<String, Vec<Sample>>>,
    metadata_failures: Mutex<HashSet<String>>,
    samples_failures: Mutex<HashSet<String>>,
    metadata_lookups: AtomicU32,
    sample_fetches: AtomicU32,
}

impl MockStore {
    /// Create an empty mock store
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set metadata for a data point
    pub fn with_metadata(self, data_point: impl Into<String>, meta: SeriesMetadata) -> Self {
        self.metadata.lock().unwrap().insert(data_point.into(), meta);
        self
    }

    /// Builder: set the stored samples for a data point
    pub fn with_samples(self, data_point: impl Into<String>, samples: Vec<Sample>) -> Self {
        self.samples.lock().unwrap().insert(data_point.into(), samples);
        self
    }

    /// Builder: make metadata lookups fail for a data point
    pub fn with_metadata_failure(self, data_point: impl Into<String>) -> Self {
        self.metadata_failures
            .lock()
            .unwrap()
            .insert(data_point.into());
        self
    }

    /// Builder: make sample fetches fail for a data point
    pub fn with_samples_failure(self, data_point: impl Into<String>) -> Self {
        self.samples_failures
            .lock()
            .unwrap()
            .insert(data_point.into());
        self
    }

    /// Replace the stored samples for a data point
    pub fn set_samples(&self, data_point: impl Into<String>, samples: Vec<Sample>) {
        self.samples.lock().unwrap().insert(data_point.into(), samples);
    }

    /// How many metadata lookups reached the store
    pub fn metadata_lookups(&self) -> u32 {
        self.metadata_lookups.load(Ordering::Relaxed)
    }

    /// How many sample fetches reached the store
    pub fn sample_fetches(&self) -> u32 {
        self.sample_fetches.load(Ordering::Relaxed)
    }
}

impl SeriesStore for MockStore {
    fn metadata(
        &self,
        _series_path: &str,
        data_point: &str,
    ) -> std::result::Result<SeriesMetadata, StorageError> {
        self.metadata_lookups.fetch_add(1, Ordering::Relaxed);
        if self.metadata_failures.lock().unwrap().contains(data_point) {
            return Err(StorageError::MetadataUnavailable {
                data_point: data_point.to_string(),
                message: "injected failure".to_string(),
            });
        }
        self.metadata
            .lock()
            .unwrap()
            .get(data_point)
            .copied()
            .ok_or_else(|| StorageError::MetadataUnavailable {
                data_point: data_point.to_string(),
                message: "unknown series".to_string(),
            })
    }

    fn samples(
        &self,
        _series_path: &str,
        data_point: &str,
        _aggregation: Aggregation,
        start: u64,
        end: u64,
    ) -> std::result::Result<Vec<Sample>, StorageError> {
        self.sample_fetches.fetch_add(1, Ordering::Relaxed);
        if self.samples_failures.lock().unwrap().contains(data_point) {
            return Err(StorageError::FetchFailed {
                data_point: data_point.to_string(),
                message: "injected failure".to_string(),
            });
        }
        Ok(self
            .samples
            .lock()
            .unwrap()
            .get(data_point)
            .map(|series| {
                series
                    .iter()
                    .filter(|s| s.timestamp >= start && s.timestamp <= end)
                    .copied()
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// Mock expression evaluator for testing
///
/// Answers from a scripted expression table; unknown expressions and
/// scripted failures both evaluate to errors.
#[derive(Debug, Default)]
pub struct MockEvaluator {
    results: Mutex<HashMap<String, serde_json::Value>>,
    failures: Mutex<HashSet<String>>,
}

impl MockEvaluator {
    /// Create an evaluator with no bindings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: bind an expression to a result
    pub fn with_result(self, expression: impl Into<String>, value: serde_json::Value) -> Self {
        self.results.lock().unwrap().insert(expression.into(), value);
        self
    }

    /// Builder: make an expression fail to evaluate
    pub fn with_failure(self, expression: impl Into<String>) -> Self {
        self.failures.lock().unwrap().insert(expression.into());
        self
    }
}

impl ExpressionEvaluator for MockEvaluator {
    fn evaluate(
        &self,
        expression: &str,
        _entity: &EntityContext,
    ) -> std::result::Result<serde_json::Value, ExpressionError> {
        if self.failures.lock().unwrap().contains(expression) {
            return Err(ExpressionError::EvaluationFailed {
                expression: expression.to_string(),
                message: "injected failure".to_string(),
            });
        }
        self.results
            .lock()
            .unwrap()
            .get(expression)
            .cloned()
            .ok_or_else(|| ExpressionError::EvaluationFailed {
                expression: expression.to_string(),
                message: "no binding for expression".to_string(),
            })
    }
}

/// Event sink that records every submitted event
///
/// Clones share the same underlying buffer, so a test can keep one
/// handle and register another with the engine.
#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    events: Arc<Mutex<Vec<ThresholdEvent>>>,
}

impl CollectingSink {
    /// Create an empty collecting sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events seen so far
    pub fn events(&self) -> Vec<ThresholdEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for CollectingSink {
    fn submit(&self, event: &ThresholdEvent) -> Result<()> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "collecting"
    }
}
