//! Historical series store boundary
//!
//! Abstracts the round-robin time-series backend so the engine can be
//! tested against scripted stores, the same way the hardware layer is
//! abstracted elsewhere in this codebase.

use crate::domain::{Aggregation, Sample, SeriesMetadata};
use crate::error::StorageError;

/// Read access to historical series data
///
/// The two lookups here are the engine's only suspension points.
/// Implementations are expected to bound both with a deadline and
/// answer [`StorageError::Timeout`] when it elapses; the engine treats
/// any failed fetch as "no value available", never as a violation.
pub trait SeriesStore: Send + Sync {
    /// Native sampling parameters of one series
    fn metadata(
        &self,
        series_path: &str,
        data_point: &str,
    ) -> Result<SeriesMetadata, StorageError>;

    /// Consolidated samples over `[start, end]`, oldest first
    ///
    /// Every slot in the range is returned; slots without data carry an
    /// absent value.
    fn samples(
        &self,
        series_path: &str,
        data_point: &str,
        aggregation: Aggregation,
        start: u64,
        end: u64,
    ) -> Result<Vec<Sample>, StorageError>;
}
