//! Threshold evaluation state
//!
//! One [`ThresholdState`] attaches a rule to a monitored entity and
//! carries everything mutable across evaluation passes: the per-pass
//! resolved target, the lazily populated series metadata cache, and a
//! handle to the shared violation counter store.

use super::counter::ViolationCounters;
use super::kind::ThresholdKind;
use crate::domain::{
    Aggregation, EntityContext, SampleValue, SeriesMetadata, Severity, ThresholdEvent,
    CLEAR_SEVERITY,
};
use crate::error::{ExpressionError, StorageError};
use crate::expr::ExpressionEvaluator;
use crate::storage::SeriesStore;
use std::collections::HashMap;
use std::sync::Arc;

/// Runtime state of one (rule, entity) attachment
///
/// Lives for the lifetime of the attachment. The metadata cache is
/// populated on first access per data point and never invalidated; a
/// redundant recompute after a racy first lookup is harmless, so no
/// locking is needed here.
pub struct ThresholdState {
    kind: Arc<dyn ThresholdKind>,
    entity: EntityContext,
    counters: Arc<ViolationCounters>,
    clear_severity: Severity,
    resolved_target: Option<f64>,
    metadata_cache: HashMap<String, SeriesMetadata>,
}

impl ThresholdState {
    /// Attach a rule to an entity, sharing the given counter store
    pub fn new(
        kind: Arc<dyn ThresholdKind>,
        entity: EntityContext,
        counters: Arc<ViolationCounters>,
    ) -> Self {
        Self {
            kind,
            entity,
            counters,
            clear_severity: CLEAR_SEVERITY,
            resolved_target: None,
            metadata_cache: HashMap::new(),
        }
    }

    /// Override the severity placed on clear events
    pub fn with_clear_severity(mut self, severity: Severity) -> Self {
        self.clear_severity = severity;
        self
    }

    /// The rule driving this state
    pub fn kind(&self) -> &dyn ThresholdKind {
        self.kind.as_ref()
    }

    /// The monitored entity
    pub fn entity(&self) -> &EntityContext {
        &self.entity
    }

    /// Target resolved for the current pass, if any
    pub fn resolved_target(&self) -> Option<f64> {
        self.resolved_target
    }

    /// Resolve the target for this evaluation pass
    ///
    /// On failure the target is left unset so nothing can match this
    /// pass; the error is handed back for the caller to account for,
    /// and evaluation keeps running.
    pub fn resolve_target(
        &mut self,
        evaluator: &dyn ExpressionEvaluator,
    ) -> Result<Option<f64>, ExpressionError> {
        match self.kind.resolve_target(evaluator, &self.entity) {
            Ok(target) => {
                self.resolved_target = target;
                Ok(target)
            }
            Err(err) => {
                self.resolved_target = None;
                Err(err)
            }
        }
    }

    /// Series metadata for a data point, cached after the first lookup
    ///
    /// A failed lookup is neither cached nor retried here; the next pass
    /// asks again.
    pub fn metadata(
        &mut self,
        store: &dyn SeriesStore,
        data_point: &str,
    ) -> Result<SeriesMetadata, StorageError> {
        if let Some(meta) = self.metadata_cache.get(data_point) {
            return Ok(*meta);
        }
        let meta = store.metadata(self.entity.series_path(), data_point)?;
        self.metadata_cache.insert(data_point.to_string(), meta);
        Ok(meta)
    }

    /// Most recent present value within the last two sampling periods
    ///
    /// A store failure here means "no value available" for the pass; it
    /// is logged and never escalated into a violation or a clear.
    pub fn last_value(
        &self,
        store: &dyn SeriesStore,
        data_point: &str,
        step_secs: u64,
        now: u64,
    ) -> Option<f64> {
        let start = now.saturating_sub(2 * step_secs);
        match store.samples(
            self.entity.series_path(),
            data_point,
            Aggregation::Average,
            start,
            now,
        ) {
            Ok(samples) => samples.iter().rev().find_map(|sample| sample.value),
            Err(err) => {
                log::warn!(
                    "No recent value for '{}' on {}: {}",
                    data_point,
                    self.entity,
                    err
                );
                None
            }
        }
    }

    /// Re-evaluate every watched data point from stored history
    ///
    /// A data point whose metadata cannot be read is skipped for this
    /// pass; the remaining data points still evaluate.
    pub fn check(&mut self, store: &dyn SeriesStore, now: u64) -> Vec<ThresholdEvent> {
        let kind = Arc::clone(&self.kind);
        let mut events = Vec::new();
        for data_point in kind.data_points() {
            let meta = match self.metadata(store, data_point) {
                Ok(meta) => meta,
                Err(err) => {
                    log::warn!(
                        "Skipping data point '{}' of threshold '{}' on {}: {}",
                        data_point,
                        kind.id(),
                        self.entity,
                        err
                    );
                    continue;
                }
            };
            let value = self.last_value(store, data_point, meta.step_secs, now);
            events.extend(self.check_point(data_point, value));
        }
        events
    }

    /// Evaluate one freshly collected sample
    ///
    /// Gauge series use a present sample directly. Counter-like series
    /// fall back to the windowed last-value lookup when the sample is
    /// absent. A metadata failure yields no events for this call.
    pub fn check_raw(
        &mut self,
        store: &dyn SeriesStore,
        data_point: &str,
        sample: &SampleValue,
        now: u64,
    ) -> Vec<ThresholdEvent> {
        let meta = match self.metadata(store, data_point) {
            Ok(meta) => meta,
            Err(err) => {
                log::warn!(
                    "Unable to read series metadata for '{}' on {}: {}",
                    data_point,
                    self.entity,
                    err
                );
                return Vec::new();
            }
        };
        let mut value = sample.to_f64();
        if value.is_none() && !meta.kind.is_gauge() {
            value = self.last_value(store, data_point, meta.step_secs, now);
        }
        self.check_point(data_point, value)
    }

    /// Compare one value against the resolved target
    ///
    /// Emits at most one event: a violation while the value sits on the
    /// target, or a single clear on the transition away from it. An
    /// absent value changes nothing.
    pub fn check_point(&self, data_point: &str, value: Option<f64>) -> Vec<ThresholdEvent> {
        log::debug!(
            "Checking {} {:?} against point {:?}",
            data_point,
            value,
            self.resolved_target
        );
        let Some(value) = value else {
            return Vec::new();
        };

        let matched = self
            .resolved_target
            .is_some_and(|target| self.kind.matches(value, target));

        if matched {
            let count = self.counters.increment(&self.entity, data_point);
            let mut severity = self.kind.severity();
            if self.kind.escalate_count() > 0 && count >= self.kind.escalate_count() {
                severity = severity.escalated();
            }
            let summary = format!(
                "Threshold of {} met: current value {:.2}",
                self.kind.id(),
                value
            );
            vec![self.event(severity, summary)]
        } else {
            match self.counters.get(&self.entity, data_point) {
                // Already clear; stay quiet
                Some(0) => Vec::new(),
                _ => {
                    let summary = format!(
                        "Threshold of {} restored: current value: {:.2}",
                        self.kind.id(),
                        value
                    );
                    self.counters.reset(&self.entity, data_point);
                    vec![self.event(self.clear_severity, summary)]
                }
            }
        }
    }

    fn event(&self, severity: Severity, summary: String) -> ThresholdEvent {
        ThresholdEvent {
            device: self.entity.device_name().to_string(),
            component: self.entity.component_name().to_string(),
            event_key: self.kind.id().to_string(),
            event_class: self.kind.event_class().to_string(),
            severity,
            summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Sample, SeriesKind};
    use crate::mock::{MockEvaluator, MockStore};
    use crate::threshold::PointThreshold;

    const NOW: u64 = 1_700_000_000;

    fn entity() -> EntityContext {
        EntityContext::component("core-sw1", "eth0", "Devices/core-sw1/eth0")
    }

    fn state_for(rule: PointThreshold) -> ThresholdState {
        ThresholdState::new(
            Arc::new(rule),
            entity(),
            Arc::new(ViolationCounters::new()),
        )
    }

    fn resolved(rule: PointThreshold) -> ThresholdState {
        let mut state = state_for(rule);
        state.resolve_target(&MockEvaluator::new()).unwrap();
        state
    }

    #[test]
    fn test_absent_value_yields_nothing() {
        let state = resolved(PointThreshold::new("linkDown", 2.0));
        assert!(state.check_point("ifOperStatus", None).is_empty());
    }

    #[test]
    fn test_violation_event_fields() {
        let state = resolved(
            PointThreshold::new("linkDown", 2.0).with_data_points(["ifOperStatus"]),
        );
        let events = state.check_point("ifOperStatus", Some(2.0));
        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.device, "core-sw1");
        assert_eq!(event.component, "eth0");
        assert_eq!(event.event_key, "linkDown");
        assert_eq!(event.event_class, "/Perf/Snmp");
        assert_eq!(event.severity, Severity::Warning);
        assert_eq!(event.summary, "Threshold of linkDown met: current value 2.00");
    }

    #[test]
    fn test_hysteresis_match_match_clear() {
        let state = resolved(PointThreshold::new("linkDown", 2.0));
        let first = state.check_point("ifOperStatus", Some(2.0));
        let second = state.check_point("ifOperStatus", Some(2.0));
        let third = state.check_point("ifOperStatus", Some(1.0));
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
        assert!(!first[0].is_clear() && !second[0].is_clear());
        assert_eq!(third.len(), 1);
        assert!(third[0].is_clear());
        assert_eq!(
            third[0].summary,
            "Threshold of linkDown restored: current value: 1.00"
        );
    }

    #[test]
    fn test_clear_emitted_once() {
        let state = resolved(PointThreshold::new("linkDown", 2.0));
        assert_eq!(state.check_point("ifOperStatus", Some(2.0)).len(), 1);
        assert_eq!(state.check_point("ifOperStatus", Some(1.0)).len(), 1);
        // Identical value and state again: already clear, stay quiet
        assert!(state.check_point("ifOperStatus", Some(1.0)).is_empty());
        assert!(state.check_point("ifOperStatus", Some(3.0)).is_empty());
    }

    #[test]
    fn test_unknown_state_clears_on_first_miss() {
        // Absent counter means state unknown (e.g. after restart): one
        // clear is emitted to settle it, then silence
        let state = resolved(PointThreshold::new("linkDown", 2.0));
        assert_eq!(state.check_point("ifOperStatus", Some(1.0)).len(), 1);
        assert!(state.check_point("ifOperStatus", Some(1.0)).is_empty());
    }

    #[test]
    fn test_escalation_after_count() {
        let state = resolved(
            PointThreshold::new("linkDown", 2.0)
                .with_severity(Severity::Warning)
                .with_escalation(3),
        );
        let severities: Vec<Severity> = (0..4)
            .map(|_| state.check_point("ifOperStatus", Some(2.0))[0].severity)
            .collect();
        assert_eq!(
            severities,
            vec![
                Severity::Warning,
                Severity::Warning,
                Severity::Error,
                Severity::Error
            ]
        );
    }

    #[test]
    fn test_escalation_capped_at_critical() {
        let state = resolved(
            PointThreshold::new("linkDown", 2.0)
                .with_severity(Severity::Critical)
                .with_escalation(1),
        );
        let events = state.check_point("ifOperStatus", Some(2.0));
        assert_eq!(events[0].severity, Severity::Critical);
    }

    #[test]
    fn test_escalation_resets_with_streak() {
        let state = resolved(
            PointThreshold::new("linkDown", 2.0)
                .with_severity(Severity::Warning)
                .with_escalation(2),
        );
        state.check_point("ifOperStatus", Some(2.0));
        assert_eq!(
            state.check_point("ifOperStatus", Some(2.0))[0].severity,
            Severity::Error
        );
        state.check_point("ifOperStatus", Some(1.0));
        // Streak broken; escalation starts over
        assert_eq!(
            state.check_point("ifOperStatus", Some(2.0))[0].severity,
            Severity::Warning
        );
    }

    #[test]
    fn test_no_target_never_matches() {
        let rule = PointThreshold::new("linkDown", 2.0).with_expression("here.zIfDownValue");
        let mut state = state_for(rule);
        let evaluator = MockEvaluator::new().with_failure("here.zIfDownValue");
        assert!(state.resolve_target(&evaluator).is_err());
        assert_eq!(state.resolved_target(), None);
        // Value equal to the literal still cannot match without a target;
        // the first miss settles unknown state with one clear
        let events = state.check_point("ifOperStatus", Some(2.0));
        assert_eq!(events.len(), 1);
        assert!(events[0].is_clear());
        assert!(state.check_point("ifOperStatus", Some(2.0)).is_empty());
    }

    #[test]
    fn test_entities_keep_independent_streaks() {
        let counters = Arc::new(ViolationCounters::new());
        let rule = Arc::new(PointThreshold::new("linkDown", 2.0));
        let mut sw1 = ThresholdState::new(
            Arc::clone(&rule) as Arc<dyn ThresholdKind>,
            EntityContext::device("sw1", "Devices/sw1"),
            Arc::clone(&counters),
        );
        let mut sw2 = ThresholdState::new(
            Arc::clone(&rule) as Arc<dyn ThresholdKind>,
            EntityContext::device("sw2", "Devices/sw2"),
            Arc::clone(&counters),
        );
        let evaluator = MockEvaluator::new();
        sw1.resolve_target(&evaluator).unwrap();
        sw2.resolve_target(&evaluator).unwrap();

        sw1.check_point("ifOperStatus", Some(2.0));
        sw1.check_point("ifOperStatus", Some(2.0));
        sw2.check_point("ifOperStatus", Some(2.0));
        assert_eq!(
            counters.get(sw1.entity(), "ifOperStatus"),
            Some(2),
        );
        assert_eq!(
            counters.get(sw2.entity(), "ifOperStatus"),
            Some(1),
        );
    }

    #[test]
    fn test_check_reads_last_present_value() {
        let store = MockStore::new()
            .with_metadata("ifOperStatus", SeriesMetadata::new(300, SeriesKind::Gauge))
            .with_samples(
                "ifOperStatus",
                vec![
                    Sample::present(NOW - 600, 1.0),
                    Sample::present(NOW - 300, 2.0),
                    Sample::missing(NOW),
                ],
            );
        let mut state = resolved(
            PointThreshold::new("linkDown", 2.0).with_data_points(["ifOperStatus"]),
        );
        let events = state.check(&store, NOW);
        assert_eq!(events.len(), 1);
        assert!(!events[0].is_clear());
    }

    #[test]
    fn test_check_skips_data_point_without_metadata() {
        let store = MockStore::new()
            .with_metadata("ifInErrors", SeriesMetadata::new(300, SeriesKind::Gauge))
            .with_samples("ifInErrors", vec![Sample::present(NOW - 300, 5.0)])
            .with_metadata_failure("ifOperStatus");
        let mut state = resolved(
            PointThreshold::new("errs", 5.0).with_data_points(["ifOperStatus", "ifInErrors"]),
        );
        // ifOperStatus is skipped, ifInErrors still evaluates
        let events = state.check(&store, NOW);
        assert_eq!(events.len(), 1);
        assert!(!events[0].is_clear());
    }

    #[test]
    fn test_check_with_empty_window_yields_nothing() {
        let store = MockStore::new()
            .with_metadata("ifOperStatus", SeriesMetadata::new(300, SeriesKind::Gauge))
            .with_samples(
                "ifOperStatus",
                vec![Sample::missing(NOW - 300), Sample::missing(NOW)],
            );
        let mut state = resolved(
            PointThreshold::new("linkDown", 2.0).with_data_points(["ifOperStatus"]),
        );
        assert!(state.check(&store, NOW).is_empty());
    }

    #[test]
    fn test_metadata_cached_after_first_lookup() {
        let store = MockStore::new()
            .with_metadata("ifOperStatus", SeriesMetadata::new(300, SeriesKind::Gauge))
            .with_samples("ifOperStatus", vec![Sample::present(NOW - 300, 2.0)]);
        let mut state = resolved(
            PointThreshold::new("linkDown", 2.0).with_data_points(["ifOperStatus"]),
        );
        state.check(&store, NOW);
        state.check(&store, NOW);
        state.check(&store, NOW);
        assert_eq!(store.metadata_lookups(), 1);
    }

    #[test]
    fn test_check_raw_gauge_uses_live_sample() {
        let store = MockStore::new()
            .with_metadata("ifOperStatus", SeriesMetadata::new(300, SeriesKind::Gauge))
            .with_samples("ifOperStatus", vec![Sample::present(NOW - 300, 1.0)]);
        let mut state = resolved(PointThreshold::new("linkDown", 2.0));
        let events = state.check_raw(&store, "ifOperStatus", &SampleValue::Numeric(2.0), NOW);
        assert_eq!(events.len(), 1);
        assert!(!events[0].is_clear());
        assert_eq!(store.sample_fetches(), 0);
    }

    #[test]
    fn test_check_raw_gauge_missing_sample_does_not_fall_back() {
        let store = MockStore::new()
            .with_metadata("ifOperStatus", SeriesMetadata::new(300, SeriesKind::Gauge))
            .with_samples("ifOperStatus", vec![Sample::present(NOW - 300, 2.0)]);
        let mut state = resolved(PointThreshold::new("linkDown", 2.0));
        let events = state.check_raw(&store, "ifOperStatus", &SampleValue::Missing, NOW);
        assert!(events.is_empty());
        assert_eq!(store.sample_fetches(), 0);
    }

    #[test]
    fn test_check_raw_counter_falls_back_to_history() {
        let store = MockStore::new()
            .with_metadata("ifInOctets", SeriesMetadata::new(300, SeriesKind::Counter))
            .with_samples("ifInOctets", vec![Sample::present(NOW - 300, 2.0)]);
        let mut state = resolved(PointThreshold::new("linkDown", 2.0));
        let events = state.check_raw(&store, "ifInOctets", &SampleValue::Missing, NOW);
        assert_eq!(events.len(), 1);
        assert!(!events[0].is_clear());
        assert_eq!(store.sample_fetches(), 1);
    }

    #[test]
    fn test_check_raw_metadata_failure_is_silent() {
        let store = MockStore::new().with_metadata_failure("ifOperStatus");
        let mut state = resolved(PointThreshold::new("linkDown", 2.0));
        let events = state.check_raw(&store, "ifOperStatus", &SampleValue::Numeric(2.0), NOW);
        assert!(events.is_empty());
    }

    #[test]
    fn test_check_raw_coerces_text_samples() {
        let store = MockStore::new()
            .with_metadata("ifOperStatus", SeriesMetadata::new(300, SeriesKind::Gauge));
        let mut state = resolved(PointThreshold::new("linkDown", 2.0));
        let events = state.check_raw(
            &store,
            "ifOperStatus",
            &SampleValue::Text("2".to_string()),
            NOW,
        );
        assert_eq!(events.len(), 1);
        assert!(!events[0].is_clear());
    }

    #[test]
    fn test_sample_fetch_failure_yields_nothing() {
        let store = MockStore::new()
            .with_metadata("ifOperStatus", SeriesMetadata::new(300, SeriesKind::Gauge))
            .with_samples_failure("ifOperStatus");
        let mut state = resolved(
            PointThreshold::new("linkDown", 2.0).with_data_points(["ifOperStatus"]),
        );
        assert!(state.check(&store, NOW).is_empty());
    }
}
