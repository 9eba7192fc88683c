//! Threshold engine façade
//!
//! Owns the (rule, entity) attachments, the shared violation counter
//! store, and the registered event sinks. A surrounding collector or
//! scheduler drives it: `run_pass` for periodic bulk re-checks,
//! `ingest` for freshly collected samples.

use crate::domain::{EntityContext, SampleValue, Severity, ThresholdEvent};
use crate::expr::ExpressionEvaluator;
use crate::sink::{EventSink, SinkSet};
use crate::storage::SeriesStore;
use crate::threshold::{ThresholdKind, ThresholdState, ViolationCounters};
use std::sync::Arc;

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Whether evaluation is enabled
    pub enabled: bool,
    /// Severity placed on clear events
    pub clear_severity: Severity,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            clear_severity: Severity::Clear,
        }
    }
}

/// Threshold evaluation engine
///
/// Attachments evaluate independently of one another; the only shared
/// mutable structure is the counter store, which takes its own lock.
pub struct ThresholdEngine {
    config: EngineConfig,
    counters: Arc<ViolationCounters>,
    states: Vec<ThresholdState>,
    sinks: SinkSet,
}

impl ThresholdEngine {
    /// Create an engine with the given configuration
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            counters: Arc::new(ViolationCounters::new()),
            states: Vec::new(),
            sinks: SinkSet::new(),
        }
    }

    /// Create a disabled engine (no-op)
    pub fn disabled() -> Self {
        Self::new(EngineConfig {
            enabled: false,
            ..EngineConfig::default()
        })
    }

    /// Whether evaluation is enabled
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// The shared violation counter store
    pub fn counters(&self) -> &Arc<ViolationCounters> {
        &self.counters
    }

    /// Current attachments
    pub fn states(&self) -> &[ThresholdState] {
        &self.states
    }

    /// Register an event sink
    pub fn add_sink(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.add(sink);
    }

    /// Attach a rule to a monitored entity
    ///
    /// The attachment lives until [`Self::detach`] removes it.
    pub fn attach(&mut self, kind: Arc<dyn ThresholdKind>, entity: EntityContext) {
        let state = ThresholdState::new(kind, entity, Arc::clone(&self.counters))
            .with_clear_severity(self.config.clear_severity);
        self.states.push(state);
    }

    /// Remove every attachment of a rule to an entity
    pub fn detach(&mut self, rule_id: &str, entity: &EntityContext) {
        self.states
            .retain(|state| state.kind().id() != rule_id || state.entity() != entity);
    }

    /// Re-evaluate every attachment from stored history
    ///
    /// Each rule's target is re-resolved first; an expression failure
    /// leaves that rule without a target for the pass (already logged)
    /// and evaluation continues. Produced events are forwarded to the
    /// sinks and returned.
    pub fn run_pass(
        &mut self,
        store: &dyn SeriesStore,
        evaluator: &dyn ExpressionEvaluator,
        now: u64,
    ) -> Vec<ThresholdEvent> {
        if !self.config.enabled {
            return Vec::new();
        }
        let mut events = Vec::new();
        for state in &mut self.states {
            let _ = state.resolve_target(evaluator);
            let produced = state.check(store, now);
            for event in &produced {
                self.sinks.submit_all(event);
            }
            events.extend(produced);
        }
        events
    }

    /// Route one freshly collected sample to the matching attachments
    pub fn ingest(
        &mut self,
        store: &dyn SeriesStore,
        evaluator: &dyn ExpressionEvaluator,
        entity: &EntityContext,
        data_point: &str,
        sample: &SampleValue,
        now: u64,
    ) -> Vec<ThresholdEvent> {
        if !self.config.enabled {
            return Vec::new();
        }
        let mut events = Vec::new();
        for state in &mut self.states {
            if state.entity() != entity {
                continue;
            }
            if !state.kind().data_points().iter().any(|dp| dp == data_point) {
                continue;
            }
            let _ = state.resolve_target(evaluator);
            let produced = state.check_raw(store, data_point, sample, now);
            for event in &produced {
                self.sinks.submit_all(event);
            }
            events.extend(produced);
        }
        events
    }
}

impl Default for ThresholdEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
