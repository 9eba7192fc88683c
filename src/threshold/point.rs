//! Point (equality) threshold definition
//!
//! The rule fires while a data point's value sits exactly on a target
//! point. The target is either a literal or an expression evaluated
//! against the monitoring context each pass.

use super::kind::ThresholdKind;
use crate::domain::{EntityContext, Severity};
use crate::error::ExpressionError;
use crate::expr::{self, ExpressionEvaluator};
use serde::{Deserialize, Serialize};

/// Default classification for point-threshold events
pub const DEFAULT_EVENT_CLASS: &str = "/Perf/Snmp";

/// Point threshold rule definition
///
/// Immutable per evaluation pass; configuration tooling creates and
/// edits these, the engine only reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointThreshold {
    /// Unique rule identifier
    pub id: String,
    /// Literal target, used when no expression is set
    pub target: f64,
    /// Optional expression producing the target dynamically
    pub target_expression: Option<String>,
    /// Classification tag for raised events
    pub event_class: String,
    /// Baseline severity for a violation
    pub severity: Severity,
    /// Consecutive violations before severity escalates; 0 disables
    pub escalate_count: u32,
    /// Data points this rule watches
    pub data_points: Vec<String>,
}

impl PointThreshold {
    /// Create a rule with a literal target and default classification
    pub fn new(id: impl Into<String>, target: f64) -> Self {
        Self {
            id: id.into(),
            target,
            target_expression: None,
            event_class: DEFAULT_EVENT_CLASS.to_string(),
            severity: Severity::Warning,
            escalate_count: 0,
            data_points: Vec::new(),
        }
    }

    /// Set a target expression evaluated against the entity context
    pub fn with_expression(mut self, expression: impl Into<String>) -> Self {
        self.target_expression = Some(expression.into());
        self
    }

    /// Set the event classification tag
    pub fn with_event_class(mut self, event_class: impl Into<String>) -> Self {
        self.event_class = event_class.into();
        self
    }

    /// Set the baseline severity
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Escalate severity one level after `count` consecutive violations
    pub fn with_escalation(mut self, count: u32) -> Self {
        self.escalate_count = count;
        self
    }

    /// Set the watched data points
    pub fn with_data_points<I, S>(mut self, data_points: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.data_points = data_points.into_iter().map(Into::into).collect();
        self
    }
}

impl ThresholdKind for PointThreshold {
    fn id(&self) -> &str {
        &self.id
    }

    fn data_points(&self) -> &[String] {
        &self.data_points
    }

    fn event_class(&self) -> &str {
        &self.event_class
    }

    fn severity(&self) -> Severity {
        self.severity
    }

    fn escalate_count(&self) -> u32 {
        self.escalate_count
    }

    fn resolve_target(
        &self,
        evaluator: &dyn ExpressionEvaluator,
        entity: &EntityContext,
    ) -> Result<Option<f64>, ExpressionError> {
        let Some(expression) = &self.target_expression else {
            return Ok(Some(self.target));
        };
        match evaluator
            .evaluate(expression, entity)
            .and_then(|value| expr::as_number(expression, &value))
        {
            Ok(target) => Ok(Some(target)),
            Err(err) => {
                log::error!(
                    "Target expression '{}' for threshold '{}' (data points {:?}) failed: {}",
                    expression,
                    self.id,
                    self.data_points,
                    err
                );
                Err(err)
            }
        }
    }

    /// Exact equality, not a tolerance band: point targets represent
    /// discrete state codes, so the comparison must not be widened.
    fn matches(&self, value: f64, target: f64) -> bool {
        value == target
    }

    fn describe(&self) -> String {
        match &self.target_expression {
            Some(expression) => format!("{} == eval({})", self.id, expression),
            None => format!("{} == {}", self.id, self.target),
        }
    }
}
