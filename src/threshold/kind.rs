//! Threshold kind capability
//!
//! Rules plug into the engine through this trait rather than through a
//! class hierarchy; the point/equality rule in [`super::PointThreshold`]
//! is the one concrete kind today.

use crate::domain::{EntityContext, Severity};
use crate::error::ExpressionError;
use crate::expr::ExpressionEvaluator;

/// Capability interface of a threshold rule
pub trait ThresholdKind: Send + Sync {
    /// Unique rule name; doubles as the event key on emitted events
    fn id(&self) -> &str;

    /// Data points this rule watches, in evaluation order
    fn data_points(&self) -> &[String];

    /// Classification tag placed on raised events
    fn event_class(&self) -> &str;

    /// Baseline severity of a violation
    fn severity(&self) -> Severity;

    /// Consecutive-violation count at which severity escalates one
    /// level; zero disables escalation
    fn escalate_count(&self) -> u32;

    /// Resolve the current target value for one evaluation pass
    ///
    /// `Ok(None)` means the rule has no usable target this pass and no
    /// value can match. Expression failures are returned, not swallowed,
    /// so callers decide how to degrade.
    fn resolve_target(
        &self,
        evaluator: &dyn ExpressionEvaluator,
        entity: &EntityContext,
    ) -> Result<Option<f64>, ExpressionError>;

    /// Whether a sampled value violates the threshold at this target
    fn matches(&self, value: f64, target: f64) -> bool;

    /// One-line description for logs
    fn describe(&self) -> String;
}
