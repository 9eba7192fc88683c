//! Graph annotation for threshold marker lines
//!
//! Renders a threshold as a horizontal rule appended to a graph's
//! option list, with a legend label built from the related series. A
//! series may carry an RPN transform (itself possibly templated); the
//! target is pushed through it so the marker lands in the same unit
//! space as the plotted data.

use crate::error::GraphError;
use crate::expr::{self, ExpressionEvaluator};
use crate::rpn;
use crate::threshold::ThresholdState;

/// One plotted series the threshold relates to
#[derive(Debug, Clone, PartialEq)]
pub struct GraphSeries {
    /// Data point name backing the series
    pub name: String,
    /// Legend shown on the graph, falls back to the name
    pub legend: Option<String>,
    /// RPN transform applied to plotted values, if any
    pub rpn: Option<String>,
}

impl GraphSeries {
    /// A series with no legend or transform
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            legend: None,
            rpn: None,
        }
    }

    /// Set the graph legend
    pub fn with_legend(mut self, legend: impl Into<String>) -> Self {
        self.legend = Some(legend.into());
        self
    }

    /// Set the RPN transform string
    pub fn with_rpn(mut self, rpn: impl Into<String>) -> Self {
        self.rpn = Some(rpn.into());
        self
    }

    fn label(&self) -> &str {
        self.legend.as_deref().unwrap_or(&self.name)
    }
}

/// Append a horizontal marker line for a threshold to graph options
///
/// Returns the base options unchanged when the rule watches no data
/// points or has no usable (non-zero) target. A failing RPN transform
/// is logged and returned as a typed error; callers degrade the
/// annotation rather than failing the whole graph.
pub fn annotate(
    state: &ThresholdState,
    evaluator: &dyn ExpressionEvaluator,
    base: &[String],
    color: &str,
    legend: Option<&str>,
    series: &[GraphSeries],
) -> Result<Vec<String>, GraphError> {
    let color = normalize_color(color);
    if state.kind().data_points().is_empty() {
        return Ok(base.to_vec());
    }

    let mut target = state.resolved_target();
    if let Some(template) = series.first().and_then(|s| s.rpn.as_deref()) {
        let tokens = match evaluator
            .evaluate(template, state.entity())
            .and_then(|value| expr::as_text(template, &value))
        {
            Ok(tokens) => tokens,
            Err(err) => {
                log::error!(
                    "RPN transform '{}' for threshold '{}' failed to evaluate: {}",
                    template,
                    state.kind().id(),
                    err
                );
                return Err(GraphError::TransformFailed {
                    threshold: state.kind().id().to_string(),
                    source: err,
                });
            }
        };
        if let Some(seed) = target {
            target = match rpn::evaluate(seed, &tokens) {
                Ok(transformed) => Some(transformed),
                Err(err) => {
                    log::error!(
                        "RPN '{}' for threshold '{}' failed against target {}: {}",
                        tokens,
                        state.kind().id(),
                        seed,
                        err
                    );
                    return Err(GraphError::RpnEvaluationFailed {
                        threshold: state.kind().id().to_string(),
                        source: err,
                    });
                }
            };
        }
    }

    let mut options = base.to_vec();
    if let Some(value) = target.filter(|v| *v != 0.0) {
        let label = match legend {
            Some(text) if !text.is_empty() => text.to_string(),
            _ => point_label(value, series),
        };
        options.push(format!("HRULE:{}{}:{}\\j", value, color, label));
    }
    Ok(options)
}

fn normalize_color(color: &str) -> String {
    if color.starts_with('#') {
        color.to_string()
    } else {
        format!("#{}", color)
    }
}

fn point_label(value: f64, series: &[GraphSeries]) -> String {
    let names: Vec<&str> = series.iter().map(GraphSeries::label).collect();
    format!("{} == {}", names.join(", "), scale_power(value))
}

/// Format a number with a k/M/G power suffix
///
/// Below 1000 the raw number is shown. Otherwise it is divided by 1000
/// until it falls below 1000 again, with two-decimal precision and the
/// suffix reached; past giga the G suffix is reused.
pub fn scale_power(number: f64) -> String {
    const POWERS: [&str; 3] = ["k", "M", "G"];
    if number < 1000.0 {
        return format!("{}", number);
    }
    let mut scaled = number;
    for power in POWERS {
        scaled /= 1000.0;
        if scaled < 1000.0 {
            return format!("{:.2}{}", scaled, power);
        }
    }
    format!("{:.2}{}", scaled, POWERS[POWERS.len() - 1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EntityContext;
    use crate::mock::MockEvaluator;
    use crate::threshold::{PointThreshold, ThresholdState, ViolationCounters};
    use serde_json::json;
    use std::sync::Arc;

    fn resolved_state(rule: PointThreshold) -> ThresholdState {
        let mut state = ThresholdState::new(
            Arc::new(rule),
            EntityContext::device("core-sw1", "Devices/core-sw1"),
            Arc::new(ViolationCounters::new()),
        );
        state.resolve_target(&MockEvaluator::new()).unwrap();
        state
    }

    fn base() -> Vec<String> {
        vec!["DEF:v=file.rrd:ds0:AVERAGE".to_string()]
    }

    #[test]
    fn test_scale_power_raw_below_thousand() {
        assert_eq!(scale_power(500.0), "500");
    }

    #[test]
    fn test_scale_power_kilo() {
        assert_eq!(scale_power(1500.0), "1.50k");
    }

    #[test]
    fn test_scale_power_mega() {
        assert_eq!(scale_power(2_500_000.0), "2.50M");
    }

    #[test]
    fn test_scale_power_giga() {
        assert_eq!(scale_power(3_000_000_000.0), "3.00G");
    }

    #[test]
    fn test_scale_power_reuses_terminal_suffix() {
        assert_eq!(scale_power(5_000_000_000_000.0), "5000.00G");
    }

    #[test]
    fn test_no_data_points_returns_base_unchanged() {
        let state = resolved_state(PointThreshold::new("linkDown", 2.0));
        let options = annotate(
            &state,
            &MockEvaluator::new(),
            &base(),
            "FF0000",
            None,
            &[],
        )
        .unwrap();
        assert_eq!(options, base());
    }

    #[test]
    fn test_marker_appended_with_auto_label() {
        let state = resolved_state(
            PointThreshold::new("linkDown", 2.0).with_data_points(["ifOperStatus"]),
        );
        let series = [GraphSeries::new("ifOperStatus").with_legend("Interface status")];
        let options = annotate(
            &state,
            &MockEvaluator::new(),
            &base(),
            "FF0000",
            None,
            &series,
        )
        .unwrap();
        assert_eq!(options.len(), 2);
        assert_eq!(options[1], "HRULE:2#FF0000:Interface status == 2\\j");
    }

    #[test]
    fn test_explicit_legend_wins() {
        let state = resolved_state(
            PointThreshold::new("linkDown", 2.0).with_data_points(["ifOperStatus"]),
        );
        let series = [GraphSeries::new("ifOperStatus")];
        let options = annotate(
            &state,
            &MockEvaluator::new(),
            &base(),
            "#00FF00",
            Some("link down"),
            &series,
        )
        .unwrap();
        assert_eq!(options[1], "HRULE:2#00FF00:link down\\j");
    }

    #[test]
    fn test_rpn_transform_moves_marker() {
        let state = resolved_state(
            PointThreshold::new("highRate", 1000.0).with_data_points(["ifInOctets"]),
        );
        // Series plots bits; the transform multiplies stored octets by 8
        let series = [GraphSeries::new("ifInOctets").with_rpn("8,*")];
        let evaluator = MockEvaluator::new().with_result("8,*", json!("8,*"));
        let options = annotate(&state, &evaluator, &base(), "FF0000", None, &series).unwrap();
        assert!(options[1].starts_with("HRULE:8000#FF0000:"));
    }

    #[test]
    fn test_failing_transform_surfaces_typed_error() {
        let state = resolved_state(
            PointThreshold::new("highRate", 1000.0).with_data_points(["ifInOctets"]),
        );
        let series = [GraphSeries::new("ifInOctets").with_rpn("${here/rpn}")];
        let evaluator = MockEvaluator::new().with_failure("${here/rpn}");
        let err = annotate(&state, &evaluator, &base(), "FF0000", None, &series).unwrap_err();
        assert!(matches!(err, GraphError::TransformFailed { .. }));
    }

    #[test]
    fn test_malformed_rpn_surfaces_typed_error() {
        let state = resolved_state(
            PointThreshold::new("highRate", 1000.0).with_data_points(["ifInOctets"]),
        );
        let series = [GraphSeries::new("ifInOctets").with_rpn("8,bogus")];
        let evaluator = MockEvaluator::new().with_result("8,bogus", json!("8,bogus"));
        let err = annotate(&state, &evaluator, &base(), "FF0000", None, &series).unwrap_err();
        assert!(matches!(err, GraphError::RpnEvaluationFailed { .. }));
    }

    #[test]
    fn test_unresolved_target_draws_no_marker() {
        let rule = PointThreshold::new("linkDown", 2.0)
            .with_expression("here.zIfDownValue")
            .with_data_points(["ifOperStatus"]);
        let mut state = ThresholdState::new(
            Arc::new(rule),
            EntityContext::device("core-sw1", "Devices/core-sw1"),
            Arc::new(ViolationCounters::new()),
        );
        let evaluator = MockEvaluator::new().with_failure("here.zIfDownValue");
        let _ = state.resolve_target(&evaluator);
        let series = [GraphSeries::new("ifOperStatus")];
        let options =
            annotate(&state, &MockEvaluator::new(), &base(), "FF0000", None, &series).unwrap();
        assert_eq!(options, base());
    }

    #[test]
    fn test_zero_target_draws_no_marker() {
        let state = resolved_state(
            PointThreshold::new("zeroPoint", 0.0).with_data_points(["ifOperStatus"]),
        );
        let series = [GraphSeries::new("ifOperStatus")];
        let options =
            annotate(&state, &MockEvaluator::new(), &base(), "FF0000", None, &series).unwrap();
        assert_eq!(options, base());
    }
}
