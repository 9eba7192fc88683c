//! Expression evaluation boundary
//!
//! Target values and RPN transform strings may be written as expressions
//! evaluated against the monitoring context. The expression language is
//! owned by the host; the engine consumes it as an opaque evaluate
//! capability and coerces the loosely-typed result at the call site.

use crate::domain::EntityContext;
use crate::error::ExpressionError;

/// Evaluates a context expression to a loosely-typed value
pub trait ExpressionEvaluator: Send + Sync {
    /// Evaluate `expression` against the given entity
    fn evaluate(
        &self,
        expression: &str,
        entity: &EntityContext,
    ) -> Result<serde_json::Value, ExpressionError>;
}

/// Coerce an expression result to a number
pub(crate) fn as_number(
    expression: &str,
    value: &serde_json::Value,
) -> Result<f64, ExpressionError> {
    let not_numeric = || ExpressionError::NotNumeric {
        expression: expression.to_string(),
    };
    match value {
        serde_json::Value::Number(number) => number.as_f64().ok_or_else(not_numeric),
        serde_json::Value::String(text) => text.trim().parse().map_err(|_| not_numeric()),
        _ => Err(not_numeric()),
    }
}

/// Coerce an expression result to text
pub(crate) fn as_text(
    expression: &str,
    value: &serde_json::Value,
) -> Result<String, ExpressionError> {
    match value {
        serde_json::Value::String(text) => Ok(text.clone()),
        serde_json::Value::Number(number) => Ok(number.to_string()),
        _ => Err(ExpressionError::NotText {
            expression: expression.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_as_number_from_number() {
        assert_eq!(as_number("x", &json!(4.5)).unwrap(), 4.5);
    }

    #[test]
    fn test_as_number_from_string() {
        assert_eq!(as_number("x", &json!("12")).unwrap(), 12.0);
    }

    #[test]
    fn test_as_number_rejects_other_shapes() {
        let err = as_number("x", &json!([1, 2])).unwrap_err();
        assert!(matches!(err, ExpressionError::NotNumeric { .. }));
    }

    #[test]
    fn test_as_text_from_number() {
        assert_eq!(as_text("x", &json!(8)).unwrap(), "8");
    }

    #[test]
    fn test_as_text_rejects_other_shapes() {
        let err = as_text("x", &json!(null)).unwrap_err();
        assert!(matches!(err, ExpressionError::NotText { .. }));
    }
}
