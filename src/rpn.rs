//! Reverse-polish-notation arithmetic evaluator
//!
//! Applies a comma-separated RPN token sequence to a seed value. The
//! sequence is consumed left to right against an operand stack seeded
//! with the running value, so `evaluate(bits, "8,/")` converts bits to
//! bytes and `evaluate(v, "ABS")` takes a magnitude. Only the small
//! arithmetic subset needed for graph transforms is supported: `+ - * /`,
//! `ABS`, and numeric literals.

use crate::error::RpnError;

/// Evaluate an RPN token sequence against a seed value
///
/// Division by zero yields 0 rather than failing. Unknown tokens,
/// operand underflow, and leftover operands are all
/// [`RpnError::MalformedExpression`].
pub fn evaluate(seed: f64, tokens: &str) -> Result<f64, RpnError> {
    let mut stack = vec![seed];

    for token in tokens.split(',') {
        let token = token.trim();
        match token {
            "+" | "-" | "*" | "/" => {
                let right = pop(&mut stack, tokens)?;
                let left = pop(&mut stack, tokens)?;
                let value = match token {
                    "+" => left + right,
                    "-" => left - right,
                    "*" => left * right,
                    _ => {
                        if right == 0.0 {
                            0.0
                        } else {
                            left / right
                        }
                    }
                };
                stack.push(value);
            }
            _ if token.eq_ignore_ascii_case("abs") => {
                let operand = pop(&mut stack, tokens)?;
                stack.push(operand.abs());
            }
            _ => {
                let literal = token.parse::<f64>().map_err(|_| malformed(
                    tokens,
                    format!("invalid token '{}'", token),
                ))?;
                stack.push(literal);
            }
        }
    }

    if stack.len() != 1 {
        return Err(malformed(
            tokens,
            format!("{} operands left on the stack", stack.len()),
        ));
    }
    Ok(stack[0])
}

fn pop(stack: &mut Vec<f64>, tokens: &str) -> Result<f64, RpnError> {
    stack
        .pop()
        .ok_or_else(|| malformed(tokens, "operand stack underflow".to_string()))
}

fn malformed(tokens: &str, reason: String) -> RpnError {
    RpnError::MalformedExpression {
        tokens: tokens.to_string(),
        reason,
    }
}
