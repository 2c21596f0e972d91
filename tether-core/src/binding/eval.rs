//! Expression evaluation.
//!
//! The engine has no opinion on expression syntax. It calls an
//! [`Evaluator`] once per binding run and treats the result opaquely.
//! [`PathEvaluator`] is a small built-in evaluator for literals and dotted
//! property paths, enough for plain data bindings.

use crate::data::Value;
use crate::error::{Error, Result};

/// Evaluates an expression against a stack of scopes (innermost last).
pub trait Evaluator {
    fn evaluate(&self, expression: &str, scopes: &[Value]) -> Result<Value>;
}

impl<F> Evaluator for F
where
    F: Fn(&str, &[Value]) -> Result<Value>,
{
    fn evaluate(&self, expression: &str, scopes: &[Value]) -> Result<Value> {
        self(expression, scopes)
    }
}

/// Evaluate, logging failures and treating them as `undefined`.
pub fn evaluate_or_undefined(evaluator: &dyn Evaluator, expression: &str, scopes: &[Value]) -> Value {
    match evaluator.evaluate(expression, scopes) {
        Ok(value) => value,
        Err(error) => {
            tracing::warn!(expression, %error, "expression evaluation failed");
            Value::Undefined
        }
    }
}

/// Resolves literals (`true`, `false`, `null`, `undefined`, numbers, quoted
/// strings) and dotted paths such as `user.address.city` or `items.0.name`.
///
/// Reads through reactive wrappers are tracked, so evaluating inside a
/// computation subscribes it to every property on the path.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathEvaluator;

impl PathEvaluator {
    pub fn new() -> Self {
        Self
    }
}

impl Evaluator for PathEvaluator {
    fn evaluate(&self, expression: &str, scopes: &[Value]) -> Result<Value> {
        let expr = expression.trim();
        if let Some(literal) = parse_literal(expr) {
            return Ok(literal);
        }

        let segments = split_path(expr).ok_or_else(|| eval_error(expr, "not a literal or property path"))?;
        let (first, rest) = segments
            .split_first()
            .ok_or_else(|| eval_error(expr, "empty expression"))?;

        let owner = scopes
            .iter()
            .rev()
            .find(|scope| has_own(scope, first, true))
            .ok_or_else(|| eval_error(expr, &format!("`{first}` is not defined")))?;

        let mut current = member(owner, first);
        for segment in rest {
            if current.is_nullish() {
                return Err(eval_error(
                    expr,
                    &format!("cannot read `{segment}` of {}", current.type_name()),
                ));
            }
            current = member(&current, segment);
        }
        Ok(current)
    }
}

fn eval_error(expression: &str, reason: &str) -> Error {
    Error::Eval {
        expression: expression.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_literal(expr: &str) -> Option<Value> {
    match expr {
        "true" => return Some(Value::Bool(true)),
        "false" => return Some(Value::Bool(false)),
        "null" => return Some(Value::Null),
        "undefined" => return Some(Value::Undefined),
        _ => {}
    }

    for quote in ['\'', '"'] {
        if expr.len() >= 2 && expr.starts_with(quote) && expr.ends_with(quote) {
            return Some(Value::from(&expr[1..expr.len() - 1]));
        }
    }

    let starts_numeric = expr
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || c == '-' || c == '.');
    if starts_numeric {
        return expr.parse::<f64>().ok().map(Value::Number);
    }
    None
}

/// Split a dotted path, rejecting anything that is not identifiers or
/// numeric indices joined by dots.
pub(crate) fn split_path(path: &str) -> Option<Vec<&str>> {
    let segments: Vec<&str> = path.split('.').map(str::trim).collect();
    let valid = segments.iter().all(|segment| {
        !segment.is_empty()
            && segment
                .chars()
                .all(|c| c.is_alphanumeric() || c == '_' || c == '$')
    });
    valid.then_some(segments)
}

/// Whether `scope` has its own property `name`.
pub(crate) fn has_own(scope: &Value, name: &str, tracked: bool) -> bool {
    match scope {
        Value::LiveObject(obj) if tracked => obj.has(name),
        Value::LiveObject(obj) => obj.raw().contains_key(name),
        Value::Object(obj) => obj.contains_key(name),
        _ => false,
    }
}

/// Read `segment` of `value`. Missing members read as `undefined`.
pub(crate) fn member(value: &Value, segment: &str) -> Value {
    match value {
        Value::LiveObject(obj) => obj.get(segment),
        Value::Object(obj) => obj.get(segment).unwrap_or_default(),
        Value::LiveArray(arr) => match segment {
            "length" => Value::from(arr.len()),
            _ => segment
                .parse::<usize>()
                .map(|index| arr.get(index))
                .unwrap_or_default(),
        },
        Value::Array(arr) => match segment {
            "length" => Value::from(arr.len()),
            _ => segment
                .parse::<usize>()
                .ok()
                .and_then(|index| arr.get(index))
                .unwrap_or_default(),
        },
        Value::String(s) if segment == "length" => Value::from(s.chars().count()),
        _ => Value::Undefined,
    }
}
