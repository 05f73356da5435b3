use evalexpr::{ContextWithMutableVariables, DefaultNumericTypes, HashMapContext, eval_with_context};
use serde_json::{Value, json};
use tracing::warn;

/// Applies a user-authored mapping expression to the carry value.
///
/// Expressions run in a capability-limited language (`evalexpr`): arithmetic,
/// comparisons, string operations and tuples, with no ambient authority. The
/// previous result is bound as `data`, and when it is a JSON object each
/// top-level field is additionally bound under its own name, so
/// `id * 2` or `count > 0` read directly from the previous response.
///
/// Fail-open: any parse or evaluation error keeps the carry value unchanged.
/// A bad transformation never aborts the run and never shows up in the trace.
pub fn apply(carry: Option<Value>, expression: &str) -> Option<Value> {
    let mut context = HashMapContext::<DefaultNumericTypes>::new();

    if let Some(previous) = &carry {
        if let Some(whole) = json_to_expr(previous) {
            let _ = context.set_value("data".to_string(), whole);
        }
        if let Some(fields) = previous.as_object() {
            for (key, value) in fields {
                if let Some(bound) = json_to_expr(value) {
                    let _ = context.set_value(key.clone(), bound);
                }
            }
        }
    }

    match eval_with_context(expression, &context) {
        Ok(result) => match expr_to_json(result) {
            Some(value) => Some(value),
            None => {
                warn!(expression, "transformation produced no usable value, keeping previous result");
                carry
            }
        },
        Err(e) => {
            warn!(expression, error = %e, "transformation failed, keeping previous result");
            carry
        }
    }
}

fn json_to_expr(value: &Value) -> Option<evalexpr::Value<DefaultNumericTypes>> {
    match value {
        Value::String(s) => Some(evalexpr::Value::String(s.clone())),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(evalexpr::Value::Int(i))
            } else {
                n.as_f64().map(evalexpr::Value::Float)
            }
        }
        Value::Bool(b) => Some(evalexpr::Value::Boolean(*b)),
        Value::Array(items) => items
            .iter()
            .map(json_to_expr)
            .collect::<Option<Vec<_>>>()
            .map(evalexpr::Value::Tuple),
        // Nested objects and null have no expression-level equivalent.
        _ => None,
    }
}

fn expr_to_json(value: evalexpr::Value<DefaultNumericTypes>) -> Option<Value> {
    match value {
        evalexpr::Value::String(s) => Some(Value::String(s)),
        evalexpr::Value::Int(i) => Some(json!(i)),
        evalexpr::Value::Float(f) => Some(json!(f)),
        evalexpr::Value::Boolean(b) => Some(Value::Bool(b)),
        evalexpr::Value::Tuple(items) => items
            .into_iter()
            .map(expr_to_json)
            .collect::<Option<Vec<_>>>()
            .map(Value::Array),
        evalexpr::Value::Empty => None,
    }
}
