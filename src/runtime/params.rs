use serde_json::Value;

use crate::chain::ParamBinding;

/// Resolves the `(field name, value)` pair to inject into the next request.
///
/// With no carry value (first step, or nothing produced yet) injection is
/// skipped entirely and the step's own url/body is used unmodified. A missing
/// key resolves to JSON null; the dispatcher renders that per method instead
/// of failing. Lookup is single-level only -- nested paths are out of
/// contract, and richer path syntax belongs here if it is ever added.
pub fn resolve<'a>(carry: Option<&Value>, binding: &'a ParamBinding) -> Option<(&'a str, Value)> {
    let carry = carry?;
    let value = match carry {
        // Arrays take a numeric key, mirroring object-style element access.
        Value::Array(items) => binding
            .source_key
            .parse::<usize>()
            .ok()
            .and_then(|i| items.get(i))
            .cloned(),
        other => other.get(binding.source_key.as_str()).cloned(),
    };
    Some((binding.name.as_str(), value.unwrap_or(Value::Null)))
}
