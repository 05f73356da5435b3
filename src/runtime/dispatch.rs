use serde_json::Value;

use crate::chain::{ApiStep, RequestKind};
use crate::error::StepError;
use crate::runtime::transport::{HttpRequest, Method, Transport};

/// Builds and sends exactly one request for the step, then decodes its body.
///
/// Fail-closed: a non-success status is a failure without looking at the
/// body, and a success status with an undecodable body is a failure too.
pub async fn dispatch(
    transport: &dyn Transport,
    step: &ApiStep,
    injection: Option<(&str, Value)>,
) -> Result<Value, StepError> {
    let request = build_request(step, injection);
    let response = transport.send(request).await?;

    if !response.is_success() {
        return Err(StepError::Status(response.status));
    }

    Ok(serde_json::from_str(&response.body)?)
}

/// Pure request assembly. GET appends the injection as the single query
/// parameter; POST shallow-merges it into the configured body, overwriting a
/// field of the same name. The configured body itself is never mutated.
pub fn build_request(step: &ApiStep, injection: Option<(&str, Value)>) -> HttpRequest {
    match &step.request {
        RequestKind::Get => {
            let url = if let Some((name, value)) = injection {
                format!("{}?{}={}", step.url, name, render_query_value(&value))
            } else {
                step.url.clone()
            };
            HttpRequest {
                method: Method::Get,
                url,
                body: None,
            }
        }
        RequestKind::Post { body } => {
            let mut body = body.clone();
            if let Some((name, value)) = injection {
                body.insert(name.to_string(), value);
            }
            HttpRequest {
                method: Method::Post,
                url: step.url.clone(),
                body: Some(Value::Object(body)),
            }
        }
    }
}

fn render_query_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
