use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::chain::{ApiStep, ParamBinding, RequestKind};

/// Portable chain document as it appears on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainDocument {
    pub version: String,
    pub chain: Vec<StepDto>,
}

/// Flat wire shape of one step. Deserialization is tolerant: unknown fields
/// are ignored and the optional fields may appear in any combination.
/// Validation happens in the conversion to [`ApiStep`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepDto {
    pub name: String,
    pub url: String,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Map<String, Value>>,
    #[serde(rename = "paramName", default, skip_serializing_if = "Option::is_none")]
    pub param_name: Option<String>,
    #[serde(rename = "paramValue", default, skip_serializing_if = "Option::is_none")]
    pub param_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transformation: Option<String>,
}

impl TryFrom<StepDto> for ApiStep {
    type Error = String;

    fn try_from(dto: StepDto) -> Result<Self, Self::Error> {
        if dto.name.trim().is_empty() {
            return Err("step name must not be empty".to_string());
        }
        if dto.url.trim().is_empty() {
            return Err("step url must not be empty".to_string());
        }

        let request = match dto.method.as_str() {
            "GET" => {
                if dto.body.is_some() {
                    return Err("GET steps cannot carry a body".to_string());
                }
                RequestKind::Get
            }
            "POST" => RequestKind::Post {
                body: dto.body.unwrap_or_default(),
            },
            other => return Err(format!("unknown method `{other}`")),
        };

        // A binding needs both halves; a lone paramName or paramValue is
        // tolerated on the wire and means no injection.
        let param = match (dto.param_name, dto.param_value) {
            (Some(name), Some(source_key)) => Some(ParamBinding { name, source_key }),
            _ => None,
        };

        Ok(ApiStep {
            name: dto.name,
            url: dto.url,
            request,
            param,
            transformation: dto.transformation,
        })
    }
}

impl From<&ApiStep> for StepDto {
    fn from(step: &ApiStep) -> Self {
        let (method, body) = match &step.request {
            RequestKind::Get => ("GET", None),
            RequestKind::Post { body } => ("POST", Some(body.clone())),
        };
        let (param_name, param_value) = match &step.param {
            Some(binding) => (Some(binding.name.clone()), Some(binding.source_key.clone())),
            None => (None, None),
        };

        Self {
            name: step.name.clone(),
            url: step.url.clone(),
            method: method.to_string(),
            body,
            param_name,
            param_value,
            transformation: step.transformation.clone(),
        }
    }
}
