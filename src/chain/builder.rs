use serde_json::{Map, Value};

use crate::chain::{ApiStep, Chain, ParamBinding, RequestKind};

pub struct ChainBuilder {
    steps: Vec<ApiStep>,
}

impl ChainBuilder {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn get(self, name: &str, url: &str) -> StepBuilder {
        StepBuilder::new(self, name, url, Kind::Get)
    }

    pub fn post(self, name: &str, url: &str) -> StepBuilder {
        StepBuilder::new(self, name, url, Kind::Post)
    }

    pub fn build(self) -> Chain {
        Chain::new(self.steps)
    }
}

impl Default for ChainBuilder {
    fn default() -> Self {
        Self::new()
    }
}

enum Kind {
    Get,
    Post,
}

pub struct StepBuilder {
    chain: ChainBuilder,
    name: String,
    url: String,
    kind: Kind,
    body: Map<String, Value>,
    param: Option<ParamBinding>,
    transformation: Option<String>,
}

impl StepBuilder {
    fn new(chain: ChainBuilder, name: &str, url: &str, kind: Kind) -> Self {
        Self {
            chain,
            name: name.to_string(),
            url: url.to_string(),
            kind,
            body: Map::new(),
            param: None,
            transformation: None,
        }
    }

    /// Adds a field to the configured POST body. Ignored on GET steps.
    pub fn body_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.body.insert(key.to_string(), value.into());
        self
    }

    /// Injects the carry value's `source_key` field into this step's request
    /// under `name`.
    pub fn inject(mut self, name: &str, source_key: &str) -> Self {
        self.param = Some(ParamBinding {
            name: name.to_string(),
            source_key: source_key.to_string(),
        });
        self
    }

    pub fn transform(mut self, expression: &str) -> Self {
        self.transformation = Some(expression.to_string());
        self
    }

    pub fn build(mut self) -> ChainBuilder {
        let request = match self.kind {
            Kind::Get => RequestKind::Get,
            Kind::Post => RequestKind::Post { body: self.body },
        };
        self.chain.steps.push(ApiStep {
            name: self.name,
            url: self.url,
            request,
            param: self.param,
            transformation: self.transformation,
        });
        self.chain
    }
}
