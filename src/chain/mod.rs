pub mod builder;

use serde_json::{Map, Value};

use crate::chain::builder::ChainBuilder;

/// One configured HTTP call in a chain.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiStep {
    /// Display label, non-empty.
    pub name: String,
    /// Absolute HTTP(S) endpoint.
    pub url: String,
    pub request: RequestKind,
    /// Parameter injection from the previous step's output, if any.
    pub param: Option<ParamBinding>,
    /// Expression applied to the previous step's output before injection.
    pub transformation: Option<String>,
}

/// The request shape of a step. A body is only representable on POST.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestKind {
    Get,
    Post { body: Map<String, Value> },
}

/// Wires a field of the carry value into the step's request.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamBinding {
    /// Field name injected into the request (query parameter or body field).
    pub name: String,
    /// Key read from the carry value. Single-level lookup only.
    pub source_key: String,
}

/// An ordered sequence of steps; order is execution order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Chain {
    pub steps: Vec<ApiStep>,
}

impl Chain {
    pub fn new(steps: Vec<ApiStep>) -> Self {
        Self { steps }
    }

    pub fn builder() -> ChainBuilder {
        ChainBuilder::new()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
