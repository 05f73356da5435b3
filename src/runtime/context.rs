use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

/// Outcome of one attempted step. Serializes either as the decoded response
/// body or as `{"error": message}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StepOutcome {
    Failure { error: String },
    Success(Value),
}

/// Per-run execution state: the carry value handed from step to step and the
/// trace of everything attempted so far.
///
/// A context belongs to exactly one run. The engine builds a fresh one per
/// `execute` call and nothing survives between runs.
pub struct ExecutionContext {
    pub run_id: Uuid,
    carry: Option<Value>,
    trace: Vec<StepOutcome>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            carry: None,
            trace: Vec::new(),
        }
    }

    /// Hands the carry value to the caller for this step; it is restored by
    /// `record_success` from the step's decoded body.
    pub fn take_carry(&mut self) -> Option<Value> {
        self.carry.take()
    }

    pub fn record_success(&mut self, body: Value) {
        self.trace.push(StepOutcome::Success(body.clone()));
        self.carry = Some(body);
    }

    pub fn record_failure(&mut self, error: String) {
        self.trace.push(StepOutcome::Failure { error });
    }

    pub fn attempted(&self) -> usize {
        self.trace.len()
    }

    pub fn into_trace(self) -> Vec<StepOutcome> {
        self.trace
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new()
    }
}
