use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::chain::Chain;
use crate::runtime::context::{ExecutionContext, StepOutcome};
use crate::runtime::transport::Transport;
use crate::runtime::{dispatch, params, transform};

/// Result of one chain run: the ordered trace of attempted steps and the
/// first (and only) surfaced error, if the run aborted.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub trace: Vec<StepOutcome>,
    pub first_error: Option<String>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.first_error.is_none()
    }
}

/// Drives a chain end-to-end: transformation, parameter resolution and
/// dispatch per step, strictly in order, short-circuiting on the first
/// request failure.
pub struct ChainRunner {
    transport: Arc<dyn Transport>,
}

impl ChainRunner {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Executes every step of the chain in order.
    ///
    /// Each call owns a fresh [`ExecutionContext`]; concurrent runs never
    /// share carry value or trace. Step i+1 is not started until step i's
    /// outcome is known, so at most one request is in flight.
    pub async fn execute(&self, chain: &Chain) -> RunReport {
        let mut ctx = ExecutionContext::new();
        let mut first_error = None;

        info!(run_id = %ctx.run_id, steps = chain.len(), "starting chain run");

        for step in &chain.steps {
            let mut carry = ctx.take_carry();
            if let Some(expression) = &step.transformation {
                // Fail-open: a broken transformation leaves the carry as-is.
                carry = transform::apply(carry, expression);
            }

            let injection = step
                .param
                .as_ref()
                .and_then(|binding| params::resolve(carry.as_ref(), binding));

            match dispatch::dispatch(self.transport.as_ref(), step, injection).await {
                Ok(body) => ctx.record_success(body),
                Err(e) => {
                    let message = e.to_string();
                    warn!(run_id = %ctx.run_id, step = %step.name, error = %message, "step failed, aborting run");
                    ctx.record_failure(message.clone());
                    first_error = Some(format!("error in step '{}': {}", step.name, message));
                    break;
                }
            }
        }

        info!(run_id = %ctx.run_id, attempted = ctx.attempted(), aborted = first_error.is_some(), "chain run finished");

        RunReport {
            run_id: ctx.run_id,
            trace: ctx.into_trace(),
            first_error,
        }
    }
}
