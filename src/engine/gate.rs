//! Checkpoint Gate
//!
//! Pure evaluation of an execution's checkpoint obligations. Given the
//! execution's current state and its template's checkpoint list, the gate
//! reports which checkpoints are satisfied and which still block
//! progression. No side effects; the orchestrator acts on the report.

use crate::execution::record::{CheckpointStatus, WorkflowExecution};
use crate::template::WorkflowTemplate;

/// Result of evaluating the checkpoint gate at the execution's current
/// position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateReport {
    /// Applicable checkpoints that are approved or auto-satisfied.
    pub satisfied: Vec<String>,
    /// Applicable checkpoints still awaiting explicit resolution.
    pub pending: Vec<String>,
}

impl GateReport {
    /// Returns true when nothing blocks progression.
    pub fn is_clear(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Evaluates every applicable checkpoint against the execution context.
///
/// A checkpoint is applicable once the step it is gated after has completed
/// (`required_after_step < current_step`); checkpoints not yet reached are
/// excluded from both lists. An applicable, undecided checkpoint whose guard
/// does not apply to the context (say an amount threshold with no amount
/// present) is auto-satisfied. An approved checkpoint is satisfied; anything
/// else blocks.
pub fn evaluate(execution: &WorkflowExecution, template: &WorkflowTemplate) -> GateReport {
    let mut satisfied = Vec::new();
    let mut pending = Vec::new();

    for descriptor in &template.checkpoints {
        if descriptor.required_after_step >= execution.current_step {
            continue;
        }

        let status = execution
            .checkpoint(&descriptor.name)
            .map(|state| state.status);

        match status {
            Some(CheckpointStatus::Approved) => satisfied.push(descriptor.name.clone()),
            Some(CheckpointStatus::Pending) => {
                if descriptor.guard.requires_approval(&execution.context) {
                    pending.push(descriptor.name.clone());
                } else {
                    satisfied.push(descriptor.name.clone());
                }
            }
            // A rejected checkpoint never unblocks; in practice rejection has
            // already failed the execution before the gate runs again.
            Some(CheckpointStatus::Rejected) | None => pending.push(descriptor.name.clone()),
        }
    }

    GateReport { satisfied, pending }
}
