//! Workflow Execution Records
//!
//! A `WorkflowExecution` is a live, stateful instance of a template bound to
//! specific business data. Records are created by the orchestrator's start
//! operation, mutated only through orchestrator operations, and become
//! immutable once they reach a terminal status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::capability::{Context, ContextDelta};
use crate::template::WorkflowTemplate;

/// Lifecycle status of a workflow execution.
///
/// Transitions follow a fixed machine:
/// `Pending → Running → {Paused, Completed, Failed}` and
/// `Paused → {Running, Failed}`. Completed and Failed are terminal.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    /// Created but not yet driven.
    Pending,
    /// The step loop is progressing.
    Running,
    /// Suspended awaiting checkpoint approval.
    Paused,
    /// All steps ran and all checkpoints resolved. Terminal.
    Completed,
    /// A step failed, a checkpoint was rejected, or an operator cancelled.
    /// Terminal.
    Failed,
}

impl ExecutionStatus {
    /// Returns true for Completed and Failed.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// Resolution status of a single checkpoint on an execution.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CheckpointStatus {
    Pending,
    Approved,
    Rejected,
}

/// Per-execution state of one named checkpoint.
///
/// Each entry transitions `Pending → {Approved|Rejected}` exactly once.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CheckpointState {
    pub name: String,
    pub status: CheckpointStatus,
    /// Who acted on the checkpoint. The engine records the actor; deciding
    /// who is allowed to act is the caller's concern.
    pub approver: Option<String>,
    pub decided_at: Option<DateTime<Utc>>,
    /// Rejection reason, if any.
    pub note: Option<String>,
}

impl CheckpointState {
    fn pending(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: CheckpointStatus::Pending,
            approver: None,
            decided_at: None,
            note: None,
        }
    }

    /// Marks the checkpoint approved. Callers must have verified it is
    /// currently Pending.
    pub fn approve(&mut self, approver: impl Into<String>) {
        self.status = CheckpointStatus::Approved;
        self.approver = Some(approver.into());
        self.decided_at = Some(Utc::now());
    }

    /// Marks the checkpoint rejected with a reason.
    pub fn reject(&mut self, approver: impl Into<String>, reason: impl Into<String>) {
        self.status = CheckpointStatus::Rejected;
        self.approver = Some(approver.into());
        self.decided_at = Some(Utc::now());
        self.note = Some(reason.into());
    }
}

/// A live instance of a workflow template.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WorkflowExecution {
    /// Unique execution id, minted at creation.
    pub id: String,

    /// Id of the template this execution instantiates.
    pub template_id: String,

    /// Current lifecycle status.
    pub status: ExecutionStatus,

    /// Index of the next step to execute: last successfully completed
    /// step + 1. Monotonically non-decreasing while Running, frozen
    /// otherwise.
    pub current_step: usize,

    /// Business data, mutated only by completed steps' deltas.
    pub context: Context,

    /// Checkpoint states mirroring the template's checkpoint set at
    /// creation time, in template order.
    pub checkpoints: Vec<CheckpointState>,

    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,

    /// Non-empty whenever status is Failed.
    pub failure_reason: Option<String>,
}

impl WorkflowExecution {
    /// Creates a Pending execution for a template with the given initial
    /// context.
    pub fn new(template: &WorkflowTemplate, context: Context) -> Self {
        Self {
            id: format!("exec_{}", Uuid::new_v4().simple()),
            template_id: template.id.clone(),
            status: ExecutionStatus::Pending,
            current_step: 0,
            context,
            checkpoints: template
                .checkpoints
                .iter()
                .map(|c| CheckpointState::pending(&c.name))
                .collect(),
            started_at: Utc::now(),
            completed_at: None,
            failure_reason: None,
        }
    }

    /// Returns the state of the named checkpoint, if any.
    pub fn checkpoint(&self, name: &str) -> Option<&CheckpointState> {
        self.checkpoints.iter().find(|c| c.name == name)
    }

    /// Mutable access to the named checkpoint.
    pub fn checkpoint_mut(&mut self, name: &str) -> Option<&mut CheckpointState> {
        self.checkpoints.iter_mut().find(|c| c.name == name)
    }

    /// Checkpoints still awaiting a decision.
    pub fn pending_checkpoints(&self) -> Vec<&CheckpointState> {
        self.checkpoints
            .iter()
            .filter(|c| c.status == CheckpointStatus::Pending)
            .collect()
    }

    /// Returns true once the execution can no longer change.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Transitions Pending → Running.
    pub fn start(&mut self) {
        debug_assert_eq!(self.status, ExecutionStatus::Pending);
        self.status = ExecutionStatus::Running;
    }

    /// Records a completed step: merges its delta and advances the cursor.
    pub fn complete_step(&mut self, delta: ContextDelta) {
        debug_assert_eq!(self.status, ExecutionStatus::Running);
        for (key, value) in delta {
            self.context.insert(key, value);
        }
        self.current_step += 1;
    }

    /// Transitions Running → Paused.
    pub fn pause(&mut self) {
        debug_assert_eq!(self.status, ExecutionStatus::Running);
        self.status = ExecutionStatus::Paused;
    }

    /// Transitions Paused → Running.
    pub fn resume(&mut self) {
        debug_assert_eq!(self.status, ExecutionStatus::Paused);
        self.status = ExecutionStatus::Running;
    }

    /// Transitions Running → Completed and stamps the completion time.
    pub fn complete(&mut self) {
        debug_assert_eq!(self.status, ExecutionStatus::Running);
        self.status = ExecutionStatus::Completed;
        self.completed_at = Some(Utc::now());
    }

    /// Transitions to Failed with a reason. Terminal.
    pub fn fail(&mut self, reason: impl Into<String>) {
        debug_assert!(!self.is_terminal());
        self.status = ExecutionStatus::Failed;
        self.failure_reason = Some(reason.into());
        self.completed_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{CheckpointDescriptor, GuardCondition, StepDescriptor};
    use serde_json::json;

    fn template() -> WorkflowTemplate {
        WorkflowTemplate::new("expense", "Expense Reimbursement", "Finance")
            .with_step(StepDescriptor::new(0, "extract_receipt"))
            .with_step(StepDescriptor::new(1, "check_policy"))
            .with_checkpoint(CheckpointDescriptor::new(
                "manager_review",
                GuardCondition::Always,
                1,
            ))
    }

    #[test]
    fn test_new_execution_mirrors_template_checkpoints() {
        let exec = WorkflowExecution::new(&template(), Context::new());

        assert!(exec.id.starts_with("exec_"));
        assert_eq!(exec.template_id, "expense");
        assert_eq!(exec.status, ExecutionStatus::Pending);
        assert_eq!(exec.current_step, 0);
        assert_eq!(exec.checkpoints.len(), 1);
        assert_eq!(
            exec.checkpoint("manager_review").unwrap().status,
            CheckpointStatus::Pending
        );
        assert!(exec.completed_at.is_none());
        assert!(exec.failure_reason.is_none());
    }

    #[test]
    fn test_execution_ids_are_unique() {
        let t = template();
        let a = WorkflowExecution::new(&t, Context::new());
        let b = WorkflowExecution::new(&t, Context::new());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_complete_step_merges_delta_and_advances() {
        let mut exec = WorkflowExecution::new(&template(), Context::new());
        exec.start();

        let mut delta = ContextDelta::new();
        delta.insert("amount".to_string(), json!(120.5));
        exec.complete_step(delta);

        assert_eq!(exec.current_step, 1);
        assert_eq!(exec.context.get("amount"), Some(&json!(120.5)));
    }

    #[test]
    fn test_complete_step_overwrites_existing_keys() {
        let mut exec = WorkflowExecution::new(&template(), Context::new());
        exec.start();

        let mut delta = ContextDelta::new();
        delta.insert("stage".to_string(), json!("extracted"));
        exec.complete_step(delta);

        let mut delta = ContextDelta::new();
        delta.insert("stage".to_string(), json!("checked"));
        exec.complete_step(delta);

        assert_eq!(exec.context.get("stage"), Some(&json!("checked")));
        assert_eq!(exec.current_step, 2);
    }

    #[test]
    fn test_lifecycle_transitions() {
        let mut exec = WorkflowExecution::new(&template(), Context::new());
        assert!(!exec.is_terminal());

        exec.start();
        assert_eq!(exec.status, ExecutionStatus::Running);

        exec.pause();
        assert_eq!(exec.status, ExecutionStatus::Paused);

        exec.resume();
        assert_eq!(exec.status, ExecutionStatus::Running);

        exec.complete();
        assert_eq!(exec.status, ExecutionStatus::Completed);
        assert!(exec.is_terminal());
        assert!(exec.completed_at.is_some());
    }

    #[test]
    fn test_fail_records_reason() {
        let mut exec = WorkflowExecution::new(&template(), Context::new());
        exec.start();
        exec.fail("capability call failed: ERP connection refused");

        assert_eq!(exec.status, ExecutionStatus::Failed);
        assert!(exec.is_terminal());
        assert!(exec.failure_reason.as_deref().unwrap().contains("ERP"));
    }

    #[test]
    fn test_checkpoint_approve() {
        let mut exec = WorkflowExecution::new(&template(), Context::new());
        exec.checkpoint_mut("manager_review").unwrap().approve("alex");

        let cp = exec.checkpoint("manager_review").unwrap();
        assert_eq!(cp.status, CheckpointStatus::Approved);
        assert_eq!(cp.approver.as_deref(), Some("alex"));
        assert!(cp.decided_at.is_some());
        assert!(cp.note.is_none());
        assert!(exec.pending_checkpoints().is_empty());
    }

    #[test]
    fn test_checkpoint_reject_records_note() {
        let mut exec = WorkflowExecution::new(&template(), Context::new());
        exec.checkpoint_mut("manager_review")
            .unwrap()
            .reject("sam", "policy violation");

        let cp = exec.checkpoint("manager_review").unwrap();
        assert_eq!(cp.status, CheckpointStatus::Rejected);
        assert_eq!(cp.note.as_deref(), Some("policy violation"));
    }

    #[test]
    fn test_status_display() {
        assert_eq!(ExecutionStatus::Paused.to_string(), "paused");
        assert_eq!(ExecutionStatus::Completed.to_string(), "completed");
    }

    #[test]
    fn test_execution_json_roundtrip() {
        let mut exec = WorkflowExecution::new(&template(), Context::new());
        exec.start();
        exec.complete_step(ContextDelta::new());

        let json = serde_json::to_string_pretty(&exec).unwrap();
        let loaded: WorkflowExecution = serde_json::from_str(&json).unwrap();

        assert_eq!(loaded, exec);
    }
}
