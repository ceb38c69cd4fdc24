//! Execution Store
//!
//! In-memory store holding mutable `WorkflowExecution` records keyed by id.
//! The only cross-execution shared mutable structure in the engine; all
//! mutation goes through its accessors, never through direct writes on a
//! cached snapshot.
//!
//! The store also hands out the per-execution-id lock that serializes the
//! critical section "read current state → invoke capability → write new
//! state" for a single execution.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use log::debug;

use crate::error::{EngineError, EngineResult};

use super::record::{ExecutionStatus, WorkflowExecution};

/// Predicate for listing executions by status and/or template id.
///
/// # Example
///
/// ```
/// use flowgate::execution::{ExecutionFilter, ExecutionStatus};
///
/// let filter = ExecutionFilter::new().with_status(ExecutionStatus::Paused);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ExecutionFilter {
    pub status: Option<ExecutionStatus>,
    pub template_id: Option<String>,
}

impl ExecutionFilter {
    /// Creates a filter matching every execution.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts matches to one status.
    pub fn with_status(mut self, status: ExecutionStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Restricts matches to one template.
    pub fn with_template_id(mut self, template_id: impl Into<String>) -> Self {
        self.template_id = Some(template_id.into());
        self
    }

    /// Returns true if the execution satisfies every set predicate.
    pub fn matches(&self, execution: &WorkflowExecution) -> bool {
        if let Some(status) = self.status {
            if execution.status != status {
                return false;
            }
        }
        if let Some(ref template_id) = self.template_id {
            if &execution.template_id != template_id {
                return false;
            }
        }
        true
    }
}

/// In-memory execution store with per-id serialization.
pub struct ExecutionStore {
    records: RwLock<HashMap<String, WorkflowExecution>>,
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl ExecutionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Atomically inserts a new execution record.
    ///
    /// Ids are minted by the orchestrator, so a collision should not occur
    /// in practice, but it is checked regardless.
    pub fn create(&self, execution: WorkflowExecution) -> EngineResult<()> {
        let mut records = self.records.write().expect("execution store poisoned");
        if records.contains_key(&execution.id) {
            return Err(EngineError::DuplicateExecutionId(execution.id));
        }

        debug!("Created execution record '{}'", execution.id);
        records.insert(execution.id.clone(), execution);
        Ok(())
    }

    /// Returns a snapshot of the execution with the given id.
    pub fn get(&self, id: &str) -> EngineResult<WorkflowExecution> {
        self.records
            .read()
            .expect("execution store poisoned")
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::ExecutionNotFound(id.to_string()))
    }

    /// Replaces the stored snapshot for an execution.
    ///
    /// Must be called only while holding that execution's lock from
    /// [`lock_handle`](Self::lock_handle).
    pub fn update(&self, execution: WorkflowExecution) -> EngineResult<()> {
        let mut records = self.records.write().expect("execution store poisoned");
        if !records.contains_key(&execution.id) {
            return Err(EngineError::ExecutionNotFound(execution.id));
        }
        records.insert(execution.id.clone(), execution);
        Ok(())
    }

    /// Returns snapshots of all executions matching the filter, ordered by
    /// start time.
    pub fn list(&self, filter: &ExecutionFilter) -> Vec<WorkflowExecution> {
        let records = self.records.read().expect("execution store poisoned");
        let mut matches: Vec<WorkflowExecution> = records
            .values()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.started_at.cmp(&b.started_at).then(a.id.cmp(&b.id)));
        matches
    }

    /// Number of stored executions.
    pub fn len(&self) -> usize {
        self.records.read().expect("execution store poisoned").len()
    }

    /// Returns true if no executions are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the per-execution-id lock.
    ///
    /// Holding this lock serializes a single execution's step loop against
    /// concurrent approve/reject/cancel calls; different executions proceed
    /// independently.
    pub fn lock_handle(&self, id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().expect("execution lock map poisoned");
        locks
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }
}

impl Default for ExecutionStore {
    fn default() -> Self {
        Self::new()
    }
}
