//! Workflow Orchestrator
//!
//! The engine's coordinating component. Owns the template catalog, the
//! capability dispatcher, and the execution store, and exposes the public
//! operations: start a workflow, approve or reject a checkpoint, cancel,
//! and query executions.
//!
//! Lifecycle: `Pending → Running → {Paused, Completed, Failed}` and
//! `Paused → {Running, Failed}`. Completed and Failed are terminal; no
//! operation leaves them. Every state change for one execution happens
//! under that execution's lock from the store.

use std::sync::Arc;
use std::time::Duration;

use log::{error, info, warn};

use crate::capability::{CapabilityDispatcher, Context};
use crate::error::{EngineError, EngineResult};
use crate::execution::{
    CheckpointStatus, DurableStore, ExecutionFilter, ExecutionStatus, ExecutionStore,
    WorkflowExecution,
};
use crate::template::{validate_template, TemplateCatalog, WorkflowTemplate};

use super::gate;

/// Coordinates template instantiation, step dispatch, and checkpoint
/// decisions over a shared execution store.
///
/// One orchestrator is one logical engine instance; everything it touches is
/// an explicit field, so several isolated instances can coexist in a
/// process.
///
/// # Example
///
/// ```
/// use flowgate::capability::{CapabilityDispatcher, LoggingProvider};
/// use flowgate::engine::Orchestrator;
/// use flowgate::template::builtin_templates;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let mut dispatcher = CapabilityDispatcher::new();
/// dispatcher.register("extract_invoice_data", LoggingProvider)?;
/// // ... one provider per action ...
///
/// let mut orchestrator = Orchestrator::new(dispatcher);
/// for template in builtin_templates() {
///     orchestrator.register_template(template)?;
/// }
///
/// let id = orchestrator
///     .start_workflow("ap_invoice_processing", Default::default())
///     .await?;
/// println!("{}", orchestrator.execution(&id)?.status);
/// # Ok(())
/// # }
/// ```
pub struct Orchestrator {
    catalog: TemplateCatalog,
    dispatcher: CapabilityDispatcher,
    store: Arc<ExecutionStore>,
    durable: Option<Arc<dyn DurableStore>>,
}

impl Orchestrator {
    /// Creates an orchestrator with an empty catalog and store.
    pub fn new(dispatcher: CapabilityDispatcher) -> Self {
        Self {
            catalog: TemplateCatalog::new(),
            dispatcher,
            store: Arc::new(ExecutionStore::new()),
            durable: None,
        }
    }

    /// Mirrors every execution update into the given durable store.
    pub fn with_durable_store(mut self, durable: Arc<dyn DurableStore>) -> Self {
        self.durable = Some(durable);
        self
    }

    /// Validates and registers a workflow template.
    pub fn register_template(&mut self, template: WorkflowTemplate) -> EngineResult<()> {
        validate_template(&template)?;
        self.catalog.register(template)
    }

    /// Returns the registered template with the given id.
    pub fn template(&self, id: &str) -> EngineResult<&WorkflowTemplate> {
        self.catalog.get(id)
    }

    /// Returns all registered templates, ordered by id.
    pub fn templates(&self) -> Vec<&WorkflowTemplate> {
        self.catalog.list()
    }

    /// Returns a snapshot of the execution with the given id.
    pub fn execution(&self, id: &str) -> EngineResult<WorkflowExecution> {
        self.store.get(id)
    }

    /// Returns snapshots of all executions matching the filter.
    pub fn executions(&self, filter: &ExecutionFilter) -> Vec<WorkflowExecution> {
        self.store.list(filter)
    }

    /// Loads previously persisted execution records into the store.
    ///
    /// Returns the number of records restored. Records whose id is already
    /// present are skipped.
    pub async fn restore(&self) -> EngineResult<usize> {
        let Some(durable) = &self.durable else {
            return Ok(0);
        };

        let mut restored = 0;
        for record in durable.load_all().await? {
            match self.store.create(record) {
                Ok(()) => restored += 1,
                Err(EngineError::DuplicateExecutionId(id)) => {
                    warn!("Skipping already-loaded execution '{}'", id);
                }
                Err(e) => return Err(e),
            }
        }

        info!("Restored {} execution records", restored);
        Ok(restored)
    }

    /// Starts a new execution of a registered template.
    ///
    /// The execution is created, transitioned to Running, and driven until
    /// it quiesces: Completed, Paused at a checkpoint, or Failed. The id is
    /// returned in every case; a step failure is recorded on the execution,
    /// not surfaced as an error here.
    ///
    /// # Arguments
    ///
    /// * `template_id` - Id of a registered template
    /// * `context` - Initial business data for the execution
    ///
    /// # Returns
    ///
    /// The new execution's id, or [`EngineError::TemplateNotFound`].
    pub async fn start_workflow(
        &self,
        template_id: &str,
        context: Context,
    ) -> EngineResult<String> {
        let template = self.catalog.get(template_id)?;

        let execution = WorkflowExecution::new(template, context);
        let id = execution.id.clone();
        info!("Starting execution '{}' of template '{}'", id, template_id);

        self.store.create(execution.clone())?;
        if let Some(durable) = &self.durable {
            durable.save(&execution).await?;
        }

        self.advance(&id, template).await?;
        Ok(id)
    }

    /// Approves a pending checkpoint on a paused execution.
    ///
    /// Records the approver and decision time. When no applicable checkpoint
    /// remains pending, the execution resumes from its current step; steps
    /// already completed are never replayed.
    pub async fn approve_checkpoint(
        &self,
        id: &str,
        name: &str,
        approver: impl Into<String>,
    ) -> EngineResult<()> {
        let approver = approver.into();
        let lock = self.store.lock_handle(id);
        let template;
        let resume;
        {
            let _guard = lock.lock().await;
            let mut execution = self.store.get(id)?;

            if execution.status != ExecutionStatus::Paused {
                return Err(EngineError::InvalidTransition {
                    execution: id.to_string(),
                    detail: format!(
                        "cannot approve checkpoint '{}' while execution is {}",
                        name, execution.status
                    ),
                });
            }

            template = self.catalog.get(&execution.template_id)?;
            let checkpoint =
                execution
                    .checkpoint_mut(name)
                    .ok_or_else(|| EngineError::CheckpointNotFound {
                        execution: id.to_string(),
                        name: name.to_string(),
                    })?;
            if checkpoint.status != CheckpointStatus::Pending {
                return Err(EngineError::InvalidTransition {
                    execution: id.to_string(),
                    detail: format!("checkpoint '{}' has already been decided", name),
                });
            }

            checkpoint.approve(&approver);
            info!("Execution '{}': checkpoint '{}' approved by {}", id, name, approver);

            resume = gate::evaluate(&execution, template).is_clear();
            if resume {
                execution.resume();
                info!("Execution '{}' resuming from step {}", id, execution.current_step);
            }
            self.persist(&execution).await?;
        }

        if resume {
            self.advance(id, template).await?;
        }
        Ok(())
    }

    /// Rejects a pending checkpoint on a paused execution.
    ///
    /// Rejection is terminal: the execution fails with a reason naming the
    /// checkpoint and the given rejection reason.
    pub async fn reject_checkpoint(
        &self,
        id: &str,
        name: &str,
        approver: impl Into<String>,
        reason: impl Into<String>,
    ) -> EngineResult<()> {
        let approver = approver.into();
        let reason = reason.into();
        let lock = self.store.lock_handle(id);
        let _guard = lock.lock().await;
        let mut execution = self.store.get(id)?;

        if execution.status != ExecutionStatus::Paused {
            return Err(EngineError::InvalidTransition {
                execution: id.to_string(),
                detail: format!(
                    "cannot reject checkpoint '{}' while execution is {}",
                    name, execution.status
                ),
            });
        }

        let checkpoint =
            execution
                .checkpoint_mut(name)
                .ok_or_else(|| EngineError::CheckpointNotFound {
                    execution: id.to_string(),
                    name: name.to_string(),
                })?;
        if checkpoint.status != CheckpointStatus::Pending {
            return Err(EngineError::InvalidTransition {
                execution: id.to_string(),
                detail: format!("checkpoint '{}' has already been decided", name),
            });
        }

        checkpoint.reject(&approver, &reason);
        warn!("Execution '{}': checkpoint '{}' rejected by {}", id, name, approver);

        execution.fail(format!("checkpoint rejected: {} ({})", name, reason));
        self.persist(&execution).await
    }

    /// Cancels a Running or Paused execution.
    ///
    /// Cancellation is cooperative: a Running execution's in-flight step is
    /// never preempted; the step loop observes the Failed status before
    /// dispatching the next step.
    pub async fn cancel(&self, id: &str) -> EngineResult<()> {
        let lock = self.store.lock_handle(id);
        let _guard = lock.lock().await;
        let mut execution = self.store.get(id)?;

        match execution.status {
            ExecutionStatus::Running | ExecutionStatus::Paused => {
                execution.fail("cancelled");
                info!("Execution '{}' cancelled", id);
                self.persist(&execution).await
            }
            status => Err(EngineError::InvalidTransition {
                execution: id.to_string(),
                detail: format!("cannot cancel execution while {}", status),
            }),
        }
    }

    /// Drives an execution's step loop until it quiesces.
    ///
    /// Each iteration runs under the execution's lock: re-read state, stop
    /// unless it should progress, evaluate the checkpoint gate, then either
    /// pause, complete, or dispatch the next step and persist the result.
    /// The lock is released between iterations so approve/reject/cancel can
    /// interleave between steps.
    async fn advance(&self, id: &str, template: &WorkflowTemplate) -> EngineResult<()> {
        loop {
            let lock = self.store.lock_handle(id);
            let _guard = lock.lock().await;
            let mut execution = self.store.get(id)?;

            match execution.status {
                ExecutionStatus::Pending => execution.start(),
                ExecutionStatus::Running => {}
                // Paused, cancelled, or otherwise finished while the lock
                // was released.
                _ => return Ok(()),
            }

            let report = gate::evaluate(&execution, template);
            if !report.is_clear() {
                info!(
                    "Execution '{}' paused at step {} awaiting checkpoints: {}",
                    id,
                    execution.current_step,
                    report.pending.join(", ")
                );
                execution.pause();
                self.persist(&execution).await?;
                return Ok(());
            }

            if execution.current_step >= template.step_count() {
                execution.complete();
                info!("Execution '{}' completed", id);
                self.persist(&execution).await?;
                return Ok(());
            }

            let step = template.step(execution.current_step).ok_or_else(|| {
                EngineError::InvalidTemplate(format!(
                    "template '{}' has no step at index {}",
                    template.id, execution.current_step
                ))
            })?;

            // Static step parameters are visible to the provider but only
            // persist into the context if the provider echoes them back.
            let mut call_context = step.parameters.clone();
            call_context.extend(execution.context.clone());

            info!("Execution '{}': dispatching step {} ({})", id, step.index, step.action);
            let deadline = Duration::from_secs(step.timeout_secs);
            match self
                .dispatcher
                .dispatch(&step.action, &call_context, Some(deadline))
                .await
            {
                Ok(delta) => {
                    execution.complete_step(delta);
                    self.persist(&execution).await?;
                }
                Err(e) => {
                    error!("Execution '{}': step {} ({}) failed: {}", id, step.index, step.action, e);
                    execution.fail(format!(
                        "step {} ({}) failed: {}",
                        step.index, step.action, e
                    ));
                    self.persist(&execution).await?;
                    return Ok(());
                }
            }
        }
    }

    /// Writes an updated execution snapshot to the store and, when
    /// configured, to the durable store. Call only while holding the
    /// execution's lock.
    async fn persist(&self, execution: &WorkflowExecution) -> EngineResult<()> {
        self.store.update(execution.clone())?;
        if let Some(durable) = &self.durable {
            durable.save(execution).await?;
        }
        Ok(())
    }
}
