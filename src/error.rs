//! Engine Error Taxonomy
//!
//! Every engine operation returns a typed result; none of these variants is
//! ever swallowed internally. A failed step or a rejected checkpoint marks
//! the execution `Failed` immediately and irreversibly; retry, if desired,
//! is a caller-level policy.

use thiserror::Error;

use crate::capability::CapabilityError;

/// Errors surfaced by engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// No template registered under the given id.
    #[error("workflow template '{0}' not found")]
    TemplateNotFound(String),

    /// A template with the given id is already registered.
    #[error("workflow template '{0}' already registered")]
    TemplateAlreadyExists(String),

    /// No execution record exists for the given id.
    #[error("workflow execution '{0}' not found")]
    ExecutionNotFound(String),

    /// An execution with the given id already exists in the store.
    #[error("workflow execution '{0}' already exists")]
    DuplicateExecutionId(String),

    /// The requested operation is not valid in the execution's current state.
    #[error("invalid transition for execution '{execution}': {detail}")]
    InvalidTransition { execution: String, detail: String },

    /// The named checkpoint does not exist on the execution.
    #[error("execution '{execution}' has no checkpoint named '{name}'")]
    CheckpointNotFound { execution: String, name: String },

    /// An action name already has a registered capability provider.
    #[error("action '{0}' already has a registered provider")]
    ProviderAlreadyRegistered(String),

    /// A step's external capability call errored. Terminal for the execution.
    #[error("capability call failed: {0}")]
    Capability(#[from] CapabilityError),

    /// A template failed structural validation.
    #[error("invalid template: {0}")]
    InvalidTemplate(String),

    /// The durable store could not read or write a record.
    #[error("storage error: {0}")]
    Storage(String),
}

/// Convenience alias used throughout the engine.
pub type EngineResult<T> = Result<T, EngineError>;
