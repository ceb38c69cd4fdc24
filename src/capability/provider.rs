//! Capability Provider Contract
//!
//! A capability provider performs the real-world side effect for one step's
//! action: creating a CRM record, filing a ticket, placing a call,
//! generating a document. The engine treats every provider as an opaque,
//! possibly slow, possibly failing black box reached only through
//! [`execute`](CapabilityProvider::execute).

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use log::info;
use serde_json::Value;
use thiserror::Error;

/// Business data carried by an execution, keyed by string.
pub type Context = HashMap<String, Value>;

/// Keys a completed step adds or overwrites in the execution context.
pub type ContextDelta = HashMap<String, Value>;

/// Errors surfaced by capability invocations.
#[derive(Debug, Error)]
pub enum CapabilityError {
    /// The provider's external call errored.
    #[error("{0}")]
    Failed(String),

    /// The provider did not answer within the step's deadline.
    #[error("action '{action}' exceeded its deadline of {timeout:?}")]
    DeadlineExceeded { action: String, timeout: Duration },

    /// No provider is registered for the action name.
    #[error("no capability provider registered for action '{0}'")]
    UnknownAction(String),
}

/// External handler for one step action.
///
/// One resolvable implementation exists per distinct action name; providers
/// are registered with the [`CapabilityDispatcher`](super::CapabilityDispatcher)
/// and looked up by name at dispatch time.
#[async_trait]
pub trait CapabilityProvider: Send + Sync {
    /// Performs the action against the given context and returns the keys to
    /// merge back into it.
    ///
    /// The context is read-only here; only the orchestrator merges deltas,
    /// and only for completed steps.
    async fn execute(
        &self,
        action: &str,
        context: &Context,
    ) -> Result<ContextDelta, CapabilityError>;
}

/// Provider that logs the action and records a completion marker.
///
/// Stand-in for environments where the real integrations are not wired up
/// (CLI walkthroughs, tests). Unlike a real provider it returns immediately;
/// there is no artificial delay.
pub struct LoggingProvider;

#[async_trait]
impl CapabilityProvider for LoggingProvider {
    async fn execute(
        &self,
        action: &str,
        _context: &Context,
    ) -> Result<ContextDelta, CapabilityError> {
        info!("Executing action: {}", action);

        let mut delta = ContextDelta::new();
        delta.insert(format!("{}_completed", action), Value::Bool(true));
        Ok(delta)
    }
}
