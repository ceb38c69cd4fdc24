//! Capability Dispatcher
//!
//! Name-keyed registry of capability providers. Given a step's action name,
//! the dispatcher resolves the matching provider and invokes it under an
//! explicit deadline. Adding a new step action means registering a provider
//! here, never editing orchestrator code.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use tokio::time::timeout;

use crate::error::{EngineError, EngineResult};

use super::provider::{CapabilityError, CapabilityProvider, Context, ContextDelta};

/// Default deadline applied when a step does not carry its own.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Resolves action names to capability providers and invokes them.
///
/// # Example
///
/// ```
/// use flowgate::capability::{CapabilityDispatcher, LoggingProvider};
///
/// let mut dispatcher = CapabilityDispatcher::new();
/// dispatcher.register("extract_invoice_data", LoggingProvider).unwrap();
/// assert!(dispatcher.resolves("extract_invoice_data"));
/// ```
pub struct CapabilityDispatcher {
    providers: HashMap<String, Arc<dyn CapabilityProvider>>,
    default_timeout: Duration,
}

impl CapabilityDispatcher {
    /// Creates an empty dispatcher.
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
            default_timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Sets the deadline used when a dispatch does not carry its own.
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Registers a provider for an action name.
    ///
    /// Each action name resolves to exactly one provider; registering a
    /// duplicate name fails with [`EngineError::ProviderAlreadyRegistered`].
    pub fn register(
        &mut self,
        action: impl Into<String>,
        provider: impl CapabilityProvider + 'static,
    ) -> EngineResult<()> {
        self.register_arc(action, Arc::new(provider))
    }

    /// Registers an already-shared provider for an action name.
    pub fn register_arc(
        &mut self,
        action: impl Into<String>,
        provider: Arc<dyn CapabilityProvider>,
    ) -> EngineResult<()> {
        let action = action.into();
        if self.providers.contains_key(&action) {
            return Err(EngineError::ProviderAlreadyRegistered(action));
        }

        debug!("Registered capability provider for action '{}'", action);
        self.providers.insert(action, provider);
        Ok(())
    }

    /// Returns true if a provider is registered for the action.
    pub fn resolves(&self, action: &str) -> bool {
        self.providers.contains_key(action)
    }

    /// Returns the registered action names, sorted.
    pub fn actions(&self) -> Vec<String> {
        let mut actions: Vec<String> = self.providers.keys().cloned().collect();
        actions.sort();
        actions
    }

    /// Resolves and invokes the provider for an action.
    ///
    /// The call runs under the given deadline (or the dispatcher default);
    /// exceeding it surfaces as [`CapabilityError::DeadlineExceeded`], which
    /// the orchestrator treats like any other step failure.
    pub async fn dispatch(
        &self,
        action: &str,
        context: &Context,
        deadline: Option<Duration>,
    ) -> Result<ContextDelta, CapabilityError> {
        let provider = self
            .providers
            .get(action)
            .ok_or_else(|| CapabilityError::UnknownAction(action.to_string()))?;

        let limit = deadline.unwrap_or(self.default_timeout);

        match timeout(limit, provider.execute(action, context)).await {
            Ok(result) => result,
            Err(_) => {
                warn!("Action '{}' exceeded deadline of {:?}", action, limit);
                Err(CapabilityError::DeadlineExceeded {
                    action: action.to_string(),
                    timeout: limit,
                })
            }
        }
    }
}

impl Default for CapabilityDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::LoggingProvider;
    use async_trait::async_trait;
    use serde_json::json;

    /// Provider that sleeps longer than any test deadline.
    struct SlowProvider;

    #[async_trait]
    impl CapabilityProvider for SlowProvider {
        async fn execute(
            &self,
            _action: &str,
            _context: &Context,
        ) -> Result<ContextDelta, CapabilityError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(ContextDelta::new())
        }
    }

    /// Provider that always fails.
    struct FailingProvider;

    #[async_trait]
    impl CapabilityProvider for FailingProvider {
        async fn execute(
            &self,
            _action: &str,
            _context: &Context,
        ) -> Result<ContextDelta, CapabilityError> {
            Err(CapabilityError::Failed("ERP connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_dispatch_resolves_by_action_name() {
        let mut dispatcher = CapabilityDispatcher::new();
        dispatcher.register("notify_vendor", LoggingProvider).unwrap();

        let delta = dispatcher
            .dispatch("notify_vendor", &Context::new(), None)
            .await
            .unwrap();

        assert_eq!(delta.get("notify_vendor_completed"), Some(&json!(true)));
    }

    #[tokio::test]
    async fn test_dispatch_unknown_action() {
        let dispatcher = CapabilityDispatcher::new();
        let result = dispatcher.dispatch("missing", &Context::new(), None).await;

        assert!(matches!(result, Err(CapabilityError::UnknownAction(_))));
    }

    #[tokio::test]
    async fn test_dispatch_deadline_exceeded() {
        let mut dispatcher = CapabilityDispatcher::new();
        dispatcher.register("slow_call", SlowProvider).unwrap();

        let result = dispatcher
            .dispatch(
                "slow_call",
                &Context::new(),
                Some(Duration::from_millis(20)),
            )
            .await;

        assert!(matches!(
            result,
            Err(CapabilityError::DeadlineExceeded { .. })
        ));
    }

    #[tokio::test]
    async fn test_dispatch_provider_failure_passes_through() {
        let mut dispatcher = CapabilityDispatcher::new();
        dispatcher.register("sync_erp", FailingProvider).unwrap();

        let result = dispatcher.dispatch("sync_erp", &Context::new(), None).await;

        match result {
            Err(CapabilityError::Failed(msg)) => assert!(msg.contains("ERP")),
            other => panic!("Expected Failed, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_register_duplicate_action_rejected() {
        let mut dispatcher = CapabilityDispatcher::new();
        dispatcher.register("notify", LoggingProvider).unwrap();

        let result = dispatcher.register("notify", LoggingProvider);
        match result {
            Err(EngineError::ProviderAlreadyRegistered(action)) => {
                assert_eq!(action, "notify");
            }
            other => panic!("Expected ProviderAlreadyRegistered, got {:?}", other),
        }
    }

    #[test]
    fn test_actions_sorted() {
        let mut dispatcher = CapabilityDispatcher::new();
        dispatcher.register("b_action", LoggingProvider).unwrap();
        dispatcher.register("a_action", LoggingProvider).unwrap();

        assert_eq!(dispatcher.actions(), vec!["a_action", "b_action"]);
        assert!(dispatcher.resolves("a_action"));
        assert!(!dispatcher.resolves("c_action"));
    }
}
