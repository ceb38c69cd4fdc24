//! FlowGate - Workflow Orchestration Engine
//!
//! A template-driven workflow orchestration engine with human-in-the-loop
//! approval checkpoints. Workflows are instantiated from immutable
//! templates, driven step by step through pluggable capability providers,
//! and suspended at checkpoints until a human approves or rejects.
//!
//! # Architecture
//!
//! The library is organized into five main modules:
//!
//! - [`template`]: Workflow templates, guards, catalog, and YAML loading
//! - [`capability`]: Provider contract and name-keyed dispatcher
//! - [`execution`]: Execution records, in-memory store, durable persistence
//! - [`engine`]: Checkpoint gate and the orchestrator
//! - [`error`]: The engine-wide error type
//!
//! # Example
//!
//! ```rust,no_run
//! use flowgate::capability::{CapabilityDispatcher, LoggingProvider};
//! use flowgate::engine::Orchestrator;
//! use flowgate::template::builtin_templates;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Wire a provider for every step action
//!     let mut dispatcher = CapabilityDispatcher::new();
//!     for template in builtin_templates() {
//!         for step in &template.steps {
//!             if !dispatcher.resolves(&step.action) {
//!                 dispatcher.register(&step.action, LoggingProvider)?;
//!             }
//!         }
//!     }
//!
//!     let mut orchestrator = Orchestrator::new(dispatcher);
//!     for template in builtin_templates() {
//!         orchestrator.register_template(template)?;
//!     }
//!
//!     // Start an execution; it runs until done or paused at a checkpoint
//!     let id = orchestrator
//!         .start_workflow("expense_reimbursement", Default::default())
//!         .await?;
//!
//!     // A human decides; the execution resumes from where it paused
//!     orchestrator
//!         .approve_checkpoint(&id, "finance_final_approval", "dana")
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod capability;
pub mod engine;
pub mod error;
pub mod execution;
pub mod template;

// Re-export commonly used types
pub use capability::{CapabilityDispatcher, CapabilityProvider, Context};
pub use engine::Orchestrator;
pub use error::{EngineError, EngineResult};
pub use execution::{ExecutionFilter, ExecutionStatus, WorkflowExecution};
pub use template::{builtin_templates, load_templates, WorkflowTemplate};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "FlowGate";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_version() {
        assert!(!VERSION.is_empty());
        assert!(VERSION.contains('.'));
    }

    #[test]
    fn test_app_name() {
        assert_eq!(APP_NAME, "FlowGate");
    }

    #[test]
    fn test_module_exports_template() {
        let template = WorkflowTemplate::new("t1", "Test", "Testing");
        assert_eq!(template.id, "t1");
        assert_eq!(template.step_count(), 0);
    }

    #[test]
    fn test_module_exports_builtins() {
        assert!(!builtin_templates().is_empty());
    }

    #[test]
    fn test_version_format() {
        let parts: Vec<&str> = VERSION.split('.').collect();
        assert!(parts.len() >= 2, "Version should have at least major.minor");
        for part in parts {
            assert!(part.parse::<u32>().is_ok(), "Version components should be numeric");
        }
    }
}
