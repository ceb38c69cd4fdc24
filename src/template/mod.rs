//! Template Module
//!
//! Static workflow definitions: the template data model, the write-once
//! catalog, YAML configuration loading, and the built-in enterprise
//! template library.
//!
//! # Structure
//!
//! - [`model`]: Core data structures (templates, steps, checkpoints, guards)
//! - [`catalog`]: Write-once template registry
//! - [`loader`]: YAML loading, saving, and validation
//! - [`library`]: Ready-made enterprise templates

pub mod catalog;
pub mod library;
pub mod loader;
pub mod model;

pub use catalog::TemplateCatalog;
pub use library::builtin_templates;
pub use loader::{load_templates, save_templates, validate_template};
pub use model::{
    CheckpointDescriptor, GuardCondition, StepDescriptor, Trigger, TriggerKind, WorkflowTemplate,
};
