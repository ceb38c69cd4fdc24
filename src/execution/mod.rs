//! Execution Module
//!
//! Live workflow state: the execution record, the in-memory store with
//! per-execution-id serialization, and optional durable persistence.
//!
//! # Structure
//!
//! - [`record`]: `WorkflowExecution` and its checkpoint/status types
//! - [`store`]: In-memory store, list filtering, per-id locks
//! - [`durable`]: `DurableStore` contract and JSON file implementation

pub mod durable;
pub mod record;
pub mod store;

pub use durable::{DurableStore, FileStore};
pub use record::{CheckpointState, CheckpointStatus, ExecutionStatus, WorkflowExecution};
pub use store::{ExecutionFilter, ExecutionStore};
