//! Engine Module
//!
//! The orchestration core: the checkpoint gate and the orchestrator that
//! drives executions through their step loops and approval pauses.
//!
//! # Structure
//!
//! - [`gate`]: Pure checkpoint gate evaluation
//! - [`orchestrator`]: Start/approve/reject/cancel/query operations

pub mod gate;
pub mod orchestrator;

pub use gate::{evaluate, GateReport};
pub use orchestrator::Orchestrator;
