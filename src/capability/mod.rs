//! Capability Module
//!
//! The seam between the engine and the outside world. Each step in a
//! workflow template names an action; the dispatcher resolves that name to a
//! registered capability provider and invokes it under a deadline.
//!
//! # Structure
//!
//! - [`provider`]: The `CapabilityProvider` contract and error type
//! - [`dispatcher`]: Name-keyed provider registry with deadline enforcement

pub mod dispatcher;
pub mod provider;

pub use dispatcher::CapabilityDispatcher;
pub use provider::{CapabilityError, CapabilityProvider, Context, ContextDelta, LoggingProvider};
