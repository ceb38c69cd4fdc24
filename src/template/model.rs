//! Workflow Template Data Model
//!
//! Core data structures describing a multi-step business process and the
//! human-in-the-loop checkpoints that gate its progression. Templates are
//! static configuration: created once at startup and never mutated at
//! runtime.
//!
//! # Example YAML Format
//!
//! ```yaml
//! templates:
//!   - id: ap_invoice_processing
//!     name: Accounts Payable Invoice Processing
//!     category: Finance & Accounting
//!     trigger:
//!       kind: event_driven
//!       description: New email received with invoice attachment
//!     steps:
//!       - index: 0
//!         action: extract_invoice_data
//!       - index: 1
//!         action: match_purchase_order
//!         timeout_secs: 120
//!     checkpoints:
//!       - name: director_approval
//!         required_after_step: 1
//!         guard:
//!           kind: amount_above
//!           key: invoice_amount
//!           threshold: 5000.0
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::capability::Context;

/// Default per-step capability deadline, in seconds.
fn default_timeout_secs() -> u64 {
    60
}

/// How a template's executions are initiated. Pure configuration data,
/// carried for operator surfaces; the engine itself only ever starts an
/// execution when asked to.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    /// Started in reaction to an external event (webhook, inbound email, ...).
    EventDriven,
    /// Started explicitly by a person.
    Manual,
    /// Started on a schedule.
    Scheduled,
}

/// Trigger configuration for a template.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Trigger {
    pub kind: TriggerKind,
    /// Free-text description shown to operators.
    #[serde(default)]
    pub description: String,
}

impl Trigger {
    pub fn new(kind: TriggerKind, description: impl Into<String>) -> Self {
        Self {
            kind,
            description: description.into(),
        }
    }
}

impl Default for Trigger {
    fn default() -> Self {
        Self::new(TriggerKind::Manual, "")
    }
}

/// A single step in a workflow template.
///
/// A step names an action; the actual side effect is performed by whichever
/// capability provider is registered for that action name.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StepDescriptor {
    /// Zero-based position of this step in the template's sequence.
    pub index: usize,

    /// Action name resolved through the capability dispatcher.
    pub action: String,

    /// Static parameters passed to the capability alongside the execution
    /// context.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub parameters: HashMap<String, Value>,

    /// Deadline for the capability call, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl StepDescriptor {
    /// Creates a new step descriptor.
    ///
    /// # Example
    ///
    /// ```
    /// use flowgate::template::StepDescriptor;
    ///
    /// let step = StepDescriptor::new(0, "extract_invoice_data")
    ///     .with_parameter("source", "email")
    ///     .with_timeout_secs(120);
    /// ```
    pub fn new(index: usize, action: impl Into<String>) -> Self {
        Self {
            index,
            action: action.into().trim().to_string(),
            parameters: HashMap::new(),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Adds a static parameter to this step.
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// Sets the capability deadline for this step.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Guard condition deciding whether a checkpoint needs explicit human
/// approval for a given execution context.
///
/// A guard that cannot be evaluated against the context (an amount
/// threshold where the amount is absent or non-numeric) is treated as not
/// applicable, and the checkpoint is auto-satisfied.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GuardCondition {
    /// Always requires explicit approval.
    Always,
    /// Requires approval when the numeric context value exceeds the threshold.
    AmountAbove { key: String, threshold: f64 },
    /// Requires approval when the numeric context value is below the threshold.
    AmountBelow { key: String, threshold: f64 },
    /// Requires approval when the boolean context value is set to true.
    FlagSet { key: String },
}

impl GuardCondition {
    /// Evaluates the guard against an execution context.
    ///
    /// Returns `true` when the checkpoint requires explicit human approval,
    /// `false` when the guard does not apply and the checkpoint is
    /// auto-satisfied.
    pub fn requires_approval(&self, context: &Context) -> bool {
        match self {
            Self::Always => true,
            Self::AmountAbove { key, threshold } => match numeric(context, key) {
                Some(amount) => amount > *threshold,
                None => false,
            },
            Self::AmountBelow { key, threshold } => match numeric(context, key) {
                Some(amount) => amount < *threshold,
                None => false,
            },
            Self::FlagSet { key } => context.get(key).and_then(Value::as_bool).unwrap_or(false),
        }
    }
}

/// Reads a context value as a float, accepting integers.
fn numeric(context: &Context, key: &str) -> Option<f64> {
    context.get(key).and_then(Value::as_f64)
}

/// A named approval gate in a workflow template.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CheckpointDescriptor {
    /// Unique name within the template, e.g. "director_approval".
    pub name: String,

    /// Condition under which the checkpoint requires explicit approval.
    pub guard: GuardCondition,

    /// Index of the step after whose completion this checkpoint becomes
    /// applicable.
    pub required_after_step: usize,
}

impl CheckpointDescriptor {
    pub fn new(
        name: impl Into<String>,
        guard: GuardCondition,
        required_after_step: usize,
    ) -> Self {
        Self {
            name: name.into().trim().to_string(),
            guard,
            required_after_step,
        }
    }
}

/// An immutable, ordered multi-step process definition plus its approval
/// checkpoints.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WorkflowTemplate {
    /// Unique identifier, e.g. "ap_invoice_processing".
    pub id: String,

    /// Human-readable name.
    pub name: String,

    /// Business category, e.g. "Finance & Accounting".
    pub category: String,

    /// How executions of this template are initiated.
    #[serde(default)]
    pub trigger: Trigger,

    /// Ordered sequence of steps.
    #[serde(default)]
    pub steps: Vec<StepDescriptor>,

    /// Approval checkpoints gating progression.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub checkpoints: Vec<CheckpointDescriptor>,
}

impl WorkflowTemplate {
    /// Creates a new template with no steps or checkpoints.
    ///
    /// # Example
    ///
    /// ```
    /// use flowgate::template::{StepDescriptor, WorkflowTemplate};
    ///
    /// let template = WorkflowTemplate::new("ticket_triage", "Ticket Triage", "IT")
    ///     .with_step(StepDescriptor::new(0, "categorize_ticket"))
    ///     .with_step(StepDescriptor::new(1, "route_ticket"));
    /// assert_eq!(template.step_count(), 2);
    /// ```
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into().trim().to_string(),
            name: name.into().trim().to_string(),
            category: category.into().trim().to_string(),
            trigger: Trigger::default(),
            steps: Vec::new(),
            checkpoints: Vec::new(),
        }
    }

    /// Sets the trigger configuration.
    pub fn with_trigger(mut self, kind: TriggerKind, description: impl Into<String>) -> Self {
        self.trigger = Trigger::new(kind, description);
        self
    }

    /// Appends a step.
    pub fn with_step(mut self, step: StepDescriptor) -> Self {
        self.steps.push(step);
        self
    }

    /// Appends a checkpoint.
    pub fn with_checkpoint(mut self, checkpoint: CheckpointDescriptor) -> Self {
        self.checkpoints.push(checkpoint);
        self
    }

    /// Returns the step at the given index, if any.
    pub fn step(&self, index: usize) -> Option<&StepDescriptor> {
        self.steps.iter().find(|s| s.index == index)
    }

    /// Returns the checkpoint with the given name, if any.
    pub fn checkpoint(&self, name: &str) -> Option<&CheckpointDescriptor> {
        self.checkpoints.iter().find(|c| c.name == name)
    }

    /// Number of steps in the template.
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx(pairs: &[(&str, Value)]) -> Context {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_step_descriptor_builder() {
        let step = StepDescriptor::new(2, " match_purchase_order ")
            .with_parameter("system", "erp")
            .with_timeout_secs(120);

        assert_eq!(step.index, 2);
        assert_eq!(step.action, "match_purchase_order");
        assert_eq!(step.parameters.get("system"), Some(&json!("erp")));
        assert_eq!(step.timeout_secs, 120);
    }

    #[test]
    fn test_step_default_timeout() {
        let step = StepDescriptor::new(0, "noop");
        assert_eq!(step.timeout_secs, 60);
    }

    #[test]
    fn test_guard_always() {
        let guard = GuardCondition::Always;
        assert!(guard.requires_approval(&Context::new()));
    }

    #[test]
    fn test_guard_amount_above() {
        let guard = GuardCondition::AmountAbove {
            key: "invoice_amount".to_string(),
            threshold: 5000.0,
        };

        assert!(guard.requires_approval(&ctx(&[("invoice_amount", json!(7500.0))])));
        assert!(!guard.requires_approval(&ctx(&[("invoice_amount", json!(1500.0))])));
    }

    #[test]
    fn test_guard_amount_above_accepts_integers() {
        let guard = GuardCondition::AmountAbove {
            key: "invoice_amount".to_string(),
            threshold: 5000.0,
        };
        assert!(guard.requires_approval(&ctx(&[("invoice_amount", json!(6000))])));
    }

    #[test]
    fn test_guard_amount_missing_is_not_applicable() {
        let guard = GuardCondition::AmountAbove {
            key: "invoice_amount".to_string(),
            threshold: 5000.0,
        };
        assert!(!guard.requires_approval(&Context::new()));
        assert!(!guard.requires_approval(&ctx(&[("invoice_amount", json!("n/a"))])));
    }

    #[test]
    fn test_guard_amount_below() {
        let guard = GuardCondition::AmountBelow {
            key: "lead_score".to_string(),
            threshold: 50.0,
        };
        assert!(guard.requires_approval(&ctx(&[("lead_score", json!(20))])));
        assert!(!guard.requires_approval(&ctx(&[("lead_score", json!(85))])));
        assert!(!guard.requires_approval(&Context::new()));
    }

    #[test]
    fn test_guard_flag_set() {
        let guard = GuardCondition::FlagSet {
            key: "mismatch_detected".to_string(),
        };
        assert!(guard.requires_approval(&ctx(&[("mismatch_detected", json!(true))])));
        assert!(!guard.requires_approval(&ctx(&[("mismatch_detected", json!(false))])));
        assert!(!guard.requires_approval(&Context::new()));
    }

    #[test]
    fn test_guard_yaml_roundtrip() {
        let guard = GuardCondition::AmountAbove {
            key: "invoice_amount".to_string(),
            threshold: 5000.0,
        };

        let yaml = serde_yaml::to_string(&guard).unwrap();
        assert!(yaml.contains("amount_above"));

        let parsed: GuardCondition = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, guard);
    }

    #[test]
    fn test_template_builder() {
        let template = WorkflowTemplate::new("ap_invoice", "Invoice Processing", "Finance")
            .with_trigger(TriggerKind::EventDriven, "invoice email received")
            .with_step(StepDescriptor::new(0, "extract_invoice_data"))
            .with_step(StepDescriptor::new(1, "match_purchase_order"))
            .with_checkpoint(CheckpointDescriptor::new(
                "manager_approval",
                GuardCondition::Always,
                1,
            ));

        assert_eq!(template.step_count(), 2);
        assert_eq!(template.trigger.kind, TriggerKind::EventDriven);
        assert!(template.checkpoint("manager_approval").is_some());
        assert!(template.checkpoint("unknown").is_none());
        assert_eq!(template.step(1).unwrap().action, "match_purchase_order");
        assert!(template.step(5).is_none());
    }

    #[test]
    fn test_template_yaml_roundtrip() {
        let template = WorkflowTemplate::new("leave_request", "Leave Request", "HR")
            .with_step(StepDescriptor::new(0, "validate_balance"))
            .with_checkpoint(CheckpointDescriptor::new(
                "manager_approval",
                GuardCondition::Always,
                0,
            ));

        let yaml = serde_yaml::to_string(&template).unwrap();
        let parsed: WorkflowTemplate = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, template);
    }

    #[test]
    fn test_template_trigger_defaults_to_manual() {
        let yaml = r#"
id: bare
name: Bare Template
category: Misc
steps:
  - index: 0
    action: noop
"#;
        let parsed: WorkflowTemplate = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(parsed.trigger.kind, TriggerKind::Manual);
        assert_eq!(parsed.steps[0].timeout_secs, 60);
    }
}
