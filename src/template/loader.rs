//! Template Configuration Loading
//!
//! Handles loading and validating workflow template definitions from YAML
//! configuration files. Templates are static configuration read at startup;
//! nothing here runs at execution time.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

use super::model::WorkflowTemplate;

/// Top-level shape of a template configuration file.
#[derive(Serialize, Deserialize, Debug)]
struct TemplateFile {
    templates: Vec<WorkflowTemplate>,
}

/// Loads workflow templates from a YAML file.
///
/// This function:
/// 1. Reads and parses the YAML file
/// 2. Validates each template's structure
/// 3. Rejects duplicate template ids within the file
///
/// # Example
///
/// ```rust,no_run
/// use flowgate::template::load_templates;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let templates = load_templates("templates.yaml")?;
///     println!("Loaded {} templates", templates.len());
///     Ok(())
/// }
/// ```
pub fn load_templates(path: impl AsRef<Path>) -> EngineResult<Vec<WorkflowTemplate>> {
    let path = path.as_ref();
    info!("Loading templates from: {}", path.display());

    let yaml_content = fs::read_to_string(path).map_err(|e| {
        EngineError::InvalidTemplate(format!(
            "failed to read template file '{}': {}",
            path.display(),
            e
        ))
    })?;

    debug!("YAML content loaded ({} bytes)", yaml_content.len());

    let file: TemplateFile = serde_yaml::from_str(&yaml_content).map_err(|e| {
        EngineError::InvalidTemplate(format!("failed to parse template YAML: {}", e))
    })?;

    let mut seen_ids: HashSet<&str> = HashSet::new();
    for template in &file.templates {
        validate_template(template)?;
        if !seen_ids.insert(&template.id) {
            return Err(EngineError::InvalidTemplate(format!(
                "duplicate template id '{}'",
                template.id
            )));
        }
    }

    info!("Loaded {} templates", file.templates.len());
    Ok(file.templates)
}

/// Saves workflow templates to a YAML file.
pub fn save_templates(
    templates: &[WorkflowTemplate],
    path: impl AsRef<Path>,
) -> EngineResult<()> {
    let path = path.as_ref();
    let file = TemplateFile {
        templates: templates.to_vec(),
    };

    let yaml_content = serde_yaml::to_string(&file)
        .map_err(|e| EngineError::InvalidTemplate(format!("failed to serialize: {}", e)))?;
    fs::write(path, yaml_content).map_err(|e| {
        EngineError::InvalidTemplate(format!("failed to write '{}': {}", path.display(), e))
    })?;

    info!("Templates saved to: {}", path.display());
    Ok(())
}

/// Validates a single template's structure.
///
/// Checks:
/// 1. Non-empty id, name, and step actions
/// 2. At least one step
/// 3. Step indices contiguous from 0
/// 4. Checkpoint names unique and non-empty
/// 5. Checkpoint `required_after_step` within the step range
pub fn validate_template(template: &WorkflowTemplate) -> EngineResult<()> {
    if template.id.trim().is_empty() {
        return Err(EngineError::InvalidTemplate(
            "template has empty id".to_string(),
        ));
    }
    if template.name.trim().is_empty() {
        return Err(EngineError::InvalidTemplate(format!(
            "template '{}' has empty name",
            template.id
        )));
    }
    if template.steps.is_empty() {
        return Err(EngineError::InvalidTemplate(format!(
            "template '{}' has no steps",
            template.id
        )));
    }

    for (position, step) in template.steps.iter().enumerate() {
        if step.index != position {
            return Err(EngineError::InvalidTemplate(format!(
                "template '{}': step at position {} has index {} (indices must be contiguous from 0)",
                template.id, position, step.index
            )));
        }
        if step.action.trim().is_empty() {
            return Err(EngineError::InvalidTemplate(format!(
                "template '{}': step {} has empty action",
                template.id, step.index
            )));
        }
        if step.timeout_secs == 0 {
            return Err(EngineError::InvalidTemplate(format!(
                "template '{}': step {} has zero timeout",
                template.id, step.index
            )));
        }
    }

    let mut seen_names: HashSet<&str> = HashSet::new();
    for checkpoint in &template.checkpoints {
        if checkpoint.name.trim().is_empty() {
            return Err(EngineError::InvalidTemplate(format!(
                "template '{}' has a checkpoint with empty name",
                template.id
            )));
        }
        if !seen_names.insert(&checkpoint.name) {
            return Err(EngineError::InvalidTemplate(format!(
                "template '{}': duplicate checkpoint name '{}'",
                template.id, checkpoint.name
            )));
        }
        if checkpoint.required_after_step >= template.steps.len() {
            return Err(EngineError::InvalidTemplate(format!(
                "template '{}': checkpoint '{}' gated after step {} but the template has {} steps",
                template.id,
                checkpoint.name,
                checkpoint.required_after_step,
                template.steps.len()
            )));
        }
    }

    debug!("Template '{}' validated", template.id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{CheckpointDescriptor, GuardCondition, StepDescriptor};
    use tempfile::tempdir;

    fn valid_template() -> WorkflowTemplate {
        WorkflowTemplate::new("ap_invoice", "Invoice Processing", "Finance")
            .with_step(StepDescriptor::new(0, "extract_invoice_data"))
            .with_step(StepDescriptor::new(1, "match_purchase_order"))
            .with_checkpoint(CheckpointDescriptor::new(
                "manager_approval",
                GuardCondition::Always,
                1,
            ))
    }

    #[test]
    fn test_validate_ok() {
        assert!(validate_template(&valid_template()).is_ok());
    }

    #[test]
    fn test_validate_empty_id() {
        let mut template = valid_template();
        template.id = "  ".to_string();
        assert!(validate_template(&template).is_err());
    }

    #[test]
    fn test_validate_no_steps() {
        let template = WorkflowTemplate::new("empty", "Empty", "Misc");
        let err = validate_template(&template).unwrap_err();
        assert!(err.to_string().contains("no steps"));
    }

    #[test]
    fn test_validate_noncontiguous_indices() {
        let template = WorkflowTemplate::new("gaps", "Gaps", "Misc")
            .with_step(StepDescriptor::new(0, "first"))
            .with_step(StepDescriptor::new(2, "third"));

        let err = validate_template(&template).unwrap_err();
        assert!(err.to_string().contains("contiguous"));
    }

    #[test]
    fn test_validate_empty_action() {
        let template =
            WorkflowTemplate::new("blank", "Blank", "Misc").with_step(StepDescriptor::new(0, " "));
        assert!(validate_template(&template).is_err());
    }

    #[test]
    fn test_validate_duplicate_checkpoint_names() {
        let template = WorkflowTemplate::new("dup", "Dup", "Misc")
            .with_step(StepDescriptor::new(0, "noop"))
            .with_checkpoint(CheckpointDescriptor::new("review", GuardCondition::Always, 0))
            .with_checkpoint(CheckpointDescriptor::new("review", GuardCondition::Always, 0));

        let err = validate_template(&template).unwrap_err();
        assert!(err.to_string().contains("duplicate checkpoint"));
    }

    #[test]
    fn test_validate_checkpoint_out_of_range() {
        let template = WorkflowTemplate::new("range", "Range", "Misc")
            .with_step(StepDescriptor::new(0, "noop"))
            .with_checkpoint(CheckpointDescriptor::new("late", GuardCondition::Always, 5));

        let err = validate_template(&template).unwrap_err();
        assert!(err.to_string().contains("late"));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("templates.yaml");

        let templates = vec![valid_template()];
        save_templates(&templates, &path).unwrap();

        let loaded = load_templates(&path).unwrap();
        assert_eq!(loaded, templates);
    }

    #[test]
    fn test_load_file_not_found() {
        let result = load_templates("/nonexistent/templates.yaml");
        assert!(matches!(result, Err(EngineError::InvalidTemplate(_))));
    }

    #[test]
    fn test_load_invalid_yaml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        fs::write(&path, "templates: [[[").unwrap();

        assert!(load_templates(&path).is_err());
    }

    #[test]
    fn test_load_rejects_duplicate_ids() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dup.yaml");
        save_templates(&[valid_template(), valid_template()], &path).unwrap();

        let err = load_templates(&path).unwrap_err();
        assert!(err.to_string().contains("duplicate template id"));
    }

    #[test]
    fn test_load_parses_guards() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("guards.yaml");

        let yaml = r#"
templates:
  - id: ap_invoice
    name: Invoice Processing
    category: Finance
    steps:
      - index: 0
        action: extract_invoice_data
    checkpoints:
      - name: director_approval
        required_after_step: 0
        guard:
          kind: amount_above
          key: invoice_amount
          threshold: 5000.0
"#;
        fs::write(&path, yaml).unwrap();

        let templates = load_templates(&path).unwrap();
        assert_eq!(templates.len(), 1);
        assert_eq!(
            templates[0].checkpoints[0].guard,
            GuardCondition::AmountAbove {
                key: "invoice_amount".to_string(),
                threshold: 5000.0
            }
        );
    }
}
