//! Template Catalog
//!
//! Holds immutable workflow templates, loaded once at startup. The catalog
//! is write-once per id, so read operations are safe for unlimited
//! concurrent callers. It is an explicit object passed into the
//! orchestrator, never module-level state, so multiple isolated engine
//! instances can coexist.

use std::collections::HashMap;

use log::info;

use crate::error::{EngineError, EngineResult};

use super::model::WorkflowTemplate;

/// Registry of immutable workflow templates keyed by id.
pub struct TemplateCatalog {
    templates: HashMap<String, WorkflowTemplate>,
}

impl TemplateCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self {
            templates: HashMap::new(),
        }
    }

    /// Registers a template.
    ///
    /// Fails with [`EngineError::TemplateAlreadyExists`] if the id is taken;
    /// templates are never replaced at runtime.
    pub fn register(&mut self, template: WorkflowTemplate) -> EngineResult<()> {
        if self.templates.contains_key(&template.id) {
            return Err(EngineError::TemplateAlreadyExists(template.id));
        }

        info!(
            "Registered template '{}' ({} steps, {} checkpoints)",
            template.id,
            template.steps.len(),
            template.checkpoints.len()
        );
        self.templates.insert(template.id.clone(), template);
        Ok(())
    }

    /// Returns the template with the given id.
    pub fn get(&self, id: &str) -> EngineResult<&WorkflowTemplate> {
        self.templates
            .get(id)
            .ok_or_else(|| EngineError::TemplateNotFound(id.to_string()))
    }

    /// Returns all templates, ordered by id.
    pub fn list(&self) -> Vec<&WorkflowTemplate> {
        let mut templates: Vec<&WorkflowTemplate> = self.templates.values().collect();
        templates.sort_by(|a, b| a.id.cmp(&b.id));
        templates
    }

    /// Returns templates in the given category, ordered by id.
    pub fn list_by_category(&self, category: &str) -> Vec<&WorkflowTemplate> {
        self.list()
            .into_iter()
            .filter(|t| t.category == category)
            .collect()
    }

    /// Number of registered templates.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Returns true if no templates are registered.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl Default for TemplateCatalog {
    fn default() -> Self {
        Self::new()
    }
}
