//! Node template registry
//!
//! Maps template names to shared templates so that persisted sessions,
//! which store only the template name, can be turned back into nodes.
//!
//! # Usage
//!
//! ```ignore
//! use noodle_graph::{NodeTemplate, TemplateRegistry};
//!
//! let mut registry = TemplateRegistry::new();
//! registry.register(NodeTemplate::new("Adder", ["value-1", "value-2"], ["sum"]));
//!
//! let adder = registry.get("Adder").unwrap();
//! let node = adder.instantiate();
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use crate::types::NodeTemplate;

/// Registry of node templates keyed by name
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: HashMap<String, Arc<NodeTemplate>>,
}

impl TemplateRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a template, replacing any earlier one with the same name
    ///
    /// Returns the shared template.
    pub fn register(&mut self, template: impl Into<Arc<NodeTemplate>>) -> Arc<NodeTemplate> {
        let template = template.into();
        if self
            .templates
            .insert(template.name().to_string(), Arc::clone(&template))
            .is_some()
        {
            log::debug!("Replaced template '{}'", template.name());
        }
        template
    }

    /// Get a template by name
    pub fn get(&self, name: &str) -> Option<&Arc<NodeTemplate>> {
        self.templates.get(name)
    }

    /// Check if a template name is registered
    pub fn has_template(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// All registered templates, sorted by name
    pub fn all_templates(&self) -> Vec<&Arc<NodeTemplate>> {
        let mut all: Vec<_> = self.templates.values().collect();
        all.sort_by(|a, b| a.name().cmp(b.name()));
        all
    }

    /// Merge another registry into this one
    ///
    /// Templates from `other` override existing ones with the same name.
    pub fn merge(&mut self, other: TemplateRegistry) {
        self.templates.extend(other.templates);
    }

    /// Number of registered templates
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_get() {
        let mut registry = TemplateRegistry::new();
        assert!(registry.is_empty());

        let adder = registry.register(NodeTemplate::new("Adder", ["value-1"], ["sum"]));
        assert!(registry.has_template("Adder"));
        assert!(Arc::ptr_eq(registry.get("Adder").unwrap(), &adder));
        assert!(registry.get("Missing").is_none());
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = TemplateRegistry::new();
        registry.register(NodeTemplate::new("Adder", ["a"], ["sum"]));
        registry.register(NodeTemplate::new("Adder", ["a", "b"], ["sum"]));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("Adder").unwrap().input_vars(), ["a", "b"]);
    }

    #[test]
    fn test_merge_and_listing() {
        let mut first = TemplateRegistry::new();
        first.register(NodeTemplate::new("Split", ["in"], ["left", "right"]));

        let mut second = TemplateRegistry::new();
        second.register(NodeTemplate::new("Adder", ["a", "b"], ["sum"]));

        first.merge(second);
        let names: Vec<_> = first.all_templates().iter().map(|t| t.name()).collect();
        assert_eq!(names, vec!["Adder", "Split"]);
    }
}
