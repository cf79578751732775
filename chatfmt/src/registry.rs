//! Name-keyed storage of chat templates.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use crate::error::{Error, Result};
use crate::template::ChatTemplate;

/// Mapping from template name to template.
///
/// Registration is additive. [`register`](Self::register) keeps the historical
/// last-write-wins behaviour, [`try_register`](Self::try_register) refuses to
/// replace an existing name.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: HashMap<String, Arc<ChatTemplate>>,
}

impl TemplateRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a template, replacing any template with the same name.
    ///
    /// Returns the replaced template, if any.
    pub fn register(&mut self, template: ChatTemplate) -> Option<Arc<ChatTemplate>> {
        let name = template.name().to_owned();
        let replaced = self.templates.insert(name, Arc::new(template));
        if let Some(old) = &replaced {
            warn!(template = %old.name(), "Chat template replaced by a later registration");
        }
        replaced
    }

    /// Register a template, failing if the name is taken.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateTemplate`] if a template with the same name
    /// is already registered.
    pub fn try_register(&mut self, template: ChatTemplate) -> Result<()> {
        if self.contains(template.name()) {
            return Err(Error::duplicate(template.name()));
        }
        self.register(template);
        Ok(())
    }

    /// Get a template by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TemplateNotFound`] if no template has this name.
    pub fn get(&self, name: &str) -> Result<&ChatTemplate> {
        self.templates
            .get(name)
            .map(Arc::as_ref)
            .ok_or_else(|| Error::not_found(name))
    }

    /// Get a shared handle to a template by name.
    #[must_use]
    pub fn get_arc(&self, name: &str) -> Option<Arc<ChatTemplate>> {
        self.templates.get(name).map(Arc::clone)
    }

    /// Check if a template with the given name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Number of registered templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Registered template names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.templates.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Iterate over all registered templates in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &ChatTemplate> {
        self.templates.values().map(Arc::as_ref)
    }
}

impl Extend<ChatTemplate> for TemplateRegistry {
    fn extend<I: IntoIterator<Item = ChatTemplate>>(&mut self, iter: I) {
        for template in iter {
            self.register(template);
        }
    }
}

impl FromIterator<ChatTemplate> for TemplateRegistry {
    fn from_iter<I: IntoIterator<Item = ChatTemplate>>(iter: I) -> Self {
        let mut registry = Self::new();
        registry.extend(iter);
        registry
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn named(name: &str, user_prefix: &str) -> ChatTemplate {
        ChatTemplate::builder(name).user(user_prefix, "").build()
    }

    #[test]
    fn register_and_get_round_trip() {
        let mut registry = TemplateRegistry::new();
        let template = named("alpha", "A:");
        assert!(registry.register(template.clone()).is_none());

        assert_eq!(registry.get("alpha").unwrap(), &template);
        assert!(registry.contains("alpha"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn get_missing_is_not_found() {
        let registry = TemplateRegistry::new();
        let err = registry.get("nope").unwrap_err();
        assert!(matches!(err, Error::TemplateNotFound(ref name) if name == "nope"));
        assert!(registry.get_arc("nope").is_none());
    }

    #[test]
    fn register_overwrites_silently() {
        let mut registry = TemplateRegistry::new();
        registry.register(named("alpha", "first"));
        let replaced = registry.register(named("alpha", "second")).unwrap();

        assert_eq!(replaced.role_affixes("user").unwrap().prefix, "first");
        assert_eq!(registry.get("alpha").unwrap().role_affixes("user").unwrap().prefix, "second");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn try_register_rejects_duplicates() {
        let mut registry = TemplateRegistry::new();
        registry.try_register(named("alpha", "first")).unwrap();
        let err = registry.try_register(named("alpha", "second")).unwrap_err();

        assert!(matches!(err, Error::DuplicateTemplate(_)));
        assert_eq!(registry.get("alpha").unwrap().role_affixes("user").unwrap().prefix, "first");
    }

    #[test]
    fn names_are_sorted() {
        let registry: TemplateRegistry =
            [named("b", ""), named("c", ""), named("a", "")].into_iter().collect();
        assert_eq!(registry.names(), ["a", "b", "c"]);
        assert_eq!(registry.iter().count(), 3);
        assert!(!registry.is_empty());
    }
}
