//! The frozen template set: registry plus resolver plus fallback.
//!
//! Registration only happens on [`ChatTemplatesBuilder`]. Once built, a
//! [`ChatTemplates`] is read-only and can be shared between threads freely.
//!
//! # Example
//!
//! ```rust,ignore
//! use chatfmt::{ChatTemplates, Message};
//!
//! let templates = ChatTemplates::builtin();
//! let template = templates.resolve_template("meta-llama/Llama-2-7b-chat-hf", None);
//! let prompt = template.assemble(&[Message::user("Hello!")])?;
//! ```

use std::sync::{Arc, LazyLock};

use tracing::debug;

use crate::DEFAULT_TEMPLATE;
use crate::error::{Error, Result};
use crate::registry::TemplateRegistry;
use crate::resolver::{Matcher, TemplateResolver};
use crate::template::ChatTemplate;

static BUILTIN: LazyLock<ChatTemplates> = LazyLock::new(ChatTemplates::builtin);

/// Process-wide built-in template set, built on first use.
#[must_use]
pub fn global() -> &'static ChatTemplates {
    &BUILTIN
}

/// Look up a built-in template by name.
///
/// # Errors
///
/// Returns [`Error::TemplateNotFound`] if no built-in template has this name.
pub fn get_template(name: &str) -> Result<&'static ChatTemplate> {
    global().get_template(name)
}

/// Pick the built-in template for a model, falling back to `default`.
#[must_use]
pub fn resolve_template(model_path: &str, model_id: Option<&str>) -> &'static ChatTemplate {
    global().resolve_template(model_path, model_id)
}

/// Templates, the matcher chain that selects among them, and the fallback.
#[derive(Debug, Clone)]
pub struct ChatTemplates {
    registry: TemplateRegistry,
    resolver: TemplateResolver,
    fallback: Arc<ChatTemplate>,
}

impl ChatTemplates {
    /// Create a builder with no templates or matchers.
    #[must_use]
    pub fn builder() -> ChatTemplatesBuilder {
        ChatTemplatesBuilder::new()
    }

    /// Create a builder preloaded with the built-in templates and matchers.
    ///
    /// Matchers added afterwards run after the built-in ones.
    #[must_use]
    pub fn builder_with_builtins() -> ChatTemplatesBuilder {
        ChatTemplatesBuilder::new()
            .templates(crate::builtin::templates())
            .matchers(crate::builtin::matchers())
    }

    /// The built-in template set.
    ///
    /// # Panics
    ///
    /// Never in practice: the built-in table always contains `default`.
    #[must_use]
    pub fn builtin() -> Self {
        Self::builder_with_builtins()
            .build()
            .expect("built-in templates include the default template")
    }

    /// Look up a template by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TemplateNotFound`] if no template has this name.
    pub fn get_template(&self, name: &str) -> Result<&ChatTemplate> {
        self.registry.get(name)
    }

    /// Pick the template for a model.
    ///
    /// Never fails: when no matcher recognises the model the `default`
    /// template is returned.
    #[must_use]
    pub fn resolve_template(&self, model_path: &str, model_id: Option<&str>) -> &ChatTemplate {
        self.resolver
            .resolve(&self.registry, model_path, model_id)
            .unwrap_or_else(|| {
                debug!(model_path, ?model_id, "No chat template matched, using default");
                self.fallback.as_ref()
            })
    }

    /// The underlying registry.
    #[must_use]
    pub const fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    /// The underlying matcher chain.
    #[must_use]
    pub const fn resolver(&self) -> &TemplateResolver {
        &self.resolver
    }

    /// The template returned when nothing matches.
    #[must_use]
    pub fn fallback(&self) -> &ChatTemplate {
        &self.fallback
    }
}

impl Default for ChatTemplates {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Builder for a [`ChatTemplates`] set.
///
/// Templates are last-write-wins unless [`strict`](Self::strict) is enabled.
/// Matchers keep their registration order.
#[derive(Debug, Clone, Default)]
pub struct ChatTemplatesBuilder {
    templates: Vec<ChatTemplate>,
    matchers: Vec<Matcher>,
    strict: bool,
}

impl ChatTemplatesBuilder {
    /// Create a new empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a template.
    #[must_use]
    pub fn template(mut self, template: ChatTemplate) -> Self {
        self.templates.push(template);
        self
    }

    /// Register several templates in order.
    #[must_use]
    pub fn templates(mut self, templates: impl IntoIterator<Item = ChatTemplate>) -> Self {
        self.templates.extend(templates);
        self
    }

    /// Register templates from a YAML sequence of template definitions.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or doesn't match
    /// the template schema.
    pub fn templates_from_yaml(self, yaml: &str) -> Result<Self> {
        Ok(self.templates(ChatTemplate::list_from_yaml(yaml)?))
    }

    /// Append a matcher to the chain.
    #[must_use]
    pub fn matcher(mut self, matcher: Matcher) -> Self {
        self.matchers.push(matcher);
        self
    }

    /// Append several matchers to the chain in order.
    #[must_use]
    pub fn matchers(mut self, matchers: impl IntoIterator<Item = Matcher>) -> Self {
        self.matchers.extend(matchers);
        self
    }

    /// Reject duplicate template names instead of overwriting.
    #[must_use]
    pub const fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Freeze the set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateTemplate`] in strict mode when two templates
    /// share a name, and [`Error::MissingDefault`] when no `default` template
    /// was registered.
    pub fn build(self) -> Result<ChatTemplates> {
        let mut registry = TemplateRegistry::new();
        for template in self.templates {
            if self.strict {
                registry.try_register(template)?;
            } else {
                registry.register(template);
            }
        }

        let fallback = registry
            .get_arc(DEFAULT_TEMPLATE)
            .ok_or(Error::MissingDefault)?;

        debug!(
            templates = registry.len(),
            matchers = self.matchers.len(),
            "Chat template set built"
        );

        Ok(ChatTemplates {
            registry,
            resolver: self.matchers.into_iter().collect(),
            fallback,
        })
    }
}
