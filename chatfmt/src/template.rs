//! Chat template records and their construction.
//!
//! A [`ChatTemplate`] is the set of per-role text decorations one model family
//! expects around each conversation turn, plus the stop strings and image
//! placeholder it declares. Templates are built in code with
//! [`ChatTemplate::builder`] or loaded from YAML:
//!
//! ```yaml
//! name: my-model
//! default_system_prompt: You are a helpful assistant.
//! role_prefix_and_suffix:
//!   system: { prefix: "<|system|>\n", suffix: "\n" }
//!   user: { prefix: "<|user|>\n", suffix: "\n" }
//!   assistant: { prefix: "<|assistant|>\n", suffix: "\n" }
//! stop_str: ["<|user|>"]
//! style: plain
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Image placeholder used when a template does not declare its own.
pub const DEFAULT_IMAGE_TOKEN: &str = "<image>";

/// Structural rules applied while assembling a prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatTemplateStyle {
    /// Every message is rendered as `prefix + content + suffix`.
    #[default]
    Plain,
    /// Llama-2 chat layout: the leading system block is nested inside the
    /// first `[INST]` user block.
    Llama2,
}

/// Text emitted before and after a message of one role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAffixes {
    /// Text placed before the message content.
    #[serde(default)]
    pub prefix: String,
    /// Text placed after the message content.
    #[serde(default)]
    pub suffix: String,
}

impl RoleAffixes {
    /// Create a prefix/suffix pair.
    #[must_use]
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }
}

impl<P: Into<String>, S: Into<String>> From<(P, S)> for RoleAffixes {
    fn from((prefix, suffix): (P, S)) -> Self {
        Self::new(prefix, suffix)
    }
}

/// Formatting rules for one model family.
///
/// Immutable once built; registries hand out shared references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTemplate {
    pub(crate) name: String,

    #[serde(default)]
    pub(crate) default_system_prompt: Option<String>,

    #[serde(default)]
    pub(crate) role_prefix_and_suffix: HashMap<String, RoleAffixes>,

    #[serde(default)]
    pub(crate) stop_str: Vec<String>,

    #[serde(default = "default_image_token")]
    pub(crate) image_token: String,

    #[serde(default)]
    pub(crate) style: ChatTemplateStyle,
}

fn default_image_token() -> String {
    DEFAULT_IMAGE_TOKEN.to_owned()
}

impl ChatTemplate {
    /// Create a builder for a template with the given name.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> ChatTemplateBuilder {
        ChatTemplateBuilder::new(name)
    }

    /// Load a single template from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or doesn't match
    /// the expected schema.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load a list of templates from a YAML sequence.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or any entry doesn't match
    /// the expected schema.
    pub fn list_from_yaml(yaml: &str) -> Result<Vec<Self>> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Unique registry key of this template.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// System prompt substituted for a system message without content.
    #[must_use]
    pub fn default_system_prompt(&self) -> Option<&str> {
        self.default_system_prompt.as_deref()
    }

    /// Strings at which the generation loop should stop.
    ///
    /// Declared only; nothing in this crate enforces them.
    #[must_use]
    pub fn stop_str(&self) -> &[String] {
        &self.stop_str
    }

    /// Placeholder callers insert where an image belongs.
    #[must_use]
    pub fn image_token(&self) -> &str {
        &self.image_token
    }

    /// Structural rules used during assembly.
    #[must_use]
    pub const fn style(&self) -> ChatTemplateStyle {
        self.style
    }

    /// Prefix/suffix declared for `role`, if any.
    #[must_use]
    pub fn role_affixes(&self, role: &str) -> Option<&RoleAffixes> {
        self.role_prefix_and_suffix.get(role)
    }
}

/// Builder for constructing a [`ChatTemplate`].
#[derive(Debug, Clone)]
pub struct ChatTemplateBuilder {
    template: ChatTemplate,
}

impl ChatTemplateBuilder {
    /// Create a new builder with no role decorations.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            template: ChatTemplate {
                name: name.into(),
                default_system_prompt: None,
                role_prefix_and_suffix: HashMap::new(),
                stop_str: Vec::new(),
                image_token: default_image_token(),
                style: ChatTemplateStyle::Plain,
            },
        }
    }

    /// Set the default system prompt.
    #[must_use]
    pub fn default_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.template.default_system_prompt = Some(prompt.into());
        self
    }

    /// Set the prefix and suffix for an arbitrary role.
    #[must_use]
    pub fn role(
        mut self,
        role: impl Into<String>,
        prefix: impl Into<String>,
        suffix: impl Into<String>,
    ) -> Self {
        self.template
            .role_prefix_and_suffix
            .insert(role.into(), RoleAffixes::new(prefix, suffix));
        self
    }

    /// Set the system prefix and suffix.
    #[must_use]
    pub fn system(self, prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        self.role(crate::MessageRole::System, prefix, suffix)
    }

    /// Set the user prefix and suffix.
    #[must_use]
    pub fn user(self, prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        self.role(crate::MessageRole::User, prefix, suffix)
    }

    /// Set the assistant prefix and suffix.
    #[must_use]
    pub fn assistant(self, prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        self.role(crate::MessageRole::Assistant, prefix, suffix)
    }

    /// Set the stop strings, replacing any set before.
    #[must_use]
    pub fn stop_str<I, S>(mut self, stops: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.template.stop_str = stops.into_iter().map(Into::into).collect();
        self
    }

    /// Set the image placeholder token.
    #[must_use]
    pub fn image_token(mut self, token: impl Into<String>) -> Self {
        self.template.image_token = token.into();
        self
    }

    /// Set the assembly style.
    #[must_use]
    pub const fn style(mut self, style: ChatTemplateStyle) -> Self {
        self.template.style = style;
        self
    }

    /// Build the final [`ChatTemplate`].
    #[must_use]
    pub fn build(self) -> ChatTemplate {
        self.template
    }
}
