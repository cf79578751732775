//! Unified error types for chatfmt.
//!
//! Covers template lookup, registration conflicts, malformed conversations
//! and YAML template definitions.

/// Result type alias for chatfmt operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for chatfmt.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// No template is registered under the requested name.
    #[error("Chat template not found: {0}")]
    TemplateNotFound(String),

    /// A template with this name is already registered (strict registration only).
    #[error("Chat template '{0}' is already registered")]
    DuplicateTemplate(String),

    /// The template set has no `default` template to fall back on.
    #[error("No '{}' chat template registered", crate::DEFAULT_TEMPLATE)]
    MissingDefault,

    /// A non-system message carries no content.
    #[error("Message {index} with role '{role}' has no content")]
    InvalidMessage {
        /// Position of the offending message in the conversation.
        index: usize,
        /// Role of the offending message.
        role: String,
    },

    /// YAML template definition could not be parsed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Create a template-not-found error.
    #[must_use]
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::TemplateNotFound(name.into())
    }

    /// Create a duplicate-template error.
    #[must_use]
    pub fn duplicate(name: impl Into<String>) -> Self {
        Self::DuplicateTemplate(name.into())
    }

    /// Create an invalid-message error.
    #[must_use]
    pub fn invalid_message(index: usize, role: impl Into<String>) -> Self {
        Self::InvalidMessage {
            index,
            role: role.into(),
        }
    }

    /// Check if this error was caused by looking up an unknown template.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::TemplateNotFound(_))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn not_found_creates_error() {
        let err = Error::not_found("mystery");
        assert!(matches!(err, Error::TemplateNotFound(ref name) if name == "mystery"));
        assert!(err.is_not_found());
        assert!(err.to_string().contains("mystery"));
    }

    #[test]
    fn duplicate_creates_error() {
        let err = Error::duplicate("chatml");
        assert!(matches!(err, Error::DuplicateTemplate(_)));
        assert!(!err.is_not_found());
        assert!(err.to_string().contains("already registered"));
    }

    #[test]
    fn invalid_message_carries_position() {
        let err = Error::invalid_message(3, "user");
        assert!(matches!(err, Error::InvalidMessage { index: 3, .. }));
        assert_eq!(err.to_string(), "Message 3 with role 'user' has no content");
    }

    #[test]
    fn missing_default_names_template() {
        assert!(Error::MissingDefault.to_string().contains("'default'"));
    }

    #[test]
    fn from_yaml_error() {
        let yaml_err = serde_yaml::from_str::<i32>("[not, a, number]").unwrap_err();
        let err: Error = yaml_err.into();
        assert!(matches!(err, Error::Yaml(_)));
    }
}
