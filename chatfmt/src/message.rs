//! Message types consumed by chat templates.
//!
//! A conversation is an ordered slice of [`Message`]s in the chat completion
//! API shape (`{"role": ..., "content": ...}`). Roles are open strings so that
//! templates can decorate roles beyond the three well-known ones.

use serde::{Deserialize, Serialize};

/// Well-known role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System message providing instructions.
    System,
    /// User message.
    User,
    /// Assistant (model) message.
    Assistant,
}

impl MessageRole {
    /// Get the string representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<MessageRole> for String {
    fn from(role: MessageRole) -> Self {
        role.as_str().to_owned()
    }
}

/// A single turn in a conversation.
///
/// `content: None` on a system message means "use the template's default
/// system prompt".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender.
    pub role: String,
    /// Text content of the message.
    #[serde(default)]
    pub content: Option<String>,
}

impl Message {
    /// Create a message with an arbitrary role.
    #[must_use]
    pub fn new(role: impl Into<String>, content: Option<String>) -> Self {
        Self {
            role: role.into(),
            content,
        }
    }

    /// Create a new system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, Some(content.into()))
    }

    /// Create a system message without content, asking for the template default.
    #[must_use]
    pub fn default_system() -> Self {
        Self::new(MessageRole::System, None)
    }

    /// Create a new user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, Some(content.into()))
    }

    /// Create a new assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, Some(content.into()))
    }

    /// Check whether this message has the given well-known role.
    #[must_use]
    pub fn is_role(&self, role: MessageRole) -> bool {
        self.role == role.as_str()
    }

    /// Get the text content, if any.
    #[must_use]
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }
}
