//! chatfmt - chat templates for language-model backends.
//!
//! Different model families expect conversation turns wrapped in different
//! role markers. This crate holds those conventions as [`ChatTemplate`]s,
//! renders a [`Message`] list into a single prompt string, and picks the
//! right template from a model path or model id.
//!
//! # Example
//!
//! ```rust,ignore
//! use chatfmt::prelude::*;
//!
//! let template = chatfmt::resolve_template("meta-llama/Llama-2-7b-chat-hf", None);
//! let prompt = template.assemble(&[
//!     Message::default_system(),
//!     Message::user("Hello!"),
//! ])?;
//! assert_eq!(prompt, "[INST] Hello! [/INST]");
//! ```

mod assembler;
pub mod builtin;
pub mod error;
pub mod message;
pub mod prelude;
pub mod registry;
pub mod resolver;
pub mod template;
pub mod templates;

pub use error::{Error, Result};
pub use message::{Message, MessageRole};
pub use registry::TemplateRegistry;
pub use resolver::{Matcher, TemplateResolver};
pub use template::{ChatTemplate, ChatTemplateBuilder, ChatTemplateStyle, RoleAffixes};
pub use templates::{ChatTemplates, ChatTemplatesBuilder, get_template, global, resolve_template};

/// Name of the template used when no matcher recognises a model.
pub const DEFAULT_TEMPLATE: &str = builtin::names::DEFAULT;
