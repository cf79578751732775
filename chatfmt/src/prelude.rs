//! Prelude module for convenient imports.
//!
//! # Usage
//!
//! ```rust,ignore
//! use chatfmt::prelude::*;
//! ```

pub use crate::error::{Error, Result};
pub use crate::message::{Message, MessageRole};
pub use crate::registry::TemplateRegistry;
pub use crate::resolver::{Matcher, TemplateResolver};
pub use crate::template::{ChatTemplate, ChatTemplateBuilder, ChatTemplateStyle, RoleAffixes};
pub use crate::templates::{ChatTemplates, ChatTemplatesBuilder};
