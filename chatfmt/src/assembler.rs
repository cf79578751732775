//! Prompt assembly: turning a conversation into one prompt string.

use std::borrow::Cow;

use tracing::trace;

use crate::error::{Error, Result};
use crate::message::{Message, MessageRole};
use crate::template::{ChatTemplate, ChatTemplateStyle};

impl ChatTemplate {
    /// Prefix and suffix for a message of `role` following `history`.
    ///
    /// `history` is every message before the current one, including system
    /// messages that were skipped for lack of content. Only the fused
    /// Llama-2 system prefix is allocated.
    #[must_use]
    pub fn prefix_and_suffix(
        &self,
        role: &str,
        history: &[Message],
    ) -> (Cow<'_, str>, Cow<'_, str>) {
        let (prefix, suffix) = self.affixes_or_empty(role);

        match self.style {
            ChatTemplateStyle::Llama2
                if role == MessageRole::System.as_str() && history.is_empty() =>
            {
                let (user_prefix, _) = self.affixes_or_empty(MessageRole::User.as_str());
                (Cow::Owned(format!("{user_prefix}{prefix}")), Cow::Borrowed(suffix))
            }
            ChatTemplateStyle::Llama2
                if role == MessageRole::User.as_str()
                    && matches!(history, [first] if first.content.is_some()) =>
            {
                // The user prefix already went out fused with the system block.
                (Cow::Borrowed(""), Cow::Borrowed(suffix))
            }
            ChatTemplateStyle::Llama2 | ChatTemplateStyle::Plain => {
                (Cow::Borrowed(prefix), Cow::Borrowed(suffix))
            }
        }
    }

    /// Render `messages` into a prompt string.
    ///
    /// A system message without content takes the template's default system
    /// prompt, and is dropped entirely when there is none.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMessage`] if a non-system message has no content.
    pub fn assemble(&self, messages: &[Message]) -> Result<String> {
        let mut prompt = String::new();
        self.assemble_into(messages, &mut prompt)?;
        Ok(prompt)
    }

    /// Render `messages`, appending to an existing buffer.
    ///
    /// On error the buffer may hold the segments rendered before the
    /// offending message.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMessage`] if a non-system message has no content.
    pub fn assemble_into(&self, messages: &[Message], prompt: &mut String) -> Result<()> {
        for (i, message) in messages.iter().enumerate() {
            let content = match message.content.as_deref() {
                Some(content) => content,
                None if message.is_role(MessageRole::System) => {
                    match self.default_system_prompt.as_deref() {
                        Some(default) => default,
                        None => continue,
                    }
                }
                None => return Err(Error::invalid_message(i, &message.role)),
            };

            let (prefix, suffix) = self.prefix_and_suffix(&message.role, &messages[..i]);
            trace!(template = %self.name, index = i, role = %message.role, "Rendering message");

            prompt.push_str(&prefix);
            prompt.push_str(content);
            prompt.push_str(&suffix);
        }
        Ok(())
    }

    fn affixes_or_empty(&self, role: &str) -> (&str, &str) {
        self.role_prefix_and_suffix
            .get(role)
            .map_or(("", ""), |a| (a.prefix.as_str(), a.suffix.as_str()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn affixes(
        prefix: &'static str,
        suffix: &'static str,
    ) -> (Cow<'static, str>, Cow<'static, str>) {
        (Cow::Borrowed(prefix), Cow::Borrowed(suffix))
    }

    fn tagged(style: ChatTemplateStyle) -> ChatTemplate {
        ChatTemplate::builder("tagged")
            .system("<S>", "</S>")
            .user("<U>", "</U>")
            .assistant("<A>", "</A>")
            .style(style)
            .build()
    }

    mod plain {
        use super::*;

        #[test]
        fn empty_conversation_is_empty_prompt() {
            assert_eq!(tagged(ChatTemplateStyle::Plain).assemble(&[]).unwrap(), "");
        }

        #[test]
        fn concatenates_each_segment() {
            let messages = [
                Message::system("sys"),
                Message::user("hi"),
                Message::assistant("hello"),
                Message::user("bye"),
            ];
            let prompt = tagged(ChatTemplateStyle::Plain).assemble(&messages).unwrap();
            assert_eq!(prompt, "<S>sys</S><U>hi</U><A>hello</A><U>bye</U>");
        }

        #[test]
        fn unknown_role_has_no_decoration() {
            let messages = [Message::new("tool", Some("42".into())), Message::user("ok")];
            let prompt = tagged(ChatTemplateStyle::Plain).assemble(&messages).unwrap();
            assert_eq!(prompt, "42<U>ok</U>");
        }

        #[test]
        fn default_system_prompt_is_substituted() {
            let template = ChatTemplate::builder("with-default")
                .default_system_prompt("Be nice.")
                .system("[", "]")
                .user("<", ">")
                .build();
            let prompt = template
                .assemble(&[Message::default_system(), Message::user("hi")])
                .unwrap();
            assert_eq!(prompt, "[Be nice.]<hi>");
        }

        #[test]
        fn system_without_any_content_is_skipped() {
            let messages = [Message::default_system(), Message::user("hi")];
            let prompt = tagged(ChatTemplateStyle::Plain).assemble(&messages).unwrap();
            assert_eq!(prompt, "<U>hi</U>");
        }

        #[test]
        fn explicit_empty_system_is_not_skipped() {
            let messages = [Message::system(""), Message::user("hi")];
            let prompt = tagged(ChatTemplateStyle::Plain).assemble(&messages).unwrap();
            assert_eq!(prompt, "<S></S><U>hi</U>");
        }

        #[test]
        fn plain_ignores_llama2_positions() {
            let template = tagged(ChatTemplateStyle::Plain);
            assert_eq!(
                template.prefix_and_suffix("system", &[]),
                affixes("<S>", "</S>")
            );
            assert_eq!(
                template.prefix_and_suffix("user", &[Message::system("x")]),
                affixes("<U>", "</U>")
            );
            assert!(matches!(
                template.prefix_and_suffix("user", &[]),
                (Cow::Borrowed(_), Cow::Borrowed(_))
            ));
        }

        #[test]
        fn non_system_without_content_is_rejected() {
            let messages = [Message::user("hi"), Message::new("assistant", None)];
            let err = tagged(ChatTemplateStyle::Plain).assemble(&messages).unwrap_err();
            assert!(matches!(err, Error::InvalidMessage { index: 1, ref role } if role == "assistant"));
        }

        #[test]
        fn assemble_into_appends() {
            let mut prompt = String::from(">>");
            tagged(ChatTemplateStyle::Plain)
                .assemble_into(&[Message::user("hi")], &mut prompt)
                .unwrap();
            assert_eq!(prompt, ">><U>hi</U>");
        }
    }

    mod llama2 {
        use super::*;

        #[test]
        fn leading_system_fuses_into_user_prefix() {
            let template = tagged(ChatTemplateStyle::Llama2);
            let (prefix, suffix) = template.prefix_and_suffix("system", &[]);
            assert!(matches!(prefix, Cow::Owned(_)));
            assert_eq!((prefix, suffix), affixes("<U><S>", "</S>"));
        }

        #[test]
        fn later_system_is_not_fused() {
            let template = tagged(ChatTemplateStyle::Llama2);
            assert_eq!(
                template.prefix_and_suffix("system", &[Message::user("x")]),
                affixes("<S>", "</S>")
            );
        }

        #[test]
        fn second_turn_user_drops_prefix() {
            let messages = [Message::system("sys"), Message::user("hi"), Message::assistant("yo")];
            let prompt = tagged(ChatTemplateStyle::Llama2).assemble(&messages).unwrap();
            assert_eq!(prompt, "<U><S>sys</S>hi</U><A>yo</A>");
        }

        #[test]
        fn user_after_absent_system_keeps_prefix() {
            let template = tagged(ChatTemplateStyle::Llama2);
            assert_eq!(
                template.prefix_and_suffix("user", &[Message::default_system()]),
                affixes("<U>", "</U>")
            );
        }

        #[test]
        fn only_the_second_message_is_affected() {
            let messages = [
                Message::system("sys"),
                Message::user("a"),
                Message::assistant("b"),
                Message::user("c"),
            ];
            let prompt = tagged(ChatTemplateStyle::Llama2).assemble(&messages).unwrap();
            assert_eq!(prompt, "<U><S>sys</S>a</U><A>b</A><U>c</U>");
        }

        #[test]
        fn first_user_turn_is_plain() {
            let messages = [Message::user("a"), Message::assistant("b")];
            let prompt = tagged(ChatTemplateStyle::Llama2).assemble(&messages).unwrap();
            assert_eq!(prompt, "<U>a</U><A>b</A>");
        }
    }
}
