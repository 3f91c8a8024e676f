//! Prompt templates and rendering.
//!
//! A template is free text with exactly one `{user_input}` slot. Rendering
//! substitutes the raw user input verbatim: no escaping, no trimming. Other
//! brace pairs (JSON snippets, examples) are left untouched.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::persona::registry::PersonaId;
use crate::utilities::errors::ConfigurationError;

/// Name of the single substitution slot.
pub const USER_INPUT_SLOT: &str = "user_input";

static VARIABLE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_\-]*)\}").unwrap());

/// A validated persona prompt template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PromptTemplate {
    raw: String,
}

impl PromptTemplate {
    /// Validate `raw` as the template for `persona`.
    ///
    /// # Errors
    /// [`ConfigurationError::InvalidTemplate`] unless the slot occurs exactly once.
    pub fn new(persona: &str, raw: impl Into<String>) -> Result<Self, ConfigurationError> {
        let raw = raw.into();
        let found = count_slots(&raw);
        if found != 1 {
            return Err(ConfigurationError::InvalidTemplate {
                persona: persona.to_string(),
                found,
            });
        }
        Ok(Self { raw })
    }

    /// The template text as loaded.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Byte offset of the slot within the template.
    pub fn slot_offset(&self) -> usize {
        VARIABLE_PATTERN
            .find_iter(&self.raw)
            .find(|m| is_user_input(m.as_str()))
            .map(|m| m.start())
            .unwrap_or(0)
    }

    /// Substitute `user_input` into the slot.
    pub fn fill(&self, user_input: &str) -> String {
        let offset = self.slot_offset();
        let slot_len = USER_INPUT_SLOT.len() + 2;
        let mut out = String::with_capacity(self.raw.len() + user_input.len());
        out.push_str(&self.raw[..offset]);
        out.push_str(user_input);
        out.push_str(&self.raw[offset + slot_len..]);
        out
    }
}

fn is_user_input(placeholder: &str) -> bool {
    placeholder
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        == Some(USER_INPUT_SLOT)
}

fn count_slots(raw: &str) -> usize {
    VARIABLE_PATTERN
        .find_iter(raw)
        .filter(|m| is_user_input(m.as_str()))
        .count()
}

/// Final prompt text for one persona and one user input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedPrompt {
    /// Persona the prompt was rendered for.
    pub persona: PersonaId,
    /// Prompt text sent to the model.
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_requires_single_slot() {
        assert!(PromptTemplate::new("a", "Reply to: {user_input}").is_ok());

        let err = PromptTemplate::new("a", "No slot here").unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::InvalidTemplate { found: 0, .. }
        ));

        let err = PromptTemplate::new("a", "{user_input} and {user_input}").unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::InvalidTemplate { found: 2, .. }
        ));
    }

    #[test]
    fn test_fill_is_verbatim() {
        let template = PromptTemplate::new("a", "Situation:\n{user_input}\nAnswer:").unwrap();
        let input = "  <b>{weird}</b> \"quotes\" \n";
        assert_eq!(
            template.fill(input),
            format!("Situation:\n{}\nAnswer:", input)
        );
    }

    #[test]
    fn test_fill_leaves_other_braces_alone() {
        let template =
            PromptTemplate::new("a", r#"Return {"text": "..."} for {user_input} {tone}"#).unwrap();
        assert_eq!(
            template.fill("hello"),
            r#"Return {"text": "..."} for hello {tone}"#
        );
    }

    #[test]
    fn test_fill_at_slot_position() {
        let template = PromptTemplate::new("a", "前缀「{user_input}」后缀").unwrap();
        let rendered = template.fill("hello");
        assert_eq!(rendered.find("hello"), Some(template.slot_offset()));
    }

    #[test]
    fn test_input_containing_slot_text_is_not_expanded() {
        let template = PromptTemplate::new("a", "Q: {user_input}").unwrap();
        assert_eq!(template.fill("{user_input}"), "Q: {user_input}");
    }
}
