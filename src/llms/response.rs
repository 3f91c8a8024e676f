//! Response shapes returned by the text-generation service.
//!
//! The service answers either with a list of candidates, each holding a list
//! of content parts, or with a single flattened text field. Parts may be
//! non-text (thought signatures, function calls); those carry no `text` and
//! are skipped.

use serde::{Deserialize, Serialize};

/// Returned when a response carries no usable text.
pub const NO_CONTENT_APOLOGY: &str = "抱歉，无法获取回复内容。";

/// One fragment of a candidate's content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentPart {
    #[serde(default)]
    pub text: Option<String>,
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }
}

/// One candidate output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub parts: Vec<ContentPart>,
}

/// The shape of a single generation response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawResponse {
    /// Nested shape: candidates, each with content parts.
    Candidates(Vec<Candidate>),
    /// Flattened shape: one text field.
    FlatText(String),
    /// Nothing extractable.
    Empty,
}

impl RawResponse {
    /// Convenience for a single candidate with a single text part.
    pub fn single(text: impl Into<String>) -> Self {
        Self::Candidates(vec![Candidate {
            parts: vec![ContentPart::text(text)],
        }])
    }

    /// Text to show the user.
    ///
    /// Candidates win over flat text. All non-empty text parts across all
    /// candidates are joined in service order, then trimmed. A response whose
    /// text trims to nothing yields [`NO_CONTENT_APOLOGY`].
    pub fn extract_text(&self) -> String {
        let text = match self {
            Self::Candidates(candidates) => candidates
                .iter()
                .flat_map(|c| c.parts.iter())
                .filter_map(|p| p.text.as_deref())
                .filter(|t| !t.is_empty())
                .collect::<String>(),
            Self::FlatText(text) => text.clone(),
            Self::Empty => String::new(),
        };

        let trimmed = text.trim();
        if trimmed.is_empty() {
            NO_CONTENT_APOLOGY.to_string()
        } else {
            trimmed.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidates_concatenate_in_order() {
        let response = RawResponse::Candidates(vec![
            Candidate {
                parts: vec![
                    ContentPart::text("  Hello"),
                    ContentPart { text: None },
                    ContentPart::text(""),
                    ContentPart::text(", "),
                ],
            },
            Candidate {
                parts: vec![ContentPart::text("world!  \n")],
            },
        ]);
        assert_eq!(response.extract_text(), "Hello, world!");
    }

    #[test]
    fn test_flat_text_trimmed() {
        let response = RawResponse::FlatText("\n  reply \t".to_string());
        assert_eq!(response.extract_text(), "reply");
    }

    #[test]
    fn test_empty_shapes_apologize() {
        assert_eq!(RawResponse::Empty.extract_text(), NO_CONTENT_APOLOGY);
        assert_eq!(
            RawResponse::Candidates(vec![Candidate {
                parts: vec![ContentPart { text: None }]
            }])
            .extract_text(),
            NO_CONTENT_APOLOGY
        );
        assert_eq!(
            RawResponse::FlatText("   ".to_string()).extract_text(),
            NO_CONTENT_APOLOGY
        );
    }
}
