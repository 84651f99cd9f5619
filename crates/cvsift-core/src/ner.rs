use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A labeled substring of the document text reported by a recognizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySpan {
    /// Semantic category, e.g. `PERSON` or `ORG`.
    pub label: String,
    pub text: String,
    /// Byte offset of the span in the annotated text.
    #[serde(default, alias = "start")]
    pub start_offset: usize,
}

impl EntitySpan {
    pub fn new(label: impl Into<String>, text: impl Into<String>, start_offset: usize) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
            start_offset,
        }
    }
}

#[derive(Error, Debug)]
pub enum NerError {
    #[error("recognizer not available: {0}")]
    Unavailable(String),
    #[error("recognizer failed: {0}")]
    Failed(String),
    #[error("malformed recognizer output: {0}")]
    MalformedOutput(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Named-entity recognition collaborator.
///
/// Constructed once and shared read-only between extractions, so
/// implementations must be safe to call concurrently.
pub trait EntityRecognizer: Send + Sync {
    /// Annotate `text`, returning spans in document order.
    fn annotate(&self, text: &str) -> Result<Vec<EntitySpan>, NerError>;
}

/// Recognizer that never finds anything.
///
/// With it, name extraction always takes the first-line fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRecognizer;

impl EntityRecognizer for NullRecognizer {
    fn annotate(&self, _text: &str) -> Result<Vec<EntitySpan>, NerError> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_deserializes_with_start_alias() {
        let span: EntitySpan =
            serde_json::from_str(r#"{"label":"PERSON","text":"Ada Lovelace","start":4}"#)
                .unwrap();
        assert_eq!(span, EntitySpan::new("PERSON", "Ada Lovelace", 4));
    }

    #[test]
    fn span_offset_defaults_to_zero() {
        let span: EntitySpan = serde_json::from_str(r#"{"label":"ORG","text":"ACME"}"#).unwrap();
        assert_eq!(span.start_offset, 0);
    }

    #[test]
    fn null_recognizer_is_empty() {
        assert!(NullRecognizer.annotate("Ada Lovelace").unwrap().is_empty());
    }
}
