use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

pub mod backend;
pub mod config_file;
pub mod ner;
pub mod ocr;

// Re-export for convenience
pub use backend::{BackendError, PageImage, PdfBackend};
pub use ner::{EntityRecognizer, EntitySpan, NerError, NullRecognizer};
pub use ocr::{OcrEngine, OcrError};

/// Placeholder rendered for any field that could not be extracted.
pub const NOT_FOUND: &str = "Not Found";

/// Structured candidate information extracted from one resume.
///
/// Absence is never an error: the name falls back to [`NOT_FOUND`] and every
/// other field to an empty container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub name: String,
    /// Every email occurrence in document order, duplicates included.
    pub emails: Vec<String>,
    /// Every phone-like match in document order.
    pub phones: Vec<String>,
    /// Matched vocabulary terms; ordering carries no meaning.
    pub skills: BTreeSet<String>,
    pub education: Vec<String>,
    pub experience: Vec<String>,
    pub projects: Vec<String>,
}

impl CandidateRecord {
    /// A record with every field at its "not found" value.
    pub fn empty() -> Self {
        Self {
            name: NOT_FOUND.to_string(),
            emails: Vec::new(),
            phones: Vec::new(),
            skills: BTreeSet::new(),
            education: Vec::new(),
            experience: Vec::new(),
            projects: Vec::new(),
        }
    }

    /// Whether the name was resolved to something other than the sentinel.
    pub fn has_name(&self) -> bool {
        self.name != NOT_FOUND
    }
}

impl Default for CandidateRecord {
    fn default() -> Self {
        Self::empty()
    }
}

/// Collapse whitespace-only text to the empty string.
///
/// Downstream code treats `""` as "no text could be acquired", so text made
/// only of spaces and newlines must not leak past acquisition.
pub fn normalize_text(text: String) -> String {
    if text.trim().is_empty() {
        String::new()
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_record_uses_sentinel_name() {
        let record = CandidateRecord::empty();
        assert_eq!(record.name, "Not Found");
        assert!(!record.has_name());
        assert!(record.emails.is_empty());
        assert!(record.skills.is_empty());
        assert!(record.projects.is_empty());
    }

    #[test]
    fn normalize_whitespace_only() {
        assert_eq!(normalize_text(" \n\t \n".to_string()), "");
        assert_eq!(normalize_text(String::new()), "");
        assert_eq!(normalize_text("  Jane\n".to_string()), "  Jane\n");
    }

    #[test]
    fn record_serializes_skills_as_list() {
        let mut record = CandidateRecord::empty();
        record.skills.insert("Rust".to_string());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["skills"], serde_json::json!(["Rust"]));
        assert_eq!(json["name"], "Not Found");
    }
}
