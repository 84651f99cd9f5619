use thiserror::Error;

pub mod config;
pub mod contact;
pub mod education;
pub mod experience;
pub mod extractor;
pub mod name;
pub mod projects;
pub mod skills;

pub use config::{ListOverride, ParsingConfig, ParsingConfigBuilder, ProjectStrategy};
pub use extractor::{Field, FieldExtraction, FieldExtractor};
// Re-export domain types from core (canonical definitions live there)
pub use cvsift_core::{CandidateRecord, EntityRecognizer, EntitySpan, NOT_FOUND};

#[derive(Error, Debug)]
pub enum ParsingError {
    #[error("invalid vocabulary term {term:?}: {source}")]
    InvalidVocabulary {
        term: String,
        #[source]
        source: regex::Error,
    },
    #[error("unknown project strategy: {0}")]
    UnknownProjectStrategy(String),
}

/// Lines of `text` as the line-oriented extractors see them.
pub(crate) fn lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n')
}

/// Whether the lower-cased `line` contains any of `keywords` verbatim.
pub(crate) fn contains_any(line_lower: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|kw| line_lower.contains(kw.as_str()))
}
