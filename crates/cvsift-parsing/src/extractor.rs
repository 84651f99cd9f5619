use std::collections::BTreeSet;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};

use cvsift_core::{CandidateRecord, EntityRecognizer, NOT_FOUND};

use crate::config::ParsingConfig;
use crate::{contact, education, experience, name, projects, skills};

/// One of the independent field extractors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Contact,
    Name,
    Skills,
    Education,
    Experience,
    Projects,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Field::Contact => "contact",
            Field::Name => "name",
            Field::Skills => "skills",
            Field::Education => "education",
            Field::Experience => "experience",
            Field::Projects => "projects",
        };
        f.write_str(s)
    }
}

/// A record plus the fields whose extractor failed and was degraded.
#[derive(Debug, Clone)]
pub struct FieldExtraction {
    pub record: CandidateRecord,
    pub failures: Vec<Field>,
}

/// The set of field extractors over a shared [`ParsingConfig`].
///
/// Every extractor reads the same text and nothing else; the recognizer is
/// only consulted for the name.
pub struct FieldExtractor {
    config: ParsingConfig,
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor {
    /// Create an extractor with the built-in vocabularies.
    pub fn new() -> Self {
        Self {
            config: ParsingConfig::default(),
        }
    }

    /// Create an extractor with a custom configuration.
    pub fn with_config(config: ParsingConfig) -> Self {
        Self { config }
    }

    /// Get a reference to the current config.
    pub fn config(&self) -> &ParsingConfig {
        &self.config
    }

    pub fn contact(&self, text: &str) -> (Vec<String>, Vec<String>) {
        contact::extract_contact(text)
    }

    pub fn name(&self, text: &str, recognizer: &dyn EntityRecognizer) -> String {
        name::extract_name(text, recognizer, &self.config.person_labels)
    }

    pub fn skills(&self, text: &str) -> BTreeSet<String> {
        skills::extract_skills(text, &self.config.skills)
    }

    pub fn education(&self, text: &str) -> Vec<String> {
        education::extract_education(
            text,
            &self.config.education_keywords,
            &self.config.education_separator,
            self.config.education_window,
        )
    }

    pub fn experience(&self, text: &str) -> Vec<String> {
        experience::extract_experience(text, &self.config.experience_keywords)
    }

    pub fn projects(&self, text: &str) -> Vec<String> {
        projects::extract_projects(
            text,
            &self.config.project_keywords,
            self.config.project_strategy,
        )
    }

    /// Run every extractor and assemble the record, ignoring failures.
    pub fn extract_record(&self, text: &str, recognizer: &dyn EntityRecognizer) -> CandidateRecord {
        self.extract_all(text, recognizer).record
    }

    /// Run every extractor, each behind its own failure boundary.
    ///
    /// An extractor that panics yields its empty value (or [`NOT_FOUND`] for
    /// the name) and is listed in `failures`; the others still run.
    pub fn extract_all(&self, text: &str, recognizer: &dyn EntityRecognizer) -> FieldExtraction {
        let mut failures = Vec::new();

        let (emails, phones) =
            isolated(Field::Contact, &mut failures, || self.contact(text)).unwrap_or_default();
        let name = isolated(Field::Name, &mut failures, || self.name(text, recognizer))
            .unwrap_or_else(|| NOT_FOUND.to_string());
        let skills =
            isolated(Field::Skills, &mut failures, || self.skills(text)).unwrap_or_default();
        let education =
            isolated(Field::Education, &mut failures, || self.education(text)).unwrap_or_default();
        let experience = isolated(Field::Experience, &mut failures, || self.experience(text))
            .unwrap_or_default();
        let projects =
            isolated(Field::Projects, &mut failures, || self.projects(text)).unwrap_or_default();

        tracing::debug!(
            emails = emails.len(),
            phones = phones.len(),
            skills = skills.len(),
            education = education.len(),
            experience = experience.len(),
            projects = projects.len(),
            failed = failures.len(),
            "field extraction complete"
        );

        FieldExtraction {
            record: CandidateRecord {
                name,
                emails,
                phones,
                skills,
                education,
                experience,
                projects,
            },
            failures,
        }
    }
}

fn isolated<T>(field: Field, failures: &mut Vec<Field>, f: impl FnOnce() -> T) -> Option<T> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => Some(value),
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            tracing::warn!(%field, error = %message, "field extractor failed, using empty result");
            failures.push(field);
            None
        }
    }
}
