use cvsift_core::{EntityRecognizer, EntitySpan, NOT_FOUND};

use crate::lines;

/// Which path produced a candidate name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameSource {
    Entity,
    FirstLine,
    NotFound,
}

/// Extract the candidate name.
///
/// The person entity that starts earliest in `text` wins, regardless of its
/// length; spans with blank text are ignored. Without one, the first
/// non-empty line is used; failing both, the result is [`NOT_FOUND`]. A
/// recognizer error is treated like an empty annotation so the fallback still
/// runs.
pub fn extract_name(
    text: &str,
    recognizer: &dyn EntityRecognizer,
    person_labels: &[String],
) -> String {
    extract_name_with_source(text, recognizer, person_labels).0
}

/// Like [`extract_name`], also reporting which path produced the name.
pub fn extract_name_with_source(
    text: &str,
    recognizer: &dyn EntityRecognizer,
    person_labels: &[String],
) -> (String, NameSource) {
    let entities = match recognizer.annotate(text) {
        Ok(entities) => entities,
        Err(e) => {
            tracing::warn!(error = %e, "entity recognizer failed, using first-line fallback");
            Vec::new()
        }
    };

    if let Some(name) = first_person(&entities, person_labels) {
        return (name, NameSource::Entity);
    }

    match first_non_empty_line(text) {
        Some(line) => (line.to_string(), NameSource::FirstLine),
        None => (NOT_FOUND.to_string(), NameSource::NotFound),
    }
}

/// Trimmed text of the non-blank person span with the smallest start offset.
/// Equal offsets keep the recognizer's order.
fn first_person(entities: &[EntitySpan], person_labels: &[String]) -> Option<String> {
    entities
        .iter()
        .filter(|e| person_labels.iter().any(|l| l.eq_ignore_ascii_case(&e.label)))
        .filter(|e| !e.text.trim().is_empty())
        .min_by_key(|e| e.start_offset)
        .map(|e| e.text.trim().to_string())
}

fn first_non_empty_line(text: &str) -> Option<&str> {
    lines(text).map(str::trim).find(|l| !l.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cvsift_core::{NerError, NullRecognizer};

    struct Fixed(Vec<EntitySpan>);

    impl EntityRecognizer for Fixed {
        fn annotate(&self, _text: &str) -> Result<Vec<EntitySpan>, NerError> {
            Ok(self.0.clone())
        }
    }

    struct Failing;

    impl EntityRecognizer for Failing {
        fn annotate(&self, _text: &str) -> Result<Vec<EntitySpan>, NerError> {
            Err(NerError::Failed("model crashed".into()))
        }
    }

    fn labels() -> Vec<String> {
        vec!["PERSON".to_string(), "PER".to_string()]
    }

    #[test]
    fn entity_wins_over_first_line() {
        let text = "Curriculum Vitae\nJohn Smith\njohn@x.com";
        let ner = Fixed(vec![
            EntitySpan::new("ORG", "Curriculum", 0),
            EntitySpan::new("PERSON", "  John Smith ", 17),
        ]);
        let (name, source) = extract_name_with_source(text, &ner, &labels());
        assert_eq!(name, "John Smith");
        assert_eq!(source, NameSource::Entity);
    }

    #[test]
    fn first_person_wins_over_longer_later_one() {
        let ner = Fixed(vec![
            EntitySpan::new("PERSON", "Al", 0),
            EntitySpan::new("PERSON", "Alexandra Montgomery-Smythe", 40),
        ]);
        assert_eq!(extract_name("Al\n...", &ner, &labels()), "Al");
    }

    #[test]
    fn earliest_person_in_text_wins_over_reported_order() {
        let text = "Alice Candidate\nReferences\n...\nBob Referee";
        let ner = Fixed(vec![
            EntitySpan::new("PERSON", "Bob Referee", 50),
            EntitySpan::new("PERSON", "Alice Candidate", 0),
        ]);
        let (name, source) = extract_name_with_source(text, &ner, &labels());
        assert_eq!(name, "Alice Candidate");
        assert_eq!(source, NameSource::Entity);
    }

    #[test]
    fn equal_offsets_keep_recognizer_order() {
        // Offsets missing from recognizer output default to zero.
        let ner = Fixed(vec![
            EntitySpan::new("PER", "Grace Hopper", 0),
            EntitySpan::new("PERSON", "Alan Turing", 0),
        ]);
        assert_eq!(extract_name("x", &ner, &labels()), "Grace Hopper");
    }

    #[test]
    fn blank_person_span_is_ignored() {
        let ner = Fixed(vec![
            EntitySpan::new("PERSON", "   ", 0),
            EntitySpan::new("PERSON", "Jane Doe", 12),
        ]);
        assert_eq!(extract_name("x", &ner, &labels()), "Jane Doe");
    }

    #[test]
    fn fallback_skips_blank_lines() {
        let text = "\n   \n  Jane Doe  \nEngineer";
        let (name, source) = extract_name_with_source(text, &NullRecognizer, &labels());
        assert_eq!(name, "Jane Doe");
        assert_eq!(source, NameSource::FirstLine);
    }

    #[test]
    fn recognizer_error_falls_back() {
        assert_eq!(extract_name("Jane Doe\n", &Failing, &labels()), "Jane Doe");
    }

    #[test]
    fn nothing_found() {
        let (name, source) = extract_name_with_source(" \n\t\n", &NullRecognizer, &labels());
        assert_eq!(name, "Not Found");
        assert_eq!(source, NameSource::NotFound);
    }

    #[test]
    fn label_match_is_case_insensitive_and_configurable() {
        let ner = Fixed(vec![EntitySpan::new("per", "Ada", 0)]);
        assert_eq!(extract_name("x", &ner, &labels()), "Ada");
        assert_eq!(extract_name("x", &ner, &["NAME".to_string()]), "x");
    }
}
