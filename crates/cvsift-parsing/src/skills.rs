use std::collections::BTreeSet;

use crate::config::SkillPattern;

/// Vocabulary terms that occur in `text` as whole words, ignoring case.
///
/// Each term is reported once, spelled as in the vocabulary, however many
/// times it appears.
pub fn extract_skills(text: &str, vocabulary: &[SkillPattern]) -> BTreeSet<String> {
    vocabulary
        .iter()
        .filter(|p| p.is_match(text))
        .map(|p| p.term().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParsingConfig;

    fn vocab(terms: &[&str]) -> Vec<SkillPattern> {
        terms.iter().map(|t| SkillPattern::new(t).unwrap()).collect()
    }

    #[test]
    fn whole_word_case_insensitive() {
        let skills = extract_skills(
            "Skilled in python, SQL and machine learning.",
            &ParsingConfig::default().skills,
        );
        let expected: BTreeSet<String> = ["Python", "SQL", "Machine Learning"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(skills, expected);
    }

    #[test]
    fn partial_words_do_not_match() {
        let skills = extract_skills("JavaScript developer, Gitlab user", &vocab(&["Java", "Git"]));
        assert!(skills.is_empty());
    }

    #[test]
    fn repeated_term_reported_once() {
        let skills = extract_skills("Docker\ndocker\nDOCKER compose", &vocab(&["Docker"]));
        assert_eq!(skills.len(), 1);
        assert!(skills.contains("Docker"));
    }

    #[test]
    fn set_is_stable_across_runs() {
        let config = ParsingConfig::default();
        let text = "AWS, Git, Excel, Tableau, Power BI";
        assert_eq!(
            extract_skills(text, &config.skills),
            extract_skills(text, &config.skills)
        );
    }

    #[test]
    fn synthetic_vocabulary() {
        let skills = extract_skills("Fluent in Klingon and Esperanto", &vocab(&["klingon", "Latin"]));
        assert_eq!(skills.into_iter().collect::<Vec<_>>(), vec!["klingon"]);
    }
}
