use crate::{contains_any, lines};

/// Trimmed lines mentioning any experience keyword, in document order.
///
/// Matching is a case-insensitive substring test; `keywords` must already be
/// lower case.
pub fn extract_experience(text: &str, keywords: &[String]) -> Vec<String> {
    lines(text)
        .filter(|line| contains_any(&line.to_lowercase(), keywords))
        .map(|line| line.trim().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParsingConfig;

    fn extract(text: &str) -> Vec<String> {
        extract_experience(text, &ParsingConfig::default().experience_keywords)
    }

    #[test]
    fn keeps_matching_lines_in_order() {
        let text = "Jane Doe\n  Work Experience  \nACME Corp\nInternship at Initech\nRole: Analyst";
        assert_eq!(
            extract(text),
            vec!["Work Experience", "Internship at Initech", "Role: Analyst"]
        );
    }

    #[test]
    fn substring_matches_inside_words() {
        // "role" inside "parole" counts; accepted heuristic limitation.
        assert_eq!(extract("Parole board liaison"), vec!["Parole board liaison"]);
    }

    #[test]
    fn duplicates_are_kept() {
        assert_eq!(extract("Project X\nProject X"), vec!["Project X", "Project X"]);
    }

    #[test]
    fn no_match() {
        assert!(extract("Jane Doe\njane@x.com").is_empty());
    }
}
