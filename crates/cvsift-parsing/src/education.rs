use crate::{contains_any, lines};

/// Education entries, one per line that mentions an education keyword.
///
/// Degree, institution and dates usually sit on adjacent lines, so each entry
/// joins the matching line with up to `window` following lines (trimmed, even
/// if empty). Consecutive matching lines each produce their own, overlapping,
/// entry.
///
/// `keywords` must already be lower case.
pub fn extract_education(
    text: &str,
    keywords: &[String],
    separator: &str,
    window: usize,
) -> Vec<String> {
    let all: Vec<&str> = lines(text).collect();

    all.iter()
        .enumerate()
        .filter(|(_, line)| contains_any(&line.trim().to_lowercase(), keywords))
        .map(|(i, _)| {
            all[i..all.len().min(i + 1 + window)]
                .iter()
                .map(|l| l.trim())
                .collect::<Vec<_>>()
                .join(separator)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParsingConfig;

    fn extract(text: &str) -> Vec<String> {
        let config = ParsingConfig::default();
        extract_education(
            text,
            &config.education_keywords,
            &config.education_separator,
            config.education_window,
        )
    }

    #[test]
    fn joins_two_following_lines() {
        let entries = extract("Bachelor of Science\nABC University\n2020-2024");
        assert_eq!(entries[0], "Bachelor of Science | ABC University | 2020-2024");
    }

    #[test]
    fn overlapping_windows_are_kept() {
        let entries = extract("Bachelor of Science\nABC University\n2020-2024");
        assert_eq!(
            entries,
            vec![
                "Bachelor of Science | ABC University | 2020-2024",
                "ABC University | 2020-2024",
            ]
        );
    }

    #[test]
    fn window_truncated_at_end_of_text() {
        assert_eq!(extract("Skills\nMBA"), vec!["MBA"]);
    }

    #[test]
    fn empty_following_lines_are_included() {
        assert_eq!(
            extract("  PhD, Physics  \n\nETH Zurich"),
            vec!["PhD, Physics |  | ETH Zurich"]
        );
    }

    #[test]
    fn keyword_match_is_substring_and_case_insensitive() {
        // Both "high school" and "school" hit; still one entry for the line.
        let entries = extract("HIGH SCHOOL DIPLOMA");
        assert_eq!(entries, vec!["HIGH SCHOOL DIPLOMA"]);
    }

    #[test]
    fn no_keywords_no_entries() {
        assert!(extract("Jane Doe\nSoftware Engineer\nACME Corp").is_empty());
    }

    #[test]
    fn custom_separator_and_window() {
        let entries = extract_education(
            "Diploma\nInstitute\n2019\nextra",
            &["diploma".to_string()],
            " / ",
            1,
        );
        assert_eq!(entries, vec!["Diploma / Institute"]);
    }
}
