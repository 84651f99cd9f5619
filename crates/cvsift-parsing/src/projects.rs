use crate::config::ProjectStrategy;
use crate::lines;

/// Project lines according to `strategy`.
///
/// Keywords are compared as given against the lower-cased line, so they are
/// expected in lower case.
pub fn extract_projects(text: &str, keywords: &[String], strategy: ProjectStrategy) -> Vec<String> {
    match strategy {
        ProjectStrategy::SingleLine => single_line(text, keywords),
        ProjectStrategy::Windowed => windowed(text, keywords),
    }
}

fn mentions_project(line: &str, keywords: &[String]) -> bool {
    let lower = line.to_lowercase();
    keywords.iter().any(|kw| lower.contains(kw.as_str()))
}

fn single_line(text: &str, keywords: &[String]) -> Vec<String> {
    lines(text)
        .filter(|line| mentions_project(line, keywords))
        .map(|line| line.trim().to_string())
        .collect()
}

/// A keyword line opens a block that runs until the next blank line.
fn windowed(text: &str, keywords: &[String]) -> Vec<String> {
    let mut collected = Vec::new();
    let mut collecting = false;

    for line in lines(text) {
        if mentions_project(line, keywords) {
            collecting = true;
        }
        if !collecting {
            continue;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            collecting = false;
        } else {
            collected.push(trimmed.to_string());
        }
    }

    collected
}
