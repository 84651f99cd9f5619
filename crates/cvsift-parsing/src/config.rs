use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::ParsingError;

/// Reference vocabulary for the skills extractor.
pub const DEFAULT_SKILLS: &[&str] = &[
    "Python",
    "Java",
    "C++",
    "SQL",
    "JavaScript",
    "HTML",
    "CSS",
    "Machine Learning",
    "Deep Learning",
    "TensorFlow",
    "PyTorch",
    "Excel",
    "Power BI",
    "Tableau",
    "Data Analysis",
    "Data Science",
    "Communication",
    "Leadership",
    "Project Management",
    "Cloud",
    "AWS",
    "Docker",
    "Git",
];

/// Degree names, institution types and grade levels.
pub const DEFAULT_EDUCATION_KEYWORDS: &[&str] = &[
    "Bachelor",
    "Master",
    "B.Tech",
    "M.Tech",
    "B.E",
    "MCA",
    "MBA",
    "PhD",
    "High School",
    "School",
    "University",
    "College",
    "BCA",
    "B.Sc",
    "M.Sc",
    "10th",
    "12th",
];

pub const DEFAULT_EXPERIENCE_KEYWORDS: &[&str] = &[
    "experience",
    "internship",
    "worked at",
    "project",
    "responsibilities",
    "role",
    "designation",
];

/// Compared as-is against the lower-cased line, so entries should be lower case.
pub const DEFAULT_PROJECT_KEYWORDS: &[&str] = &[
    "project",
    "projects",
    "worked on",
    "built",
    "developed",
    "designed",
    "created",
    "implemented",
    "led",
    "contributed",
    "deployed",
    "engineered",
];

/// Entity labels treated as person names.
pub const DEFAULT_PERSON_LABELS: &[&str] = &["PERSON", "PER"];

pub const DEFAULT_EDUCATION_SEPARATOR: &str = " | ";

/// Number of lines following an education keyword line that join its entry.
pub const DEFAULT_EDUCATION_WINDOW: usize = 2;

static DEFAULT_SKILL_PATTERNS: Lazy<Vec<SkillPattern>> = Lazy::new(|| {
    DEFAULT_SKILLS
        .iter()
        .map(|s| SkillPattern::new(s).unwrap())
        .collect()
});

/// Controls how a list of values is overridden from its defaults.
#[derive(Debug, Clone, Default)]
pub enum ListOverride<T> {
    /// Use the built-in defaults.
    #[default]
    Default,
    /// Completely replace the defaults with these values.
    Replace(Vec<T>),
    /// Append these values to the defaults.
    Extend(Vec<T>),
}

impl<T: Clone> ListOverride<T> {
    /// Resolve this override against the given defaults.
    pub fn resolve(&self, defaults: &[T]) -> Vec<T> {
        match self {
            ListOverride::Default => defaults.to_vec(),
            ListOverride::Replace(v) => v.clone(),
            ListOverride::Extend(v) => {
                let mut result = defaults.to_vec();
                result.extend(v.iter().cloned());
                result
            }
        }
    }
}

impl ListOverride<String> {
    /// Build an override from an optional replacement list and an optional
    /// extension list, the shape used by the TOML config file.
    ///
    /// A replacement takes precedence; extras are then appended to it.
    pub fn from_parts(replace: Option<Vec<String>>, extend: Option<Vec<String>>) -> Self {
        match (replace, extend) {
            (Some(mut r), Some(e)) => {
                r.extend(e);
                ListOverride::Replace(r)
            }
            (Some(r), None) => ListOverride::Replace(r),
            (None, Some(e)) => ListOverride::Extend(e),
            (None, None) => ListOverride::Default,
        }
    }
}

fn owned_defaults(defaults: &[&str]) -> Vec<String> {
    defaults.iter().map(|s| s.to_string()).collect()
}

/// How project lines are collected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProjectStrategy {
    /// Every line containing a project keyword, on its own.
    #[default]
    SingleLine,
    /// A keyword line opens a block; following non-blank lines are collected
    /// until a blank line closes it.
    Windowed,
}

impl FromStr for ProjectStrategy {
    type Err = ParsingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "single_line" | "single" | "line" => Ok(Self::SingleLine),
            "windowed" | "window" | "block" => Ok(Self::Windowed),
            other => Err(ParsingError::UnknownProjectStrategy(other.to_string())),
        }
    }
}

/// A skill term together with its compiled whole-word matcher.
#[derive(Debug, Clone)]
pub struct SkillPattern {
    term: String,
    re: Regex,
}

impl SkillPattern {
    /// Compile a case-insensitive, whole-word matcher for `term`.
    ///
    /// Word boundaries are only asserted at edges that are word characters,
    /// so terms like `C++` can still match before punctuation.
    pub fn new(term: &str) -> Result<Self, ParsingError> {
        let is_word = |c: Option<char>| c.is_some_and(|c| c.is_alphanumeric() || c == '_');
        let lead = if is_word(term.chars().next()) { r"\b" } else { "" };
        let trail = if is_word(term.chars().last()) { r"\b" } else { "" };
        let pattern = format!("(?i){lead}{}{trail}", regex::escape(term));
        let re = Regex::new(&pattern).map_err(|source| ParsingError::InvalidVocabulary {
            term: term.to_string(),
            source,
        })?;
        Ok(Self {
            term: term.to_string(),
            re,
        })
    }

    /// The term as spelled in the vocabulary.
    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.re.is_match(text)
    }
}

/// Configuration for the field extractors.
///
/// Vocabularies are resolved at build time; keyword lists for the
/// case-insensitive line matchers are stored lower-cased.
/// Use [`ParsingConfigBuilder`] to override any of them.
#[derive(Debug, Clone)]
pub struct ParsingConfig {
    pub(crate) skills: Vec<SkillPattern>,
    pub(crate) education_keywords: Vec<String>,
    pub(crate) education_separator: String,
    pub(crate) education_window: usize,
    pub(crate) experience_keywords: Vec<String>,
    pub(crate) project_keywords: Vec<String>,
    pub(crate) project_strategy: ProjectStrategy,
    pub(crate) person_labels: Vec<String>,
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            skills: DEFAULT_SKILL_PATTERNS.clone(),
            education_keywords: lowercase_all(&owned_defaults(DEFAULT_EDUCATION_KEYWORDS)),
            education_separator: DEFAULT_EDUCATION_SEPARATOR.to_string(),
            education_window: DEFAULT_EDUCATION_WINDOW,
            experience_keywords: lowercase_all(&owned_defaults(DEFAULT_EXPERIENCE_KEYWORDS)),
            project_keywords: owned_defaults(DEFAULT_PROJECT_KEYWORDS),
            project_strategy: ProjectStrategy::SingleLine,
            person_labels: owned_defaults(DEFAULT_PERSON_LABELS),
        }
    }
}

impl ParsingConfig {
    pub fn skill_terms(&self) -> impl Iterator<Item = &str> {
        self.skills.iter().map(SkillPattern::term)
    }

    pub fn education_keywords(&self) -> &[String] {
        &self.education_keywords
    }

    pub fn experience_keywords(&self) -> &[String] {
        &self.experience_keywords
    }

    pub fn project_keywords(&self) -> &[String] {
        &self.project_keywords
    }

    pub fn project_strategy(&self) -> ProjectStrategy {
        self.project_strategy
    }

    pub fn person_labels(&self) -> &[String] {
        &self.person_labels
    }
}

fn lowercase_all(words: &[String]) -> Vec<String> {
    words.iter().map(|w| w.to_lowercase()).collect()
}

/// Drop blank entries; a blank keyword would match every line.
fn non_blank(words: Vec<String>) -> Vec<String> {
    words.into_iter().filter(|w| !w.trim().is_empty()).collect()
}

/// Builder for [`ParsingConfig`].
///
/// Skill terms are compiled to regexes in [`build()`](Self::build), which
/// fails fast if a term cannot be compiled.
#[derive(Debug, Clone, Default)]
pub struct ParsingConfigBuilder {
    skills: ListOverride<String>,
    education_keywords: ListOverride<String>,
    education_separator: Option<String>,
    education_window: Option<usize>,
    experience_keywords: ListOverride<String>,
    project_keywords: ListOverride<String>,
    project_strategy: Option<ProjectStrategy>,
    person_labels: ListOverride<String>,
}

impl ParsingConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Skills ──

    pub fn skills(mut self, skills: ListOverride<String>) -> Self {
        self.skills = skills;
        self
    }

    pub fn set_skills(self, skills: Vec<String>) -> Self {
        self.skills(ListOverride::Replace(skills))
    }

    pub fn add_skill(mut self, skill: String) -> Self {
        match &mut self.skills {
            ListOverride::Extend(v) | ListOverride::Replace(v) => v.push(skill),
            ListOverride::Default => self.skills = ListOverride::Extend(vec![skill]),
        }
        self
    }

    // ── Education ──

    pub fn education_keywords(mut self, keywords: ListOverride<String>) -> Self {
        self.education_keywords = keywords;
        self
    }

    pub fn education_separator(mut self, separator: &str) -> Self {
        self.education_separator = Some(separator.to_string());
        self
    }

    pub fn education_window(mut self, lines: usize) -> Self {
        self.education_window = Some(lines);
        self
    }

    // ── Experience / projects ──

    pub fn experience_keywords(mut self, keywords: ListOverride<String>) -> Self {
        self.experience_keywords = keywords;
        self
    }

    pub fn project_keywords(mut self, keywords: ListOverride<String>) -> Self {
        self.project_keywords = keywords;
        self
    }

    pub fn project_strategy(mut self, strategy: ProjectStrategy) -> Self {
        self.project_strategy = Some(strategy);
        self
    }

    // ── Name ──

    pub fn person_labels(mut self, labels: ListOverride<String>) -> Self {
        self.person_labels = labels;
        self
    }

    /// Resolve every list against its defaults and compile skill matchers.
    pub fn build(self) -> Result<ParsingConfig, ParsingError> {
        let skills = match self.skills {
            ListOverride::Default => DEFAULT_SKILL_PATTERNS.clone(),
            other => non_blank(other.resolve(&owned_defaults(DEFAULT_SKILLS)))
                .iter()
                .map(|term| SkillPattern::new(term))
                .collect::<Result<Vec<_>, _>>()?,
        };

        Ok(ParsingConfig {
            skills,
            education_keywords: lowercase_all(&non_blank(
                self.education_keywords
                    .resolve(&owned_defaults(DEFAULT_EDUCATION_KEYWORDS)),
            )),
            education_separator: self
                .education_separator
                .unwrap_or_else(|| DEFAULT_EDUCATION_SEPARATOR.to_string()),
            education_window: self.education_window.unwrap_or(DEFAULT_EDUCATION_WINDOW),
            experience_keywords: lowercase_all(&non_blank(
                self.experience_keywords
                    .resolve(&owned_defaults(DEFAULT_EXPERIENCE_KEYWORDS)),
            )),
            project_keywords: non_blank(
                self.project_keywords
                    .resolve(&owned_defaults(DEFAULT_PROJECT_KEYWORDS)),
            ),
            project_strategy: self.project_strategy.unwrap_or_default(),
            person_labels: non_blank(
                self.person_labels
                    .resolve(&owned_defaults(DEFAULT_PERSON_LABELS)),
            ),
        })
    }
}
