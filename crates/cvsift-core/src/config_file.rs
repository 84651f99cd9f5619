use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub vocabulary: Option<VocabularyConfig>,
    pub ocr: Option<OcrConfig>,
    pub ner: Option<NerConfig>,
    pub pipeline: Option<PipelineSection>,
}

/// Keyword lists. A plain list replaces the built-in defaults; an `*_extra`
/// list is appended to them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VocabularyConfig {
    pub skills: Option<Vec<String>>,
    pub skills_extra: Option<Vec<String>>,
    pub education: Option<Vec<String>>,
    pub education_extra: Option<Vec<String>>,
    pub experience: Option<Vec<String>>,
    pub experience_extra: Option<Vec<String>>,
    pub projects: Option<Vec<String>>,
    pub projects_extra: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcrConfig {
    pub enabled: Option<bool>,
    pub dpi: Option<u32>,
    pub language: Option<String>,
    pub concurrency: Option<usize>,
    pub tesseract_path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NerConfig {
    pub command: Option<String>,
    pub args: Option<Vec<String>>,
    /// Entity labels read as a person's name; replaces `PERSON`, `PER`.
    pub person_labels: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineSection {
    pub timeout_secs: Option<u64>,
    /// `"single_line"` (default) or `"windowed"`.
    pub project_strategy: Option<String>,
}

/// Platform config directory path: `<config_dir>/cvsift/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("cvsift").join("config.toml"))
}

/// Load config by cascading CWD `.cvsift.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".cvsift.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}

fn pick<S, T>(
    overlay: Option<&S>,
    base: Option<&S>,
    field: impl Fn(&S) -> Option<T>,
) -> Option<T> {
    overlay.and_then(&field).or_else(|| base.and_then(&field))
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let (bv, ov) = (base.vocabulary.as_ref(), overlay.vocabulary.as_ref());
    let (bo, oo) = (base.ocr.as_ref(), overlay.ocr.as_ref());
    let (bn, on) = (base.ner.as_ref(), overlay.ner.as_ref());
    let (bp, op) = (base.pipeline.as_ref(), overlay.pipeline.as_ref());

    ConfigFile {
        vocabulary: Some(VocabularyConfig {
            skills: pick(ov, bv, |v| v.skills.clone()),
            skills_extra: pick(ov, bv, |v| v.skills_extra.clone()),
            education: pick(ov, bv, |v| v.education.clone()),
            education_extra: pick(ov, bv, |v| v.education_extra.clone()),
            experience: pick(ov, bv, |v| v.experience.clone()),
            experience_extra: pick(ov, bv, |v| v.experience_extra.clone()),
            projects: pick(ov, bv, |v| v.projects.clone()),
            projects_extra: pick(ov, bv, |v| v.projects_extra.clone()),
        }),
        ocr: Some(OcrConfig {
            enabled: pick(oo, bo, |o| o.enabled),
            dpi: pick(oo, bo, |o| o.dpi),
            language: pick(oo, bo, |o| o.language.clone()),
            concurrency: pick(oo, bo, |o| o.concurrency),
            tesseract_path: pick(oo, bo, |o| o.tesseract_path.clone()),
        }),
        ner: Some(NerConfig {
            command: pick(on, bn, |n| n.command.clone()),
            args: pick(on, bn, |n| n.args.clone()),
            person_labels: pick(on, bn, |n| n.person_labels.clone()),
        }),
        pipeline: Some(PipelineSection {
            timeout_secs: pick(op, bp, |p| p.timeout_secs),
            project_strategy: pick(op, bp, |p| p.project_strategy.clone()),
        }),
    }
}
