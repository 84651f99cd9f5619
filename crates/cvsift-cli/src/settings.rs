use std::path::PathBuf;
use std::time::Duration;

use cvsift_core::config_file::ConfigFile;
use cvsift_ingest::{
    AcquireConfig, CommandRecognizer, NER_COMMAND_ENV, PipelineConfig, TESSERACT_ENV,
};
use cvsift_parsing::{ListOverride, ParsingConfigBuilder, ProjectStrategy};

/// Values given on the command line. `None` defers to env, then config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub no_ocr: bool,
    pub dpi: Option<u32>,
    pub lang: Option<String>,
    pub ner_command: Option<String>,
    pub timeout_secs: Option<u64>,
    pub project_strategy: Option<ProjectStrategy>,
}

/// Everything needed to build the pipeline.
#[derive(Debug)]
pub struct Settings {
    pub pipeline: PipelineConfig,
    pub ocr_enabled: bool,
    pub tesseract: PathBuf,
    pub recognizer: Option<CommandRecognizer>,
}

/// Resolve settings with precedence: flags > env > config file > defaults.
///
/// `env` looks up an environment variable; it is a parameter so tests do not
/// touch the process environment.
pub fn resolve(
    file: &ConfigFile,
    overrides: &Overrides,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());
    let vocab = file.vocabulary.clone().unwrap_or_default();
    let ocr = file.ocr.clone().unwrap_or_default();
    let ner = file.ner.clone().unwrap_or_default();
    let section = file.pipeline.clone().unwrap_or_default();

    let mut builder = ParsingConfigBuilder::new()
        .skills(ListOverride::from_parts(vocab.skills, vocab.skills_extra))
        .education_keywords(ListOverride::from_parts(
            vocab.education,
            vocab.education_extra,
        ))
        .experience_keywords(ListOverride::from_parts(
            vocab.experience,
            vocab.experience_extra,
        ))
        .project_keywords(ListOverride::from_parts(vocab.projects, vocab.projects_extra))
        .person_labels(ListOverride::from_parts(ner.person_labels.clone(), None));
    let strategy = match (overrides.project_strategy, section.project_strategy.as_deref()) {
        (Some(strategy), _) => Some(strategy),
        (None, Some(name)) => Some(name.parse::<ProjectStrategy>()?),
        (None, None) => None,
    };
    if let Some(strategy) = strategy {
        builder = builder.project_strategy(strategy);
    }
    let parsing = builder.build()?;

    let defaults = AcquireConfig::default();
    let dpi = overrides.dpi.or(ocr.dpi).unwrap_or(defaults.ocr_dpi);
    if dpi == 0 {
        anyhow::bail!("OCR resolution must be at least 1 DPI");
    }
    let acquire = AcquireConfig {
        ocr_dpi: dpi,
        ocr_language: overrides
            .lang
            .clone()
            .or(ocr.language)
            .unwrap_or(defaults.ocr_language),
        ocr_concurrency: ocr.concurrency.unwrap_or(defaults.ocr_concurrency).max(1),
    };

    let timeout = overrides
        .timeout_secs
        .or(section.timeout_secs)
        .map(Duration::from_secs)
        .unwrap_or(cvsift_ingest::DEFAULT_TIMEOUT);
    if timeout.is_zero() {
        anyhow::bail!("--timeout must be greater than zero");
    }

    let tesseract = env(TESSERACT_ENV)
        .or(ocr.tesseract_path)
        .unwrap_or_else(|| "tesseract".to_string());

    let recognizer = match overrides.ner_command.clone().or_else(|| env(NER_COMMAND_ENV)) {
        Some(line) => CommandRecognizer::from_command_line(&line),
        None => ner
            .command
            .filter(|c| !c.trim().is_empty())
            .map(|command| CommandRecognizer::new(command, ner.args.unwrap_or_default())),
    };

    Ok(Settings {
        pipeline: PipelineConfig {
            timeout,
            acquire,
            parsing,
        },
        ocr_enabled: !overrides.no_ocr && ocr.enabled.unwrap_or(true),
        tesseract: PathBuf::from(tesseract),
        recognizer,
    })
}
