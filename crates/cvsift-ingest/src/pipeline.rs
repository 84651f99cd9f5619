use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use thiserror::Error;
use tokio::task::JoinError;

use cvsift_core::{CandidateRecord, EntityRecognizer, NullRecognizer, OcrEngine, PdfBackend};
use cvsift_parsing::{Field, FieldExtractor, ParsingConfig};
use cvsift_reporting::format_report;

use crate::acquire::{AcquireConfig, AcquisitionWarning, TextAcquirer, TextSource};

/// Per-document budget for text acquisition.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub timeout: Duration,
    pub acquire: AcquireConfig,
    pub parsing: ParsingConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            acquire: AcquireConfig::default(),
            parsing: ParsingConfig::default(),
        }
    }
}

/// Something that went wrong without stopping the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineWarning {
    Acquisition(AcquisitionWarning),
    /// The extractor for `field` failed; the field holds its empty value.
    ExtractorFailed { field: Field },
    /// The input had no bytes at all.
    EmptyDocument,
}

impl fmt::Display for PipelineWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Acquisition(w) => w.fmt(f),
            Self::ExtractorFailed { field } => write!(f, "{field} extractor failed"),
            Self::EmptyDocument => f.write_str("document is empty"),
        }
    }
}

/// Terminal result of a pipeline run.
#[derive(Debug, Clone)]
pub enum PipelineOutcome {
    Extracted {
        record: CandidateRecord,
        report: String,
        source: TextSource,
        warnings: Vec<PipelineWarning>,
    },
    /// No text could be acquired. `record` is [`CandidateRecord::empty()`]
    /// and every report section reads "Not Found".
    NoExtractableText {
        record: CandidateRecord,
        report: String,
        warnings: Vec<PipelineWarning>,
    },
}

impl PipelineOutcome {
    pub fn record(&self) -> &CandidateRecord {
        match self {
            Self::Extracted { record, .. } | Self::NoExtractableText { record, .. } => record,
        }
    }

    pub fn report(&self) -> &str {
        match self {
            Self::Extracted { report, .. } | Self::NoExtractableText { report, .. } => report,
        }
    }

    pub fn warnings(&self) -> &[PipelineWarning] {
        match self {
            Self::Extracted { warnings, .. } | Self::NoExtractableText { warnings, .. } => warnings,
        }
    }

    pub fn source(&self) -> TextSource {
        match self {
            Self::Extracted { source, .. } => *source,
            Self::NoExtractableText { .. } => TextSource::None,
        }
    }

    pub fn has_text(&self) -> bool {
        matches!(self, Self::Extracted { .. })
    }
}

/// Internal failures, distinct from "no text". Acquisition never fails; only
/// the deadline and a lost extraction task surface here.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("pipeline task failed: {0}")]
    Task(#[from] JoinError),
    #[error("text acquisition timed out after {0:?}")]
    Timeout(Duration),
}

/// Bytes to record and report.
pub struct Pipeline {
    acquirer: TextAcquirer,
    extractor: Arc<FieldExtractor>,
    recognizer: Arc<dyn EntityRecognizer>,
    timeout: Duration,
}

impl Pipeline {
    /// A pipeline with default configuration, no OCR and no recognizer.
    pub fn new(backend: Arc<dyn PdfBackend>) -> Self {
        Self {
            acquirer: TextAcquirer::new(backend),
            extractor: Arc::new(FieldExtractor::new()),
            recognizer: Arc::new(NullRecognizer),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_ocr(mut self, engine: Arc<dyn OcrEngine>) -> Self {
        self.acquirer = self.acquirer.with_ocr(engine);
        self
    }

    pub fn with_recognizer(mut self, recognizer: Arc<dyn EntityRecognizer>) -> Self {
        self.recognizer = recognizer;
        self
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.acquirer = self.acquirer.with_config(config.acquire);
        self.extractor = Arc::new(FieldExtractor::with_config(config.parsing));
        self.timeout = config.timeout;
        self
    }

    /// Run on `bytes`, stamping the report with the current local time.
    pub async fn run(&self, bytes: impl Into<Arc<[u8]>>) -> Result<PipelineOutcome, PipelineError> {
        self.run_at(bytes, chrono::Local::now().naive_local()).await
    }

    pub async fn run_at(
        &self,
        bytes: impl Into<Arc<[u8]>>,
        generated_at: NaiveDateTime,
    ) -> Result<PipelineOutcome, PipelineError> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            tracing::warn!("empty document, nothing to extract");
            return Ok(no_text(vec![PipelineWarning::EmptyDocument], generated_at));
        }

        tracing::debug!(bytes = bytes.len(), "acquiring text");
        // Blocking work already started keeps running on timeout; its result
        // is discarded.
        let acquisition = tokio::time::timeout(self.timeout, self.acquirer.acquire(bytes))
            .await
            .map_err(|_| PipelineError::Timeout(self.timeout))?;

        let warnings = acquisition
            .warnings
            .into_iter()
            .map(PipelineWarning::Acquisition)
            .collect();

        if acquisition.text.is_empty() {
            tracing::info!("no extractable text");
            return Ok(no_text(warnings, generated_at));
        }

        self.extract(acquisition.text, acquisition.source, warnings, generated_at)
            .await
    }

    /// Run the extractors and formatter on already-acquired text.
    pub async fn run_text(&self, text: impl Into<String>) -> Result<PipelineOutcome, PipelineError> {
        self.run_text_at(text, chrono::Local::now().naive_local())
            .await
    }

    pub async fn run_text_at(
        &self,
        text: impl Into<String>,
        generated_at: NaiveDateTime,
    ) -> Result<PipelineOutcome, PipelineError> {
        let text = cvsift_core::normalize_text(text.into());
        if text.is_empty() {
            return Ok(no_text(Vec::new(), generated_at));
        }
        self.extract(text, TextSource::Native, Vec::new(), generated_at)
            .await
    }

    async fn extract(
        &self,
        text: String,
        source: TextSource,
        mut warnings: Vec<PipelineWarning>,
        generated_at: NaiveDateTime,
    ) -> Result<PipelineOutcome, PipelineError> {
        // The recognizer may shell out, so keep it off the async workers.
        let extractor = Arc::clone(&self.extractor);
        let recognizer = Arc::clone(&self.recognizer);
        let extraction =
            tokio::task::spawn_blocking(move || extractor.extract_all(&text, recognizer.as_ref()))
                .await?;

        warnings.extend(
            extraction
                .failures
                .into_iter()
                .map(|field| PipelineWarning::ExtractorFailed { field }),
        );

        let report = format_report(&extraction.record, generated_at);
        tracing::info!(
            %source,
            name_found = extraction.record.has_name(),
            warnings = warnings.len(),
            "extraction complete"
        );
        Ok(PipelineOutcome::Extracted {
            record: extraction.record,
            report,
            source,
            warnings,
        })
    }
}

fn no_text(warnings: Vec<PipelineWarning>, generated_at: NaiveDateTime) -> PipelineOutcome {
    let record = CandidateRecord::empty();
    let report = format_report(&record, generated_at);
    PipelineOutcome::NoExtractableText {
        record,
        report,
        warnings,
    }
}
