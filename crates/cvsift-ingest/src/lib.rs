#[cfg(feature = "pdf")]
use std::sync::Arc;

pub mod acquire;
pub mod ner_command;
pub mod ocr_tesseract;
pub mod pipeline;

pub use acquire::{
    AcquireConfig, Acquisition, AcquisitionWarning, DEFAULT_OCR_CONCURRENCY, DEFAULT_OCR_DPI,
    DEFAULT_OCR_LANGUAGE, TextAcquirer, TextSource,
};
pub use ner_command::{CommandRecognizer, NER_COMMAND_ENV};
pub use ocr_tesseract::{TESSERACT_ENV, TesseractCli};
pub use pipeline::{
    DEFAULT_TIMEOUT, Pipeline, PipelineConfig, PipelineError, PipelineOutcome, PipelineWarning,
};

// Re-export domain types for convenience
pub use cvsift_core::{CandidateRecord, EntityRecognizer, OcrEngine, PdfBackend};

/// Pipeline over the MuPDF backend.
///
/// `ocr` enables the image fallback; `recognizer` defaults to
/// [`NullRecognizer`](cvsift_core::NullRecognizer) when `None`.
#[cfg(feature = "pdf")]
pub fn mupdf_pipeline(
    config: PipelineConfig,
    ocr: Option<Arc<dyn OcrEngine>>,
    recognizer: Option<Arc<dyn EntityRecognizer>>,
) -> Pipeline {
    let mut pipeline =
        Pipeline::new(Arc::new(cvsift_pdf_mupdf::MupdfBackend::default())).with_config(config);
    if let Some(engine) = ocr {
        pipeline = pipeline.with_ocr(engine);
    }
    if let Some(recognizer) = recognizer {
        pipeline = pipeline.with_recognizer(recognizer);
    }
    pipeline
}
