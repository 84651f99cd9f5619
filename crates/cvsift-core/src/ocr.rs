use thiserror::Error;

use crate::backend::PageImage;

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("OCR engine not available: {0}")]
    Unavailable(String),
    #[error("failed to encode page image: {0}")]
    Encode(String),
    #[error("OCR engine failed: {0}")]
    Engine(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Optical character recognition over a single rendered page.
pub trait OcrEngine: Send + Sync {
    /// Recognize the text on `image` using the given language code (e.g. `"eng"`).
    fn recognize(&self, image: &PageImage, language: &str) -> Result<String, OcrError>;
}
