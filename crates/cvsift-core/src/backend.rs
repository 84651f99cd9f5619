use thiserror::Error;

/// A rendered page, ready for OCR.
pub type PageImage = image::RgbImage;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to open PDF: {0}")]
    OpenError(String),
    #[error("PDF is encrypted")]
    Encrypted,
    #[error("failed to extract text: {0}")]
    ExtractionError(String),
    #[error("failed to render page {page}: {message}")]
    RenderError { page: usize, message: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for PDF structure backends.
///
/// Implementors provide the low-level document access; the fallback policy
/// (native text first, OCR when the aggregate is empty) lives in the
/// acquisition layer of `cvsift-ingest`.
pub trait PdfBackend: Send + Sync {
    /// Extract the text layer of every page, in page order.
    ///
    /// A page without a text layer yields an empty string rather than an error.
    fn pages(&self, bytes: &[u8]) -> Result<Vec<String>, BackendError>;

    /// Render every page to an RGB image at `dpi`, in page order.
    fn rasterize(&self, bytes: &[u8], dpi: u32) -> Result<Vec<PageImage>, BackendError>;
}
