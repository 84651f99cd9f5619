use std::fmt;
use std::sync::Arc;

use futures_util::future::join_all;
use tokio::sync::Semaphore;

use cvsift_core::{OcrEngine, OcrError, PdfBackend, normalize_text};

/// Resolution pages are rendered at before OCR.
pub const DEFAULT_OCR_DPI: u32 = 200;
pub const DEFAULT_OCR_LANGUAGE: &str = "eng";
/// Pages recognized at the same time.
pub const DEFAULT_OCR_CONCURRENCY: usize = 4;

/// Settings for the OCR fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquireConfig {
    pub ocr_dpi: u32,
    /// A single tesseract language code.
    pub ocr_language: String,
    pub ocr_concurrency: usize,
}

impl Default for AcquireConfig {
    fn default() -> Self {
        Self {
            ocr_dpi: DEFAULT_OCR_DPI,
            ocr_language: DEFAULT_OCR_LANGUAGE.to_string(),
            ocr_concurrency: DEFAULT_OCR_CONCURRENCY,
        }
    }
}

/// Where the acquired text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSource {
    /// The document's own text layer.
    Native,
    Ocr,
    /// Neither path produced text.
    None,
}

impl fmt::Display for TextSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TextSource::Native => "text layer",
            TextSource::Ocr => "OCR",
            TextSource::None => "none",
        };
        f.write_str(s)
    }
}

/// A degraded step during acquisition. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquisitionWarning {
    /// The text layer could not be read (corrupt or encrypted document).
    NativeExtractionFailed(String),
    RasterizationFailed(String),
    /// One page failed OCR and contributes no text.
    OcrPageFailed { page: usize, message: String },
    /// OCR was needed but no engine is configured or installed.
    OcrUnavailable,
}

impl fmt::Display for AcquisitionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NativeExtractionFailed(msg) => write!(f, "text layer extraction failed: {msg}"),
            Self::RasterizationFailed(msg) => write!(f, "page rendering failed: {msg}"),
            Self::OcrPageFailed { page, message } => write!(f, "OCR failed on page {page}: {message}"),
            Self::OcrUnavailable => f.write_str("OCR engine unavailable"),
        }
    }
}

/// Result of [`TextAcquirer::acquire`].
#[derive(Debug, Clone)]
pub struct Acquisition {
    /// Page-ordered text; empty when nothing could be acquired.
    pub text: String,
    pub source: TextSource,
    pub warnings: Vec<AcquisitionWarning>,
}

impl Acquisition {
    fn nothing(warnings: Vec<AcquisitionWarning>) -> Self {
        Self {
            text: String::new(),
            source: TextSource::None,
            warnings,
        }
    }
}

/// Turns PDF bytes into plain text.
///
/// The text layer is tried first. Only if the whole document yields no text
/// are the pages rendered and passed through OCR; pages are never mixed.
pub struct TextAcquirer {
    backend: Arc<dyn PdfBackend>,
    ocr: Option<Arc<dyn OcrEngine>>,
    config: AcquireConfig,
}

impl TextAcquirer {
    pub fn new(backend: Arc<dyn PdfBackend>) -> Self {
        Self {
            backend,
            ocr: None,
            config: AcquireConfig::default(),
        }
    }

    pub fn with_ocr(mut self, engine: Arc<dyn OcrEngine>) -> Self {
        self.ocr = Some(engine);
        self
    }

    pub fn with_config(mut self, config: AcquireConfig) -> Self {
        self.config = config;
        self
    }

    /// Acquire the document text.
    ///
    /// Never fails: backend and OCR failures, panics included, degrade to
    /// warnings and at worst an empty text.
    pub async fn acquire(&self, bytes: Arc<[u8]>) -> Acquisition {
        let mut warnings = Vec::new();

        let backend = Arc::clone(&self.backend);
        let input = Arc::clone(&bytes);
        match tokio::task::spawn_blocking(move || backend.pages(&input)).await {
            Ok(Ok(pages)) => {
                let page_count = pages.len();
                let text = normalize_text(pages.concat());
                if !text.is_empty() {
                    tracing::debug!(pages = page_count, chars = text.len(), "using text layer");
                    return Acquisition {
                        text,
                        source: TextSource::Native,
                        warnings,
                    };
                }
                tracing::debug!(pages = page_count, "document has no text layer");
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "text layer extraction failed");
                warnings.push(AcquisitionWarning::NativeExtractionFailed(e.to_string()));
            }
            Err(e) => {
                tracing::warn!(error = %e, "text layer task failed");
                warnings.push(AcquisitionWarning::NativeExtractionFailed(e.to_string()));
            }
        }

        let Some(ocr) = &self.ocr else {
            tracing::warn!("no text layer and no OCR engine configured");
            warnings.push(AcquisitionWarning::OcrUnavailable);
            return Acquisition::nothing(warnings);
        };

        self.acquire_ocr(Arc::clone(ocr), bytes, warnings).await
    }

    async fn acquire_ocr(
        &self,
        ocr: Arc<dyn OcrEngine>,
        bytes: Arc<[u8]>,
        mut warnings: Vec<AcquisitionWarning>,
    ) -> Acquisition {
        let dpi = self.config.ocr_dpi;
        tracing::info!(dpi, language = %self.config.ocr_language, "falling back to OCR");

        let backend = Arc::clone(&self.backend);
        let rendered = tokio::task::spawn_blocking(move || backend.rasterize(&bytes, dpi)).await;
        let images = match rendered {
            Ok(Ok(images)) => images,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "page rendering failed");
                warnings.push(AcquisitionWarning::RasterizationFailed(e.to_string()));
                return Acquisition::nothing(warnings);
            }
            Err(e) => {
                tracing::warn!(error = %e, "page rendering task failed");
                warnings.push(AcquisitionWarning::RasterizationFailed(e.to_string()));
                return Acquisition::nothing(warnings);
            }
        };

        let semaphore = Arc::new(Semaphore::new(self.config.ocr_concurrency.max(1)));
        let mut handles = Vec::with_capacity(images.len());
        for image in images {
            // The semaphore is never closed, so this only waits.
            let permit = Arc::clone(&semaphore).acquire_owned().await.ok();
            let ocr = Arc::clone(&ocr);
            let language = self.config.ocr_language.clone();
            handles.push(tokio::task::spawn_blocking(move || {
                let _permit = permit;
                ocr.recognize(&image, &language)
            }));
        }

        // join_all keeps submission order, which is page order.
        let mut text = String::new();
        let mut unavailable = false;
        for (index, result) in join_all(handles).await.into_iter().enumerate() {
            let page = index + 1;
            match result {
                Ok(Ok(page_text)) => text.push_str(&page_text),
                Ok(Err(OcrError::Unavailable(program))) => {
                    tracing::debug!(page, %program, "OCR engine unavailable");
                    unavailable = true;
                }
                Ok(Err(e)) => {
                    tracing::warn!(page, error = %e, "OCR failed on page");
                    warnings.push(AcquisitionWarning::OcrPageFailed {
                        page,
                        message: e.to_string(),
                    });
                }
                Err(e) => {
                    tracing::warn!(page, error = %e, "OCR task failed");
                    warnings.push(AcquisitionWarning::OcrPageFailed {
                        page,
                        message: e.to_string(),
                    });
                }
            }
        }
        if unavailable {
            tracing::warn!("OCR engine could not be started");
            warnings.push(AcquisitionWarning::OcrUnavailable);
        }

        let text = normalize_text(text);
        let source = if text.is_empty() {
            TextSource::None
        } else {
            TextSource::Ocr
        };
        tracing::debug!(%source, chars = text.len(), "OCR finished");
        Acquisition {
            text,
            source,
            warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use cvsift_core::{BackendError, PageImage};

    /// Backend with canned pages; `None` means the operation fails.
    struct MockBackend {
        pages: Option<Vec<String>>,
        /// Number of rendered pages; page `i` is `i + 1` pixels wide.
        rendered: Option<usize>,
        pages_calls: AtomicUsize,
        rasterize_calls: AtomicUsize,
    }

    impl MockBackend {
        fn new(pages: Option<Vec<&str>>, rendered: Option<usize>) -> Arc<Self> {
            Arc::new(Self {
                pages: pages.map(|p| p.into_iter().map(String::from).collect()),
                rendered,
                pages_calls: AtomicUsize::new(0),
                rasterize_calls: AtomicUsize::new(0),
            })
        }
    }

    impl PdfBackend for MockBackend {
        fn pages(&self, _bytes: &[u8]) -> Result<Vec<String>, BackendError> {
            self.pages_calls.fetch_add(1, Ordering::SeqCst);
            self.pages
                .clone()
                .ok_or_else(|| BackendError::OpenError("corrupt xref table".into()))
        }

        fn rasterize(&self, _bytes: &[u8], _dpi: u32) -> Result<Vec<PageImage>, BackendError> {
            self.rasterize_calls.fetch_add(1, Ordering::SeqCst);
            let count = self.rendered.ok_or_else(|| BackendError::RenderError {
                page: 1,
                message: "bad stream".into(),
            })?;
            Ok((0..count).map(|i| PageImage::new(i as u32 + 1, 1)).collect())
        }
    }

    /// Reads the page number back from the image width. Earlier pages sleep
    /// longer so completion order is the reverse of page order.
    struct MockOcr {
        fail_page: Option<u32>,
        blank: bool,
        calls: AtomicUsize,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl MockOcr {
        fn new() -> Self {
            Self {
                fail_page: None,
                blank: false,
                calls: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }
    }

    impl OcrEngine for MockOcr {
        fn recognize(&self, image: &PageImage, _language: &str) -> Result<String, OcrError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            let page = image.width();
            std::thread::sleep(Duration::from_millis(u64::from(10 * (8 - page.min(8)))));
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.fail_page == Some(page) {
                return Err(OcrError::Engine("tesseract crashed".into()));
            }
            if self.blank {
                return Ok(" \n".to_string());
            }
            Ok(format!("page{page} "))
        }
    }

    fn bytes() -> Arc<[u8]> {
        Arc::from(&b"%PDF-1.7 mock"[..])
    }

    #[tokio::test]
    async fn text_layer_skips_ocr() {
        let backend = MockBackend::new(Some(vec!["Jane Doe\n", "", "Engineer\n"]), Some(3));
        let ocr = Arc::new(MockOcr::new());
        let acquirer = TextAcquirer::new(backend.clone()).with_ocr(ocr.clone());

        let acquisition = acquirer.acquire(bytes()).await;
        assert_eq!(acquisition.text, "Jane Doe\nEngineer\n");
        assert_eq!(acquisition.source, TextSource::Native);
        assert!(acquisition.warnings.is_empty());
        assert_eq!(backend.rasterize_calls.load(Ordering::SeqCst), 0);
        assert_eq!(ocr.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn whitespace_text_layer_falls_back_to_ocr_in_page_order() {
        let backend = MockBackend::new(Some(vec![" \n", "\t"]), Some(5));
        let ocr = Arc::new(MockOcr::new());
        let acquirer = TextAcquirer::new(backend.clone()).with_ocr(ocr.clone());

        let acquisition = acquirer.acquire(bytes()).await;
        assert_eq!(acquisition.text, "page1 page2 page3 page4 page5 ");
        assert_eq!(acquisition.source, TextSource::Ocr);
        assert_eq!(ocr.calls.load(Ordering::SeqCst), 5);
        assert_eq!(backend.pages_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_page_is_skipped() {
        let backend = MockBackend::new(Some(vec![]), Some(3));
        let ocr = Arc::new(MockOcr {
            fail_page: Some(2),
            ..MockOcr::new()
        });
        let acquirer = TextAcquirer::new(backend).with_ocr(ocr);

        let acquisition = acquirer.acquire(bytes()).await;
        assert_eq!(acquisition.text, "page1 page3 ");
        assert_eq!(
            acquisition.warnings,
            vec![AcquisitionWarning::OcrPageFailed {
                page: 2,
                message: "OCR engine failed: tesseract crashed".into(),
            }]
        );
    }

    #[tokio::test]
    async fn corrupt_document_degrades_to_empty() {
        let backend = MockBackend::new(None, None);
        let acquirer = TextAcquirer::new(backend).with_ocr(Arc::new(MockOcr::new()));

        let acquisition = acquirer.acquire(bytes()).await;
        assert_eq!(acquisition.text, "");
        assert_eq!(acquisition.source, TextSource::None);
        assert!(matches!(
            acquisition.warnings.as_slice(),
            [
                AcquisitionWarning::NativeExtractionFailed(_),
                AcquisitionWarning::RasterizationFailed(_)
            ]
        ));
    }

    /// Panics in one or both backend calls.
    struct PanickingBackend {
        pages_panics: bool,
    }

    impl PdfBackend for PanickingBackend {
        fn pages(&self, _bytes: &[u8]) -> Result<Vec<String>, BackendError> {
            if self.pages_panics {
                panic!("text layer bug");
            }
            Ok(vec![String::new()])
        }

        fn rasterize(&self, _bytes: &[u8], _dpi: u32) -> Result<Vec<PageImage>, BackendError> {
            panic!("renderer bug");
        }
    }

    #[tokio::test]
    async fn backend_panics_degrade_to_warnings() {
        let acquirer = TextAcquirer::new(Arc::new(PanickingBackend { pages_panics: true }))
            .with_ocr(Arc::new(MockOcr::new()));

        let acquisition = acquirer.acquire(bytes()).await;
        assert_eq!(acquisition.text, "");
        assert_eq!(acquisition.source, TextSource::None);
        match acquisition.warnings.as_slice() {
            [
                AcquisitionWarning::NativeExtractionFailed(native),
                AcquisitionWarning::RasterizationFailed(render),
            ] => {
                assert!(native.contains("panicked"));
                assert!(render.contains("panicked"));
            }
            other => panic!("unexpected warnings: {other:?}"),
        }
    }

    #[tokio::test]
    async fn rasterize_panic_after_empty_text_layer() {
        let acquirer = TextAcquirer::new(Arc::new(PanickingBackend { pages_panics: false }))
            .with_ocr(Arc::new(MockOcr::new()));

        let acquisition = acquirer.acquire(bytes()).await;
        assert_eq!(acquisition.source, TextSource::None);
        assert!(matches!(
            acquisition.warnings.as_slice(),
            [AcquisitionWarning::RasterizationFailed(_)]
        ));
    }

    #[tokio::test]
    async fn blank_ocr_is_empty_not_error() {
        let backend = MockBackend::new(Some(vec![""]), Some(2));
        let ocr = Arc::new(MockOcr {
            blank: true,
            ..MockOcr::new()
        });
        let acquirer = TextAcquirer::new(backend).with_ocr(ocr);

        let acquisition = acquirer.acquire(bytes()).await;
        assert_eq!(acquisition.text, "");
        assert_eq!(acquisition.source, TextSource::None);
        assert!(acquisition.warnings.is_empty());
    }

    #[tokio::test]
    async fn zero_page_document_is_empty() {
        let backend = MockBackend::new(Some(vec![]), Some(0));
        let ocr = Arc::new(MockOcr::new());
        let acquirer = TextAcquirer::new(backend).with_ocr(ocr.clone());

        let acquisition = acquirer.acquire(bytes()).await;
        assert_eq!(acquisition.source, TextSource::None);
        assert_eq!(ocr.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_engine_is_reported() {
        let backend = MockBackend::new(Some(vec![""]), Some(1));
        let acquirer = TextAcquirer::new(backend.clone());

        let acquisition = acquirer.acquire(bytes()).await;
        assert_eq!(acquisition.warnings, vec![AcquisitionWarning::OcrUnavailable]);
        assert_eq!(backend.rasterize_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unavailable_engine_reported_once() {
        struct NotInstalled;
        impl OcrEngine for NotInstalled {
            fn recognize(&self, _: &PageImage, _: &str) -> Result<String, OcrError> {
                Err(OcrError::Unavailable("tesseract".into()))
            }
        }

        let backend = MockBackend::new(Some(vec![""]), Some(3));
        let acquirer = TextAcquirer::new(backend).with_ocr(Arc::new(NotInstalled));

        let acquisition = acquirer.acquire(bytes()).await;
        assert_eq!(acquisition.warnings, vec![AcquisitionWarning::OcrUnavailable]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn ocr_concurrency_is_bounded() {
        let backend = MockBackend::new(Some(vec![""]), Some(8));
        let ocr = Arc::new(MockOcr::new());
        let acquirer = TextAcquirer::new(backend)
            .with_ocr(ocr.clone())
            .with_config(AcquireConfig {
                ocr_concurrency: 2,
                ..AcquireConfig::default()
            });

        let acquisition = acquirer.acquire(bytes()).await;
        assert!(acquisition.text.starts_with("page1 page2 "));
        assert_eq!(ocr.calls.load(Ordering::SeqCst), 8);
        assert!(ocr.max_in_flight.load(Ordering::SeqCst) <= 2);
    }

    #[test]
    fn warning_display() {
        let w = AcquisitionWarning::OcrPageFailed {
            page: 3,
            message: "timeout".into(),
        };
        assert_eq!(w.to_string(), "OCR failed on page 3: timeout");
    }
}
