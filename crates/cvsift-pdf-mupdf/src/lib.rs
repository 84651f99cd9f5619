use std::fmt;

use mupdf::{Colorspace, Document, Matrix, Page, Pixmap, TextPageFlags};

use cvsift_core::{BackendError, PageImage, PdfBackend};

const PDF_MAGIC: &str = "application/pdf";

/// MuPDF-based implementation of [`PdfBackend`].
///
/// This crate is the sole AGPL island: it isolates the mupdf dependency
/// (which is AGPL-3.0) so that non-PDF code paths do not transitively
/// depend on it.
///
/// Documents are opened from memory; nothing is written to disk.
#[derive(Debug, Clone, Default)]
pub struct MupdfBackend {
    /// Emit U+FFFD for glyphs without a Unicode mapping instead of dropping them.
    keep_replacement_chars: bool,
}

impl MupdfBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep U+FFFD for glyphs MuPDF cannot map to Unicode.
    pub fn with_replacement_chars(mut self, keep: bool) -> Self {
        self.keep_replacement_chars = keep;
        self
    }

    fn open(&self, bytes: &[u8]) -> Result<Document, BackendError> {
        let document = Document::from_bytes(bytes, PDF_MAGIC)
            .map_err(|e| BackendError::OpenError(e.to_string()))?;
        if document
            .needs_password()
            .map_err(|e| BackendError::OpenError(e.to_string()))?
        {
            return Err(BackendError::Encrypted);
        }
        Ok(document)
    }

    fn page_text(&self, page: &Page) -> Result<String, BackendError> {
        let text_page = page
            .to_text_page(TextPageFlags::empty())
            .map_err(|e| BackendError::ExtractionError(e.to_string()))?;

        // Block/line iteration keeps one output line per visual line.
        let mut page_text = String::new();
        for block in text_page.blocks() {
            for line in block.lines() {
                for c in line.chars() {
                    match c.char() {
                        Some(ch) => page_text.push(ch),
                        None if self.keep_replacement_chars => page_text.push('\u{FFFD}'),
                        None => {}
                    }
                }
                page_text.push('\n');
            }
        }
        Ok(page_text)
    }
}

impl PdfBackend for MupdfBackend {
    /// Only opening the document or walking its page tree is an error. A
    /// single unreadable page contributes an empty string.
    fn pages(&self, bytes: &[u8]) -> Result<Vec<String>, BackendError> {
        let document = self.open(bytes)?;
        let pages = document
            .pages()
            .map_err(|e| BackendError::ExtractionError(e.to_string()))?;

        let pages_text = collect_page_texts(pages, |page| self.page_text(page));
        tracing::debug!(pages = pages_text.len(), "mupdf text layer extracted");
        Ok(pages_text)
    }

    fn rasterize(&self, bytes: &[u8], dpi: u32) -> Result<Vec<PageImage>, BackendError> {
        let document = self.open(bytes)?;

        // PDF user space is 72 units per inch.
        let scale = dpi as f32 / 72.0;
        let matrix = Matrix::new_scale(scale, scale);
        let colorspace = Colorspace::device_rgb();

        let mut images = Vec::new();
        for (index, page_result) in document
            .pages()
            .map_err(|e| BackendError::ExtractionError(e.to_string()))?
            .enumerate()
        {
            let render_err = |message: String| BackendError::RenderError {
                page: index + 1,
                message,
            };
            let page = page_result.map_err(|e| render_err(e.to_string()))?;
            let pixmap = page
                .to_pixmap(&matrix, &colorspace, false, true)
                .map_err(|e| render_err(e.to_string()))?;
            images.push(pixmap_to_rgb(&pixmap).map_err(render_err)?);
        }

        tracing::debug!(pages = images.len(), dpi, "mupdf pages rasterized");
        Ok(images)
    }
}

/// Text of each page in order; a page that fails to load or extract is
/// logged and kept as an empty string so page positions do not shift.
fn collect_page_texts<P, E: fmt::Display>(
    pages: impl Iterator<Item = Result<P, E>>,
    mut extract: impl FnMut(&P) -> Result<String, BackendError>,
) -> Vec<String> {
    pages
        .enumerate()
        .map(|(index, page)| {
            let page_no = index + 1;
            let text = match page {
                Ok(page) => extract(&page),
                Err(e) => Err(BackendError::ExtractionError(e.to_string())),
            };
            text.unwrap_or_else(|e| {
                tracing::warn!(page = page_no, error = %e, "page text extraction failed");
                String::new()
            })
        })
        .collect()
}

fn pixmap_to_rgb(pixmap: &Pixmap) -> Result<PageImage, String> {
    samples_to_rgb(
        pixmap.samples(),
        pixmap.width() as u32,
        pixmap.height() as u32,
        pixmap.n() as usize,
        pixmap.stride() as usize,
    )
}

/// Copy interleaved pixmap samples into an owned RGB buffer, dropping any
/// alpha channel and row padding.
fn samples_to_rgb(
    samples: &[u8],
    width: u32,
    height: u32,
    components: usize,
    stride: usize,
) -> Result<PageImage, String> {
    if components < 3 {
        return Err(format!("unexpected pixmap with {components} components"));
    }
    if stride < width as usize * components || samples.len() < stride * height as usize {
        return Err("pixmap sample buffer shorter than expected".to_string());
    }

    let mut rgb = Vec::with_capacity(width as usize * height as usize * 3);
    for row in samples.chunks(stride).take(height as usize) {
        for px in row.chunks(components).take(width as usize) {
            rgb.extend_from_slice(&px[..3]);
        }
    }

    PageImage::from_raw(width, height, rgb)
        .ok_or_else(|| "pixmap dimensions do not match its samples".to_string())
}
