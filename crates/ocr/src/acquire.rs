use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::preprocess;
use crate::rasterize::PageRasterizer;
use crate::recognizer::{OcrBackend, OcrError};
use crate::text_layer::TextLayerReader;

#[derive(Debug, Error)]
pub enum AcquireError {
    #[error("PDF file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Text extraction failed: {0}")]
    Extraction(String),
    #[error("OCR failed: {0}")]
    Ocr(#[from] OcrError),
}

/// How the text of a document was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSource {
    TextLayer,
    Ocr,
}

/// Text pulled out of one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquiredText {
    pub text: String,
    pub source: TextSource,
}

/// Orchestrates: existence check → text layer → (if blank) rasterize → preprocess → OCR.
///
/// Either stage failing aborts the whole document; no partial text is returned.
pub struct TextAcquirer<L, P, R> {
    reader: L,
    rasterizer: P,
    recognizer: R,
}

impl<L, P, R> TextAcquirer<L, P, R>
where
    L: TextLayerReader,
    P: PageRasterizer,
    R: OcrBackend,
{
    pub fn new(reader: L, rasterizer: P, recognizer: R) -> Self {
        Self { reader, rasterizer, recognizer }
    }

    /// Full text of the document at `path`.
    pub fn extract_text(&self, path: &Path) -> Result<String, AcquireError> {
        self.acquire(path).map(|acquired| acquired.text)
    }

    pub fn acquire(&self, path: &Path) -> Result<AcquiredText, AcquireError> {
        if !path.exists() {
            return Err(AcquireError::NotFound(path.to_path_buf()));
        }

        let text = join_pages(
            self.reader
                .page_texts(path)?
                .into_iter()
                .filter(|page| !page.is_empty()),
        );
        if !text.trim().is_empty() {
            return Ok(AcquiredText { text, source: TextSource::TextLayer });
        }

        tracing::info!(path = %path.display(), "no text layer found, falling back to OCR");
        let text = self.ocr_pdf(path)?;
        Ok(AcquiredText { text, source: TextSource::Ocr })
    }

    /// Render every page and OCR it, keeping page order.
    pub fn ocr_pdf(&self, path: &Path) -> Result<String, AcquireError> {
        let pages = self.rasterizer.render_pages(path)?;
        let mut texts = Vec::with_capacity(pages.len());
        for (idx, page) in pages.iter().enumerate() {
            tracing::debug!(page = idx + 1, total = pages.len(), "running OCR on page");
            let image = preprocess::prepare_for_ocr_from_bytes(page).map_err(OcrError::from)?;
            texts.push(self.recognizer.recognize(&image)?);
        }
        Ok(join_pages(texts.into_iter()))
    }
}

/// Each page's text followed by a newline.
fn join_pages(pages: impl Iterator<Item = String>) -> String {
    pages.fold(String::new(), |mut acc, page| {
        acc.push_str(&page);
        acc.push('\n');
        acc
    })
}
