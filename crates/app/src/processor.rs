use std::io::{self, Write};
use std::path::Path;

use platescan_core::ExtractionResult;
use platescan_match::{MatchError, PatternRegistry};
use platescan_ocr::{
    AcquireError, LopdfReader, OcrBackend, PageRasterizer, Pdftoppm, TesseractCli, TextAcquirer,
    TextLayerReader,
};
use thiserror::Error;

/// Characters of extracted text shown in the preview.
pub const PREVIEW_CHARS: usize = 1000;

/// Process exit codes.
pub mod exit {
    pub const IDENTIFIED: u8 = 0;
    pub const NO_MATCH: u8 = 1;
    pub const NOT_FOUND: u8 = 2;
    pub const FAILURE: u8 = 3;
}

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error(transparent)]
    Acquire(#[from] AcquireError),
    #[error("Failed to write output: {0}")]
    Output(#[from] io::Error),
}

impl ProcessError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ProcessError::Acquire(AcquireError::NotFound(_)))
    }

    pub fn exit_code(&self) -> u8 {
        if self.is_not_found() {
            exit::NOT_FOUND
        } else {
            exit::FAILURE
        }
    }
}

pub fn exit_code(outcome: &Result<ExtractionResult, ProcessError>) -> u8 {
    match outcome {
        Ok(result) if result.success => exit::IDENTIFIED,
        Ok(_) => exit::NO_MATCH,
        Err(e) => e.exit_code(),
    }
}

/// Text acquisition followed by restaurant matching, one document at a time.
///
/// Each processor owns its registry, so independently configured processors
/// can coexist.
pub struct PdfProcessor<L = LopdfReader, P = Pdftoppm, R = Box<dyn OcrBackend>> {
    acquirer: TextAcquirer<L, P, R>,
    registry: PatternRegistry,
}

impl PdfProcessor {
    /// Built-in restaurants, lopdf text layer, pdftoppm + tesseract fallback.
    pub fn new() -> Self {
        Self::with_parts(
            TextAcquirer::new(
                LopdfReader,
                Pdftoppm::default(),
                Box::new(TesseractCli::default()) as Box<dyn OcrBackend>,
            ),
            PatternRegistry::new(),
        )
    }
}

impl Default for PdfProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl<L, P, R> PdfProcessor<L, P, R>
where
    L: TextLayerReader,
    P: PageRasterizer,
    R: OcrBackend,
{
    pub fn with_parts(acquirer: TextAcquirer<L, P, R>, registry: PatternRegistry) -> Self {
        Self { acquirer, registry }
    }

    pub fn extract_text_from_pdf(&self, path: &Path) -> Result<String, AcquireError> {
        self.acquirer.extract_text(path)
    }

    pub fn identify_restaurant(&self, text: &str) -> Option<&str> {
        self.registry.identify(text)
    }

    pub fn add_restaurant_pattern<S: AsRef<str>>(
        &mut self,
        restaurant: &str,
        patterns: &[S],
    ) -> Result<(), MatchError> {
        self.registry.add_restaurant_pattern(restaurant, patterns)
    }

    /// Silent pipeline run: acquire text, then match it.
    pub fn process(&self, path: &Path) -> Result<ExtractionResult, AcquireError> {
        let text = self.extract_text_from_pdf(path)?;
        let restaurant = self.registry.identify(&text).map(str::to_string);
        match &restaurant {
            Some(id) => tracing::info!(path = %path.display(), restaurant = %id, "restaurant identified"),
            None => tracing::info!(path = %path.display(), "no restaurant matched"),
        }
        Ok(ExtractionResult::new(text, restaurant))
    }

    /// Run the pipeline and report progress on stdout.
    pub fn process_pdf(
        &self,
        path: &Path,
        show_preview: bool,
    ) -> Result<ExtractionResult, ProcessError> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.process_pdf_to(path, show_preview, &mut out)
    }

    pub fn process_pdf_to<W: Write>(
        &self,
        path: &Path,
        show_preview: bool,
        out: &mut W,
    ) -> Result<ExtractionResult, ProcessError> {
        writeln!(out, "Processing PDF: {}", path.display())?;
        let result = self.process(path)?;

        if show_preview {
            write_preview(out, &result.text)?;
        }
        match &result.restaurant {
            Some(id) => writeln!(out, "\n✓ Identified Restaurant: {id}")?,
            None => writeln!(out, "\n✗ No restaurant matched.")?,
        }
        Ok(result)
    }
}

fn write_preview<W: Write>(out: &mut W, text: &str) -> io::Result<()> {
    let (head, truncated) = preview(text, PREVIEW_CHARS);
    writeln!(out, "\n--- Extracted Text Preview ---")?;
    writeln!(out, "{head}")?;
    if truncated {
        writeln!(out, "... (truncated)")?;
    }
    Ok(())
}

/// First `limit` characters of `text`, and whether anything was cut.
pub fn preview(text: &str, limit: usize) -> (&str, bool) {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => (&text[..idx], true),
        None => (text, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platescan_ocr::{MockRecognizer, OcrError};
    use std::path::PathBuf;

    struct FakeReader(String);

    impl TextLayerReader for FakeReader {
        fn page_texts(&self, _path: &Path) -> Result<Vec<String>, AcquireError> {
            Ok(vec![self.0.clone()])
        }
    }

    struct NoRasterizer;

    impl PageRasterizer for NoRasterizer {
        fn render_pages(&self, _path: &Path) -> Result<Vec<Vec<u8>>, OcrError> {
            Err(OcrError::NotAvailable("pdftoppm missing".into()))
        }
    }

    struct PagelessRasterizer;

    impl PageRasterizer for PagelessRasterizer {
        fn render_pages(&self, _path: &Path) -> Result<Vec<Vec<u8>>, OcrError> {
            Ok(Vec::new())
        }
    }

    fn processor(text: &str) -> PdfProcessor<FakeReader, NoRasterizer, MockRecognizer> {
        PdfProcessor::with_parts(
            TextAcquirer::new(FakeReader(text.to_string()), NoRasterizer, MockRecognizer::new("")),
            PatternRegistry::new(),
        )
    }

    fn receipt_file() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("receipt.pdf");
        std::fs::write(&path, b"%PDF-1.5").unwrap();
        (dir, path)
    }

    #[test]
    fn preview_respects_char_boundaries() {
        assert_eq!(preview("héllo", 2), ("hé", true));
        assert_eq!(preview("héllo", 5), ("héllo", false));
        assert_eq!(preview("", 10), ("", false));
    }

    #[test]
    fn identified_receipt_reports_success() {
        let (_dir, path) = receipt_file();
        let p = processor("Welcome to McDonald's! Order #12345 Total: $15.99");
        let mut out = Vec::new();

        let result = p.process_pdf_to(&path, true, &mut out).unwrap();
        assert_eq!(result.restaurant.as_deref(), Some("mcdonalds"));
        assert!(result.success);
        assert_eq!(result.text, "Welcome to McDonald's! Order #12345 Total: $15.99\n");

        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("--- Extracted Text Preview ---"));
        assert!(printed.contains("✓ Identified Restaurant: mcdonalds"));
        assert!(!printed.contains("(truncated)"));
    }

    #[test]
    fn unmatched_receipt_reports_failure() {
        let (_dir, path) = receipt_file();
        let p = processor("Random Restaurant");
        let mut out = Vec::new();

        let result = p.process_pdf_to(&path, false, &mut out).unwrap();
        assert_eq!(result.restaurant, None);
        assert!(!result.success);
        assert_eq!(exit_code(&Ok(result)), exit::NO_MATCH);

        let printed = String::from_utf8(out).unwrap();
        assert!(!printed.contains("Preview"));
        assert!(printed.contains("✗ No restaurant matched."));
    }

    #[test]
    fn long_text_preview_is_truncated() {
        let (_dir, path) = receipt_file();
        let p = processor(&"subway ".repeat(300));
        let mut out = Vec::new();

        p.process_pdf_to(&path, true, &mut out).unwrap();
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("... (truncated)"));
    }

    #[test]
    fn missing_file_maps_to_not_found_exit() {
        let p = processor("KFC");
        let err = p
            .process_pdf_to(Path::new("/nonexistent/receipt.pdf"), true, &mut Vec::new())
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.exit_code(), exit::NOT_FOUND);
    }

    #[test]
    fn ocr_failure_maps_to_generic_failure_exit() {
        let (_dir, path) = receipt_file();
        let p = processor("   ");
        let err = p.process_pdf_to(&path, false, &mut Vec::new()).unwrap_err();
        assert!(!err.is_not_found());
        assert_eq!(exit_code(&Err(err)), exit::FAILURE);
    }

    #[test]
    fn pageless_document_is_a_no_match() {
        let (_dir, path) = receipt_file();
        let p = PdfProcessor::with_parts(
            TextAcquirer::new(FakeReader(String::new()), PagelessRasterizer, MockRecognizer::new("KFC")),
            PatternRegistry::new(),
        );
        let outcome = p.process_pdf_to(&path, true, &mut Vec::new());
        assert_eq!(outcome.as_ref().unwrap().text, "");
        assert_eq!(exit_code(&outcome), exit::NO_MATCH);
    }

    #[test]
    fn custom_pattern_is_used_by_pipeline() {
        let (_dir, path) = receipt_file();
        let mut p = processor("TACO BELL #031 live mas");
        assert!(!p.process(&path).unwrap().success);

        p.add_restaurant_pattern("taco_bell", &[r"taco\s*bell", r"live\s*mas"])
            .unwrap();
        let result = p.process(&path).unwrap();
        assert_eq!(result.restaurant.as_deref(), Some("taco_bell"));
        assert_eq!(p.identify_restaurant("KFC"), Some("kfc"));
    }
}
