use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use platescan_match::PatternRegistry;
use platescan_ocr::{LopdfReader, OcrBackend, Pdftoppm, TextAcquirer};

use crate::processor::PdfProcessor;

/// Extract restaurant information from PDF receipts.
#[derive(Debug, Parser)]
#[command(name = "platescan", version, about)]
pub struct Cli {
    /// PDF file(s) to process; more than one runs a batch
    #[arg(required = true, value_name = "PDF_FILE")]
    pub files: Vec<PathBuf>,

    /// Skip showing the extracted text preview
    #[arg(long)]
    pub no_preview: bool,

    /// Print results as JSON instead of the text report
    #[arg(long)]
    pub json: bool,

    /// TOML file with extra restaurant patterns
    #[arg(long, env = "PLATESCAN_PATTERNS", value_name = "TOML")]
    pub patterns: Option<PathBuf>,

    /// Tesseract language for the OCR fallback
    #[arg(long, env = "PLATESCAN_OCR_LANG", default_value = "eng")]
    pub lang: String,

    /// Resolution used when rendering pages for OCR
    #[arg(long, env = "PLATESCAN_DPI", default_value_t = Pdftoppm::DEFAULT_DPI)]
    pub dpi: u32,

    /// Tesseract data directory for the in-process engine
    #[cfg(feature = "tesseract")]
    #[arg(long, env = "TESSDATA_PREFIX")]
    pub tessdata: Option<String>,

    /// Log pipeline progress to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn show_preview(&self) -> bool {
        !self.no_preview
    }

    pub fn build_processor(&self) -> anyhow::Result<PdfProcessor> {
        let mut registry = PatternRegistry::new();
        if let Some(path) = &self.patterns {
            registry
                .load_pattern_file(path)
                .with_context(|| format!("loading patterns from {}", path.display()))?;
        }

        let rasterizer = Pdftoppm::new(self.dpi);
        if !rasterizer.is_available() {
            tracing::warn!("pdftoppm not found; receipts without a text layer will fail");
        }
        let acquirer = TextAcquirer::new(LopdfReader, rasterizer, self.recognizer());
        Ok(PdfProcessor::with_parts(acquirer, registry))
    }

    #[cfg(not(feature = "tesseract"))]
    fn recognizer(&self) -> Box<dyn OcrBackend> {
        let tesseract = platescan_ocr::TesseractCli::new(&self.lang);
        if !tesseract.is_available() {
            tracing::warn!("tesseract not found; receipts without a text layer will fail");
        }
        Box::new(tesseract)
    }

    #[cfg(feature = "tesseract")]
    fn recognizer(&self) -> Box<dyn OcrBackend> {
        use platescan_ocr::recognizer::libtesseract::LibTesseract;
        Box::new(LibTesseract::new(self.tessdata.clone(), &self.lang))
    }
}
