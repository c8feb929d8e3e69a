use std::cell::Cell;
use std::ffi::OsStr;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

use crate::preprocess::PreprocessError;

pub(crate) const TESSERACT_NOT_FOUND: &str =
    "tesseract not found. Install with: apt install tesseract-ocr";

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Image decode error: {0}")]
    ImageDecode(String),
    #[error("OCR engine error: {0}")]
    Engine(String),
    #[error("Page rendering failed: {0}")]
    Render(String),
    #[error("OCR backend not available: {0}")]
    NotAvailable(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image preprocessing failed: {0}")]
    Preprocess(#[from] PreprocessError),
}

/// Recognizes the text on one rendered page.
/// Implementations accept encoded image bytes (PNG after preprocessing).
pub trait OcrBackend {
    fn recognize(&self, image_bytes: &[u8]) -> Result<String, OcrError>;
}

impl<T: OcrBackend + ?Sized> OcrBackend for &T {
    fn recognize(&self, image_bytes: &[u8]) -> Result<String, OcrError> {
        (**self).recognize(image_bytes)
    }
}

impl<T: OcrBackend + ?Sized> OcrBackend for Box<T> {
    fn recognize(&self, image_bytes: &[u8]) -> Result<String, OcrError> {
        (**self).recognize(image_bytes)
    }
}

/// Whether `program` resolves to an executable, either directly or on `PATH`.
pub fn check_binary(program: impl AsRef<OsStr>) -> bool {
    which::which(program).is_ok()
}

// ── Canned backend for tests ──────────────────────────────────────────────────

/// Answers every page with the same receipt text and counts how many pages
/// it was asked about.
pub struct MockRecognizer {
    page_text: String,
    pages_seen: Cell<usize>,
}

impl MockRecognizer {
    pub fn new(page_text: impl Into<String>) -> Self {
        Self {
            page_text: page_text.into(),
            pages_seen: Cell::new(0),
        }
    }

    pub fn pages_seen(&self) -> usize {
        self.pages_seen.get()
    }
}

impl OcrBackend for MockRecognizer {
    fn recognize(&self, _image_bytes: &[u8]) -> Result<String, OcrError> {
        self.pages_seen.set(self.pages_seen.get() + 1);
        Ok(self.page_text.clone())
    }
}

// ── Tesseract command-line backend ────────────────────────────────────────────

/// Runs the `tesseract` binary on a temporary copy of the page image and
/// reads the text from stdout.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    program: PathBuf,
    lang: String,
}

impl TesseractCli {
    pub fn new(lang: &str) -> Self {
        Self {
            program: PathBuf::from("tesseract"),
            lang: lang.to_string(),
        }
    }

    /// Use a specific tesseract executable instead of the one on `PATH`.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    pub fn is_available(&self) -> bool {
        check_binary(&self.program)
    }

    fn run(&self, image_path: &Path) -> Result<String, OcrError> {
        let output = Command::new(&self.program)
            .arg(image_path)
            .arg("stdout")
            .args(["-l", &self.lang])
            .output();

        match output {
            Ok(out) if out.status.success() => Ok(String::from_utf8_lossy(&out.stdout).into_owned()),
            Ok(out) => {
                let stderr = String::from_utf8_lossy(&out.stderr);
                Err(OcrError::Engine(format!("tesseract failed: {}", stderr.trim())))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(OcrError::NotAvailable(TESSERACT_NOT_FOUND.to_string()))
            }
            Err(e) => Err(OcrError::Io(e)),
        }
    }
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self::new("eng")
    }
}

impl OcrBackend for TesseractCli {
    fn recognize(&self, image_bytes: &[u8]) -> Result<String, OcrError> {
        let mut page = tempfile::Builder::new()
            .prefix("platescan-page-")
            .suffix(".png")
            .tempfile()?;
        page.write_all(image_bytes)?;
        page.flush()?;
        self.run(page.path())
    }
}

// ── In-process libtesseract backend (optional, `tesseract` feature) ──────────

#[cfg(feature = "tesseract")]
pub mod libtesseract {
    use super::{OcrBackend, OcrError};
    use leptess::LepTess;

    /// Links libtesseract through leptess instead of spawning a process.
    pub struct LibTesseract {
        tessdata: Option<String>,
        lang: String,
    }

    impl LibTesseract {
        pub fn new(tessdata: Option<String>, lang: &str) -> Self {
            Self {
                tessdata,
                lang: lang.to_string(),
            }
        }
    }

    impl OcrBackend for LibTesseract {
        fn recognize(&self, image_bytes: &[u8]) -> Result<String, OcrError> {
            let mut engine = LepTess::new(self.tessdata.as_deref(), &self.lang).map_err(|e| {
                OcrError::NotAvailable(format!("libtesseract ({}): {e}", self.lang))
            })?;
            engine
                .set_image_from_mem(image_bytes)
                .map_err(|e| OcrError::ImageDecode(format!("page image: {e}")))?;
            engine
                .get_utf8_text()
                .map_err(|e| OcrError::Engine(format!("libtesseract: {e}")))
        }
    }
}
