//! PDF page rasterization for the OCR fallback.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

use crate::recognizer::{check_binary, OcrError};

pub(crate) const PDFTOPPM_NOT_FOUND: &str =
    "pdftoppm not found. Install with: apt install poppler-utils";

/// Renders every page of a PDF to an encoded image (PNG), in page order.
pub trait PageRasterizer {
    fn render_pages(&self, path: &Path) -> Result<Vec<Vec<u8>>, OcrError>;
}

impl<T: PageRasterizer + ?Sized> PageRasterizer for &T {
    fn render_pages(&self, path: &Path) -> Result<Vec<Vec<u8>>, OcrError> {
        (**self).render_pages(path)
    }
}

/// Rasterizer backed by poppler's `pdftoppm`.
#[derive(Debug, Clone)]
pub struct Pdftoppm {
    program: PathBuf,
    dpi: u32,
}

impl Pdftoppm {
    pub const DEFAULT_DPI: u32 = 300;

    pub fn new(dpi: u32) -> Self {
        Self {
            program: PathBuf::from("pdftoppm"),
            dpi,
        }
    }

    /// Use a specific pdftoppm executable instead of the one on `PATH`.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    pub fn is_available(&self) -> bool {
        check_binary(&self.program)
    }
}

impl Default for Pdftoppm {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DPI)
    }
}

impl PageRasterizer for Pdftoppm {
    fn render_pages(&self, path: &Path) -> Result<Vec<Vec<u8>>, OcrError> {
        let temp_dir = TempDir::new()?;
        let output_prefix = temp_dir.path().join("page");

        let output = Command::new(&self.program)
            .args(["-png", "-r", &self.dpi.to_string()])
            .arg(path)
            .arg(&output_prefix)
            .output();

        match output {
            Ok(out) if out.status.success() => {}
            Ok(out) => {
                let stderr = String::from_utf8_lossy(&out.stderr);
                return Err(OcrError::Render(format!("pdftoppm failed: {}", stderr.trim())));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(OcrError::NotAvailable(PDFTOPPM_NOT_FOUND.to_string()));
            }
            Err(e) => return Err(OcrError::Io(e)),
        }

        // A document without pages renders to nothing and yields empty text.
        let images = collect_page_images(temp_dir.path())?;
        tracing::debug!(pages = images.len(), dpi = self.dpi, "rendered pdf pages");

        images
            .iter()
            .map(|p| fs::read(p).map_err(OcrError::from))
            .collect()
    }
}

/// List `page-N.png` files sorted by page number.
///
/// pdftoppm zero-pads the page number to the width of the last page number
/// (page-1.png, page-01.png, page-001.png), so sort numerically, not lexically.
fn collect_page_images(dir: &Path) -> Result<Vec<PathBuf>, OcrError> {
    let mut pages: Vec<(u32, PathBuf)> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter_map(|path| page_number(&path).map(|n| (n, path)))
        .collect();
    pages.sort_by_key(|(n, _)| *n);
    Ok(pages.into_iter().map(|(_, path)| path).collect())
}

fn page_number(path: &Path) -> Option<u32> {
    if path.extension()? != "png" {
        return None;
    }
    path.file_stem()?
        .to_str()?
        .strip_prefix("page-")?
        .parse()
        .ok()
}
