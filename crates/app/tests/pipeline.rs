use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
use platescan::{exit, PatternRegistry, PdfProcessor};
use platescan_ocr::{AcquireError, MockRecognizer, OcrError, PageRasterizer, TextAcquirer, TextLayerReader};

/// A scanned document: the text layer is present but blank.
struct ScannedReader {
    pages: usize,
}

impl TextLayerReader for ScannedReader {
    fn page_texts(&self, _path: &Path) -> Result<Vec<String>, AcquireError> {
        Ok(vec![String::new(); self.pages])
    }
}

struct PngRasterizer {
    pages: usize,
}

impl PageRasterizer for PngRasterizer {
    fn render_pages(&self, _path: &Path) -> Result<Vec<Vec<u8>>, OcrError> {
        let img: GrayImage = ImageBuffer::from_fn(8, 8, |x, y| Luma([((x + y) * 16) as u8]));
        let mut buf = Vec::new();
        DynamicImage::ImageLuma8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        Ok(vec![buf; self.pages])
    }
}

fn scanned_processor(ocr_text: &str, pages: usize) -> PdfProcessor<ScannedReader, PngRasterizer, MockRecognizer> {
    PdfProcessor::with_parts(
        TextAcquirer::new(
            ScannedReader { pages },
            PngRasterizer { pages },
            MockRecognizer::new(ocr_text),
        ),
        PatternRegistry::new(),
    )
}

fn pdf_on_disk() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scan.pdf");
    std::fs::write(&path, b"%PDF-1.4").unwrap();
    (dir, path)
}

#[test]
fn scanned_receipt_is_identified_through_ocr() {
    let (_dir, path) = pdf_on_disk();
    let processor = scanned_processor("BURGER  LAB\nSmash Burger 1,250", 2);

    let mut out = Vec::new();
    let result = processor.process_pdf_to(&path, true, &mut out).unwrap();

    assert_eq!(
        result.text,
        "BURGER  LAB\nSmash Burger 1,250\nBURGER  LAB\nSmash Burger 1,250\n"
    );
    assert_eq!(result.restaurant.as_deref(), Some("burger_lab"));
    assert!(result.success);
    assert_eq!(platescan::exit_code(&Ok(result)), exit::IDENTIFIED);
}

#[test]
fn processors_keep_separate_registries() {
    let (_dir, path) = pdf_on_disk();
    let mut extended = scanned_processor("Taco Bell #4411", 1);
    let stock = scanned_processor("Taco Bell #4411", 1);

    extended
        .add_restaurant_pattern("taco_bell", &[r"taco\s*bell", r"tb\s*restaurant", r"live\s*mas"])
        .unwrap();

    assert_eq!(extended.process(&path).unwrap().restaurant.as_deref(), Some("taco_bell"));
    assert_eq!(stock.process(&path).unwrap().restaurant, None);
}

#[test]
fn batch_mixes_hits_misses_and_missing_files() {
    let (dir, path) = pdf_on_disk();
    let processor = scanned_processor("Subway Eat Fresh", 1);
    let files = vec![path, dir.path().join("receipt2.pdf")];

    let summary = processor.process_batch_silent(&files);
    assert_eq!(summary.successful(), 1);
    assert_eq!(summary.entries[0].restaurant(), Some("subway"));
    assert!(summary.entries[1].outcome.as_ref().unwrap_err().is_not_found());
    assert_eq!(summary.exit_code(), exit::NOT_FOUND);
}
