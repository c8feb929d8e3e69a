use image::{imageops::FilterType, DynamicImage, GrayImage, ImageFormat};
use std::io::Cursor;
use thiserror::Error;

/// Longest edge handed to the OCR engine. Receipts rendered at 300 DPI easily
/// exceed this and only slow recognition down.
pub const MAX_PAGE_EDGE: u32 = 2800;

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("Failed to load page image: {0}")]
    Load(#[from] image::ImageError),
    #[error("Failed to encode page image: {0}")]
    Encode(String),
}

/// Decode a rendered page (PNG / JPEG / …), clean it up for OCR and return
/// it re-encoded as PNG.
pub fn prepare_for_ocr_from_bytes(data: &[u8]) -> Result<Vec<u8>, PreprocessError> {
    let page = image::load_from_memory(data)?;
    encode_png(&DynamicImage::ImageLuma8(clean_page(page)))
}

/// Downscale, convert to grayscale and stretch contrast to the full 0..=255 range.
fn clean_page(page: DynamicImage) -> GrayImage {
    let page = if page.width().max(page.height()) > MAX_PAGE_EDGE {
        page.resize(MAX_PAGE_EDGE, MAX_PAGE_EDGE, FilterType::Lanczos3)
    } else {
        page
    };

    let mut gray = page.into_luma8();
    let (lo, hi) = gray
        .pixels()
        .fold((u8::MAX, u8::MIN), |(lo, hi), p| (lo.min(p[0]), hi.max(p[0])));

    // Blank or already full-range pages need no stretching.
    if hi <= lo || (lo == u8::MIN && hi == u8::MAX) {
        return gray;
    }

    let span = u32::from(hi - lo);
    for p in gray.pixels_mut() {
        p[0] = (u32::from(p[0] - lo) * 255 / span) as u8;
    }
    gray
}

fn encode_png(page: &DynamicImage) -> Result<Vec<u8>, PreprocessError> {
    let mut buf = Vec::new();
    page.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .map_err(|e| PreprocessError::Encode(e.to_string()))?;
    Ok(buf)
}
