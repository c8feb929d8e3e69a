pub mod acquire;
pub mod preprocess;
pub mod rasterize;
pub mod recognizer;
pub mod text_layer;

pub use acquire::{AcquireError, AcquiredText, TextAcquirer, TextSource};
pub use preprocess::{prepare_for_ocr_from_bytes, PreprocessError};
pub use rasterize::{PageRasterizer, Pdftoppm};
pub use recognizer::{check_binary, MockRecognizer, OcrBackend, OcrError, TesseractCli};
pub use text_layer::{LopdfReader, TextLayerReader};
