pub mod batch;
pub mod config;
pub mod processor;

pub use batch::{BatchEntry, BatchRecord, BatchSummary};
pub use config::Cli;
pub use processor::{exit, exit_code, preview, PdfProcessor, ProcessError, PREVIEW_CHARS};

pub use platescan_core::ExtractionResult;
pub use platescan_match::{MatchError, PatternRegistry};
