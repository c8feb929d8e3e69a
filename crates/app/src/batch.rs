use std::io::{self, Write};
use std::path::{Path, PathBuf};

use platescan_core::ExtractionResult;
use platescan_ocr::{OcrBackend, PageRasterizer, TextLayerReader};
use serde::Serialize;

use crate::processor::{exit_code, PdfProcessor, ProcessError};

/// Outcome for one file of a batch run.
#[derive(Debug)]
pub struct BatchEntry {
    pub path: PathBuf,
    pub outcome: Result<ExtractionResult, ProcessError>,
}

impl BatchEntry {
    pub fn success(&self) -> bool {
        self.outcome.as_ref().is_ok_and(|r| r.success)
    }

    pub fn restaurant(&self) -> Option<&str> {
        self.outcome.as_ref().ok()?.restaurant.as_deref()
    }

    pub fn exit_code(&self) -> u8 {
        exit_code(&self.outcome)
    }
}

/// Flat, serializable view of a batch entry.
#[derive(Debug, Serialize)]
pub struct BatchRecord<'a> {
    pub file: &'a Path,
    pub restaurant: Option<&'a str>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Default)]
pub struct BatchSummary {
    pub entries: Vec<BatchEntry>,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.entries.len()
    }

    pub fn successful(&self) -> usize {
        self.entries.iter().filter(|e| e.success()).count()
    }

    /// Highest per-file exit code, so any failure outranks a mere miss.
    pub fn exit_code(&self) -> u8 {
        self.entries.iter().map(BatchEntry::exit_code).max().unwrap_or(0)
    }

    pub fn records(&self) -> Vec<BatchRecord<'_>> {
        self.entries
            .iter()
            .map(|e| BatchRecord {
                file: &e.path,
                restaurant: e.restaurant(),
                success: e.success(),
                error: e.outcome.as_ref().err().map(ToString::to_string),
            })
            .collect()
    }

    pub fn write_report<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "\n=== Batch Processing Summary ===")?;
        writeln!(out, "Successfully processed: {}/{}", self.successful(), self.total())?;
        for entry in &self.entries {
            let mark = if entry.success() { "✓" } else { "✗" };
            match &entry.outcome {
                Ok(result) => writeln!(
                    out,
                    "{mark} {}: {}",
                    entry.path.display(),
                    result.restaurant.as_deref().unwrap_or("Unknown")
                )?,
                Err(e) => writeln!(out, "{mark} {}: Unknown ({e})", entry.path.display())?,
            }
        }
        Ok(())
    }
}

impl<L, P, R> PdfProcessor<L, P, R>
where
    L: TextLayerReader,
    P: PageRasterizer,
    R: OcrBackend,
{
    /// Process files one after another. A failing file is recorded and the
    /// batch moves on.
    pub fn process_batch<W: Write>(
        &self,
        paths: &[PathBuf],
        show_preview: bool,
        out: &mut W,
    ) -> BatchSummary {
        let entries = paths
            .iter()
            .map(|path| {
                let outcome = self.process_pdf_to(path, show_preview, out);
                if let Err(e) = &outcome {
                    tracing::warn!(path = %path.display(), error = %e, "failed to process file");
                    let _ = writeln!(out, "Error: {e}");
                }
                BatchEntry { path: path.clone(), outcome }
            })
            .collect();
        BatchSummary { entries }
    }

    /// Silent batch run, no progress output.
    pub fn process_batch_silent(&self, paths: &[PathBuf]) -> BatchSummary {
        let entries = paths
            .iter()
            .map(|path| BatchEntry {
                path: path.clone(),
                outcome: self.process(path).map_err(ProcessError::from),
            })
            .collect();
        BatchSummary { entries }
    }
}
