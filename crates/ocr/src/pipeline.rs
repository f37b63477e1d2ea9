use std::path::Path;
use thiserror::Error;
use tillroll_core::{LogicalLine, ReceiptSummary};

use crate::extract::{ExtractError, Extractor};
use crate::overlay::OcrPayload;
use crate::recognizer::{OcrBackend, OcrError};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("OCR recognition failed: {0}")]
    Ocr(#[from] OcrError),
    #[error("Malformed OCR payload: {0}")]
    Extract(#[from] ExtractError),
}

/// The result of a single receipt processing run.
#[derive(Debug, Clone)]
pub struct ScanResult {
    /// What the backend returned.
    pub payload: OcrPayload,
    /// Reconstructed rows, in reading order.
    pub lines: Vec<LogicalLine>,
    pub summary: ReceiptSummary,
}

/// Orchestrates: recognize → reconstruct lines → extract.
pub struct ReceiptPipeline<R: OcrBackend> {
    recognizer: R,
    extractor: Extractor,
}

impl<R: OcrBackend> ReceiptPipeline<R> {
    pub fn new(recognizer: R, extractor: Extractor) -> Self {
        Self { recognizer, extractor }
    }

    /// Process an image file on disk.
    pub async fn process_file(&self, path: &Path) -> Result<ScanResult, PipelineError> {
        let bytes = tokio::fs::read(path).await?;
        tracing::info!("Processing receipt: {}", path.display());
        self.process_bytes(&bytes)
    }

    /// Process raw image bytes (camera capture or file read).
    pub fn process_bytes(&self, data: &[u8]) -> Result<ScanResult, PipelineError> {
        let payload = self.recognizer.recognize(data).inspect_err(|e| {
            tracing::warn!("OCR backend error: {e}");
        })?;
        self.process_payload(payload)
    }

    /// Extract from a payload that was recognized elsewhere.
    pub fn process_payload(&self, payload: OcrPayload) -> Result<ScanResult, PipelineError> {
        let lines = self.extractor.lines(&payload)?;
        let summary = self.extractor.summarize(&lines);
        tracing::info!(
            items = summary.items.len(),
            total = summary.total.as_ref().map(|p| p.to_string()).unwrap_or_default(),
            "Receipt extracted"
        );
        Ok(ScanResult { payload, lines, summary })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
