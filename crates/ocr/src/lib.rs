pub mod classify;
pub mod config;
pub mod extract;
pub mod grouper;
pub mod lines;
pub mod overlay;
pub mod pipeline;
pub mod recognizer;

pub use classify::{Classifier, LineKind};
pub use config::{
    ConfigError, DateFormat, DateTimePolicy, ExtractionConfig, LabelCarry, OverlayUnit,
    RowAnchor, SignPolicy, TotalKeywords,
};
pub use extract::{ExtractError, Extractor, RecordStream};
pub use grouper::{Positioned, RowGrouper};
pub use overlay::{OcrPayload, OcrResponse, OverlayLine, OverlayWord};
pub use pipeline::{PipelineError, ReceiptPipeline, ScanResult};
pub use recognizer::{MockRecognizer, OcrBackend, OcrError};
pub use tillroll_core::{LogicalLine, Price, RawWord, ReceiptRecord, ReceiptSummary};
