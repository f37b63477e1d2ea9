use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use tillroll_core::{LogicalLine, ReceiptSummary};
use tillroll_ocr::{ExtractionConfig, Extractor, OcrPayload, OcrResponse};

use crate::render;

#[derive(Debug, Args)]
pub struct OutputArgs {
    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Also print the reconstructed lines
    #[arg(long)]
    pub show_lines: bool,
}

#[derive(Debug, Args)]
pub struct ParseArgs {
    /// OCR output file; `.json` is read as an overlay response
    pub input: PathBuf,

    /// Treat the input as plain text even if it is JSON
    #[arg(long)]
    pub plain: bool,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Receipt image (PNG/JPEG)
    pub image: PathBuf,

    /// Tesseract language
    #[arg(long, default_value = "eng")]
    pub lang: String,

    /// Tesseract data directory
    #[arg(long)]
    pub tessdata: Option<String>,

    #[command(flatten)]
    pub output: OutputArgs,
}

pub async fn parse(args: ParseArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let raw = tokio::fs::read_to_string(&args.input)
        .await
        .with_context(|| format!("Failed to read {}", args.input.display()))?;

    let payload = read_payload(&args.input, raw, args.plain)?;
    let config = resolve_config(config_path, &payload)?;
    let extractor = Extractor::new(config)?;

    let summary = extractor.extract_payload(&payload)?;
    let lines = if args.output.show_lines { extractor.lines(&payload)? } else { Vec::new() };
    tracing::info!(items = summary.items.len(), "Parsed {}", args.input.display());

    emit(&summary, &lines, &args.output)
}

#[cfg(feature = "tesseract")]
pub async fn scan(args: ScanArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    use tillroll_ocr::recognizer::tesseract_backend::TesseractRecognizer;
    use tillroll_ocr::ReceiptPipeline;

    let config = match config_path {
        Some(path) => ExtractionConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ExtractionConfig::plain_text(),
    };
    let pipeline = ReceiptPipeline::new(
        TesseractRecognizer::new(args.tessdata.clone(), &args.lang),
        Extractor::new(config)?,
    );
    let result = pipeline
        .process_file(&args.image)
        .await
        .with_context(|| format!("Failed to scan {}", args.image.display()))?;

    emit(&result.summary, &result.lines, &args.output)
}

#[cfg(not(feature = "tesseract"))]
pub async fn scan(args: ScanArgs, _config_path: Option<&Path>) -> anyhow::Result<()> {
    Err(tillroll_ocr::OcrError::NotAvailable)
        .with_context(|| format!("Cannot scan {}", args.image.display()))
}

/// JSON files hold an overlay response; everything else is recognized text.
fn read_payload(path: &Path, raw: String, force_plain: bool) -> anyhow::Result<OcrPayload> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    if force_plain || !is_json {
        return Ok(OcrPayload::PlainText(raw));
    }
    let response = OcrResponse::from_json(&raw)
        .with_context(|| format!("{} is not an OCR response", path.display()))?;
    Ok(response.into_payload()?)
}

/// An explicit config file wins; otherwise the preset matching the payload.
fn resolve_config(path: Option<&Path>, payload: &OcrPayload) -> anyhow::Result<ExtractionConfig> {
    if let Some(path) = path {
        return ExtractionConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()));
    }
    Ok(match payload {
        OcrPayload::PlainText(_) => ExtractionConfig::plain_text(),
        OcrPayload::Overlay(_) => ExtractionConfig::layout_aware(),
    })
}

fn emit(summary: &ReceiptSummary, lines: &[LogicalLine], output: &OutputArgs) -> anyhow::Result<()> {
    for record in render::unreadable_amounts(summary) {
        tracing::warn!(item = %record.item, price = %record.price, "Amount is not a number");
    }
    if output.json {
        println!("{}", serde_json::to_string_pretty(summary)?);
    } else {
        print!("{}", render::summary_text(summary));
    }
    if output.show_lines {
        println!();
        print!("{}", render::lines_text(lines));
    }
    Ok(())
}
