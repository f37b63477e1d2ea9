use regex::Regex;
use thiserror::Error;
use tillroll_core::{LogicalLine, Price, RawWord, ReceiptRecord, ReceiptSummary};
use tracing::debug;

use crate::classify::{Classifier, LineKind};
use crate::config::{ConfigError, DateTimePolicy, ExtractionConfig, LabelCarry, TotalKeywords};
use crate::grouper::RowGrouper;
use crate::lines;
use crate::overlay::{coordinate, OcrPayload};

#[derive(Debug, Error, PartialEq)]
pub enum ExtractError {
    #[error("OCR word '{word}' is missing its `{field}` coordinate")]
    MissingCoordinate { word: String, field: &'static str },
    #[error("OCR word '{word}' has a non-finite `{field}` coordinate: {value}")]
    InvalidCoordinate { word: String, field: &'static str, value: f64 },
    #[error("OCR line '{0}' has no words to position it")]
    UnpositionedLine(String),
}

// ── Total keyword matching ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TotalMatch {
    /// Ends scanning; the record's price is the total.
    Terminating,
    /// Remembered as the total unless a terminating line turns up.
    /// Only the first candidate is kept.
    Candidate,
    None,
}

#[derive(Debug, Clone)]
struct TotalMatcher {
    mode: TotalKeywords,
    phrase: Regex,
    word: String,
    subtotal: Regex,
}

impl TotalMatcher {
    fn new(config: &ExtractionConfig) -> Result<Self, ConfigError> {
        let words: Vec<String> = config.total_phrase.split_whitespace().map(regex::escape).collect();
        let pattern = format!(r"(?i){}", words.join(r"\s*"));
        let phrase = Regex::new(&pattern)
            .map_err(|e| ConfigError::Invalid(format!("total_phrase: {e}")))?;
        let subtotal = Regex::new(&format!("(?i){}", config.subtotal_pattern))
            .map_err(|e| ConfigError::Invalid(format!("subtotal_pattern: {e}")))?;
        Ok(Self {
            mode: config.total_keywords,
            phrase,
            word: config.total_word.trim().to_lowercase(),
            subtotal,
        })
    }

    fn check(&self, label: &str) -> TotalMatch {
        let phrase = || self.phrase.is_match(label);
        let word = || label.to_lowercase().contains(&self.word);
        match self.mode {
            TotalKeywords::Strict if phrase() => TotalMatch::Terminating,
            TotalKeywords::Inclusive if word() => TotalMatch::Terminating,
            TotalKeywords::Layered if phrase() => TotalMatch::Terminating,
            TotalKeywords::Layered if word() => {
                if self.subtotal.is_match(label) {
                    TotalMatch::Candidate
                } else {
                    TotalMatch::Terminating
                }
            }
            _ => TotalMatch::None,
        }
    }
}

// ── Lazy record stream ────────────────────────────────────────────────────────

/// Yields one record per priced line, in order, and stops after the
/// terminating total line.
///
/// `total()` may report a subtotal candidate while the stream is still being
/// consumed; a later terminating line replaces it.
pub struct RecordStream<'a, I> {
    kinds: I,
    totals: &'a TotalMatcher,
    unknown_label: &'a str,
    carry: LabelCarry,
    previous_label: String,
    previous_was_text: bool,
    terminated: bool,
    total: Option<Price>,
    candidate: Option<Price>,
}

impl<'a, I: Iterator<Item = LineKind>> RecordStream<'a, I> {
    fn new(kinds: I, totals: &'a TotalMatcher, unknown_label: &'a str, carry: LabelCarry) -> Self {
        Self {
            kinds,
            totals,
            unknown_label,
            carry,
            previous_label: String::new(),
            previous_was_text: false,
            terminated: false,
            total: None,
            candidate: None,
        }
    }

    /// Whether a terminating total line has been consumed.
    pub fn terminated_early(&self) -> bool {
        self.terminated
    }

    pub fn total(&self) -> Option<&Price> {
        self.total.as_ref().or(self.candidate.as_ref())
    }

    /// The label a following unlabeled price would inherit.
    pub fn last_label(&self) -> &str {
        &self.previous_label
    }
}

impl<I: Iterator<Item = LineKind>> Iterator for RecordStream<'_, I> {
    type Item = ReceiptRecord;

    fn next(&mut self) -> Option<ReceiptRecord> {
        if self.terminated {
            return None;
        }

        for kind in self.kinds.by_ref() {
            let (label, price) = match kind {
                LineKind::Text(text) => {
                    self.previous_label = text;
                    self.previous_was_text = true;
                    continue;
                }
                LineKind::Priced { label, price } => (label, price),
            };

            let follows_text = std::mem::replace(&mut self.previous_was_text, false);
            let take_preceding = self.carry == LabelCarry::PrecedingText
                && follows_text
                && !self.previous_label.is_empty();

            let item = if take_preceding {
                self.previous_label.clone()
            } else if !label.is_empty() {
                label
            } else if !self.previous_label.is_empty() {
                self.previous_label.clone()
            } else {
                self.unknown_label.to_string()
            };
            self.previous_label = item.clone();

            match self.totals.check(&item) {
                TotalMatch::Terminating => {
                    debug!(item = %item, total = %price, "terminating total line");
                    self.terminated = true;
                    self.total = Some(price.clone());
                }
                TotalMatch::Candidate => {
                    debug!(item = %item, total = %price, "candidate total line");
                    if self.candidate.is_none() {
                        self.candidate = Some(price.clone());
                    }
                }
                TotalMatch::None => {}
            }

            return Some(ReceiptRecord::new(item, price));
        }

        None
    }
}

// ── Public extraction API ─────────────────────────────────────────────────────

/// Turns logical lines into a [`ReceiptSummary`] under one configuration.
/// Holds no per-receipt state, so one extractor can serve many receipts.
#[derive(Debug, Clone)]
pub struct Extractor {
    config: ExtractionConfig,
    classifier: Classifier,
    totals: TotalMatcher,
    grouper: RowGrouper,
}

impl Extractor {
    pub fn new(config: ExtractionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let classifier = Classifier::new(&config);
        let totals = TotalMatcher::new(&config)?;
        let grouper = RowGrouper::new(config.height_tolerance, config.row_anchor);
        Ok(Self { config, classifier, totals, grouper })
    }

    /// Plain-text pipeline.
    pub fn extract_text(&self, text: &str) -> ReceiptSummary {
        self.summarize(&lines::plain_lines(text))
    }

    /// Layout-aware pipeline over already-positioned words.
    pub fn extract_words(&self, words: &[RawWord]) -> Result<ReceiptSummary, ExtractError> {
        for word in words {
            coordinate(&word.text, "top", Some(word.top))?;
            coordinate(&word.text, "left", Some(word.left))?;
        }
        Ok(self.summarize(&self.grouper.lines(words)))
    }

    /// Reconstruct logical lines from any OCR payload.
    pub fn lines(&self, payload: &OcrPayload) -> Result<Vec<LogicalLine>, ExtractError> {
        match payload {
            OcrPayload::PlainText(text) => Ok(lines::plain_lines(text)),
            OcrPayload::Overlay(overlay) => {
                lines::overlay_lines(overlay, self.config.overlay_unit, &self.grouper)
            }
        }
    }

    pub fn extract_payload(&self, payload: &OcrPayload) -> Result<ReceiptSummary, ExtractError> {
        Ok(self.summarize(&self.lines(payload)?))
    }

    /// Lazily classify `lines` into records.
    pub fn records<'a>(
        &'a self,
        lines: &'a [LogicalLine],
    ) -> RecordStream<'a, impl Iterator<Item = LineKind> + 'a> {
        let kinds = lines.iter().map(move |line| self.classifier.classify(&line.text));
        RecordStream::new(
            kinds,
            &self.totals,
            &self.config.unknown_item_label,
            self.config.label_carry,
        )
    }

    /// Date/time stamp over every line, independent of where items stop.
    pub fn date_time(&self, lines: &[LogicalLine]) -> Option<String> {
        match self.config.date_time_policy {
            DateTimePolicy::FirstLine => lines.iter().find_map(|line| {
                let date = self.classifier.date_token(&line.text);
                let time = self.classifier.time_token(&line.text);
                join_stamp(date, time)
            }),
            DateTimePolicy::Independent => {
                let mut date = None;
                let mut time = None;
                for line in lines {
                    if date.is_none() {
                        date = self.classifier.date_token(&line.text);
                    }
                    if time.is_none() {
                        time = self.classifier.time_token(&line.text);
                    }
                    if date.is_some() && time.is_some() {
                        break;
                    }
                }
                join_stamp(date, time)
            }
        }
    }

    pub fn summarize(&self, lines: &[LogicalLine]) -> ReceiptSummary {
        let date_time = self.date_time(lines);
        let mut stream = self.records(lines);
        let items: Vec<ReceiptRecord> = stream.by_ref().collect();
        let total = stream.total().cloned();
        let terminated_early = stream.terminated_early();

        debug!(
            lines = lines.len(),
            items = items.len(),
            terminated_early,
            has_total = total.is_some(),
            "summarized receipt"
        );

        ReceiptSummary { date_time, items, total, terminated_early }
    }
}

fn join_stamp(date: Option<&str>, time: Option<&str>) -> Option<String> {
    match (date, time) {
        (Some(d), Some(t)) => Some(format!("{d} {t}")),
        (Some(d), None) => Some(d.to_string()),
        (None, Some(t)) => Some(t.to_string()),
        (None, None) => None,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
