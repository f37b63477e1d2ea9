use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Which top a word is compared against when deciding row membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowAnchor {
    /// The top of the first word in the row.
    #[default]
    GroupFirst,
    /// The top of the most recently added word.
    LastAdded,
}

/// Unit of overlay input that gets grouped into rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayUnit {
    #[default]
    Word,
    /// Whole OCR lines, positioned by the minimum top/left of their words.
    Line,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateFormat {
    /// `M/D/YYYY` only.
    #[default]
    Strict,
    /// `M/D/YYYY`, then `MM-DD-YY[YY]` or `MM/DD/YY[YY]`.
    Loose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateTimePolicy {
    /// The first line holding a date or a time fixes the stamp.
    #[default]
    FirstLine,
    /// First date and first time are found independently, possibly on
    /// different lines, then joined.
    Independent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignPolicy {
    #[default]
    Preserve,
    Ignore,
}

/// Which label an item takes when its price line follows a text-only line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelCarry {
    /// Carry the previous label only when the price line has no text of its own.
    #[default]
    EmptyOnly,
    /// A price line directly below a text-only line always takes that line's
    /// text, even if it has its own leading text.
    PrecedingText,
}

/// How labels are matched against total keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TotalKeywords {
    /// Only the total phrase terminates.
    #[default]
    Strict,
    /// The bare total word anywhere in the label terminates.
    Inclusive,
    /// The phrase or the bare word terminates, except on labels matching
    /// `subtotal_pattern`. The first such subtotal supplies the total when
    /// nothing terminates.
    Layered,
}

/// Every policy knob of the extraction core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Max vertical distance (page units) for two words to share a row.
    pub height_tolerance: f64,
    pub row_anchor: RowAnchor,
    pub overlay_unit: OverlayUnit,
    pub date_format: DateFormat,
    pub date_time_policy: DateTimePolicy,
    pub sign_policy: SignPolicy,
    pub label_carry: LabelCarry,
    pub total_keywords: TotalKeywords,
    /// Phrase that ends item scanning. Words may be separated by any
    /// amount of whitespace, or none.
    pub total_phrase: String,
    pub total_word: String,
    /// Case-insensitive regex for bare-word labels that never terminate
    /// under [`TotalKeywords::Layered`].
    pub subtotal_pattern: String,
    /// Item name used when a price has no label and nothing precedes it.
    pub unknown_item_label: String,
}

impl ExtractionConfig {
    /// Settings for overlay input with word coordinates.
    pub fn layout_aware() -> Self {
        Self {
            height_tolerance: 10.0,
            row_anchor: RowAnchor::GroupFirst,
            overlay_unit: OverlayUnit::Word,
            date_format: DateFormat::Strict,
            date_time_policy: DateTimePolicy::FirstLine,
            sign_policy: SignPolicy::Preserve,
            label_carry: LabelCarry::EmptyOnly,
            total_keywords: TotalKeywords::Strict,
            total_phrase: "order total".to_string(),
            total_word: "total".to_string(),
            subtotal_pattern: r"sub\s*-?\s*total".to_string(),
            unknown_item_label: "(unknown item)".to_string(),
        }
    }

    /// Settings for flat newline-delimited text.
    pub fn plain_text() -> Self {
        Self {
            date_format: DateFormat::Loose,
            total_keywords: TotalKeywords::Layered,
            ..Self::layout_aware()
        }
    }

    pub fn from_toml(toml_content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.height_tolerance.is_finite() || self.height_tolerance < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "height_tolerance must be a non-negative number, got {}",
                self.height_tolerance
            )));
        }
        if self.total_phrase.trim().is_empty() {
            return Err(ConfigError::Invalid("total_phrase must not be empty".into()));
        }
        if self.total_word.trim().is_empty() {
            return Err(ConfigError::Invalid("total_word must not be empty".into()));
        }
        if self.subtotal_pattern.trim().is_empty() {
            return Err(ConfigError::Invalid("subtotal_pattern must not be empty".into()));
        }
        if self.unknown_item_label.trim().is_empty() {
            return Err(ConfigError::Invalid("unknown_item_label must not be empty".into()));
        }
        Ok(())
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self::layout_aware()
    }
}
