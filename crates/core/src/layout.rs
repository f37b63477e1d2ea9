use serde::{Deserialize, Serialize};

/// One recognized token with its position on the page, as reported by an
/// overlay-capable OCR backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawWord {
    pub text: String,
    pub top: f64,
    pub left: f64,
}

impl RawWord {
    pub fn new(text: impl Into<String>, top: f64, left: f64) -> Self {
        Self { text: text.into(), top, left }
    }
}

/// A reconstructed row of receipt text. The unit of classification.
///
/// For plain text the position is the line's index in the input; for
/// overlay input it is the anchor top of the row's group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicalLine {
    pub text: String,
    pub vertical_position: f64,
}

impl LogicalLine {
    pub fn new(text: impl Into<String>, vertical_position: f64) -> Self {
        Self { text: text.into(), vertical_position }
    }
}
