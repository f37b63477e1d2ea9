use serde::{Deserialize, Serialize};
use tillroll_core::RawWord;

use crate::extract::ExtractError;
use crate::recognizer::OcrError;

/// What an OCR backend hands over for extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OcrPayload {
    /// Newline-delimited recognized text.
    PlainText(String),
    /// Recognized lines with per-word positions.
    Overlay(Vec<OverlayLine>),
}

impl OcrPayload {
    pub fn is_empty(&self) -> bool {
        match self {
            OcrPayload::PlainText(text) => text.trim().is_empty(),
            OcrPayload::Overlay(lines) => lines.iter().all(|l| l.words.is_empty()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayLine {
    #[serde(alias = "LineText", default)]
    pub text: String,
    #[serde(alias = "Words", default)]
    pub words: Vec<OverlayWord>,
}

/// A word as reported by the backend. Coordinates are optional here only so
/// that a malformed response can be reported instead of silently defaulted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayWord {
    #[serde(alias = "WordText", default)]
    pub text: String,
    #[serde(alias = "Top")]
    pub top: Option<f64>,
    #[serde(alias = "Left")]
    pub left: Option<f64>,
}

impl OverlayWord {
    pub fn new(text: impl Into<String>, top: f64, left: f64) -> Self {
        Self { text: text.into(), top: Some(top), left: Some(left) }
    }

    pub fn to_raw(&self) -> Result<RawWord, ExtractError> {
        let top = coordinate(&self.text, "top", self.top)?;
        let left = coordinate(&self.text, "left", self.left)?;
        Ok(RawWord::new(self.text.clone(), top, left))
    }
}

pub(crate) fn coordinate(
    word: &str,
    field: &'static str,
    value: Option<f64>,
) -> Result<f64, ExtractError> {
    match value {
        None => Err(ExtractError::MissingCoordinate { word: word.to_string(), field }),
        Some(v) if !v.is_finite() => {
            Err(ExtractError::InvalidCoordinate { word: word.to_string(), field, value: v })
        }
        Some(v) => Ok(v),
    }
}

impl OverlayLine {
    pub fn new(text: impl Into<String>, words: Vec<OverlayWord>) -> Self {
        Self { text: text.into(), words }
    }

    /// The whole line as one positioned unit at the minimum top/left of its words.
    pub fn to_raw(&self) -> Result<RawWord, ExtractError> {
        if self.words.is_empty() {
            return Err(ExtractError::UnpositionedLine(self.text.clone()));
        }
        let mut top = f64::INFINITY;
        let mut left = f64::INFINITY;
        for word in &self.words {
            let raw = word.to_raw()?;
            top = top.min(raw.top);
            left = left.min(raw.left);
        }
        Ok(RawWord::new(self.text.clone(), top, left))
    }
}

// ── Overlay response (JSON) ───────────────────────────────────────────────────

/// Generic OCR-with-overlay response body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OcrResponse {
    #[serde(default)]
    pub parsed_results: Vec<ParsedResult>,
    #[serde(default)]
    pub is_errored_on_processing: bool,
    /// A string or a list of strings, depending on the failure.
    #[serde(default)]
    pub error_message: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ParsedResult {
    #[serde(default)]
    pub parsed_text: String,
    #[serde(default)]
    pub text_overlay: Option<TextOverlay>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TextOverlay {
    #[serde(default)]
    pub lines: Vec<OverlayLine>,
}

impl OcrResponse {
    pub fn from_json(json: &str) -> Result<Self, OcrError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Overlay lines win over parsed text when the backend supplied both.
    pub fn into_payload(self) -> Result<OcrPayload, OcrError> {
        if self.is_errored_on_processing {
            return Err(OcrError::Backend(error_text(self.error_message.as_ref())));
        }

        let Some(first) = self.parsed_results.into_iter().next() else {
            return Ok(OcrPayload::PlainText(String::new()));
        };

        match first.text_overlay {
            Some(overlay) if !overlay.lines.is_empty() => Ok(OcrPayload::Overlay(overlay.lines)),
            _ => Ok(OcrPayload::PlainText(first.parsed_text)),
        }
    }
}

fn error_text(message: Option<&serde_json::Value>) -> String {
    use serde_json::Value;
    match message {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Array(parts)) if !parts.is_empty() => parts
            .iter()
            .map(|p| p.as_str().map(str::to_string).unwrap_or_else(|| p.to_string()))
            .collect::<Vec<_>>()
            .join("; "),
        Some(Value::Null) | None => "Unknown error occurred.".to_string(),
        Some(Value::String(_)) | Some(Value::Array(_)) => "Unknown error occurred.".to_string(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OVERLAY_RESPONSE: &str = r#"{
        "ParsedResults": [{
            "ParsedText": "Coffee $3.50\r\nOrder Total $3.50\r\n",
            "TextOverlay": {
                "Lines": [
                    {"LineText": "Coffee $3.50", "Words": [
                        {"WordText": "Coffee", "Left": 10, "Top": 100, "Height": 12, "Width": 50},
                        {"WordText": "$3.50", "Left": 200, "Top": 101, "Height": 12, "Width": 40}
                    ]},
                    {"LineText": "Order Total $3.50", "Words": [
                        {"WordText": "Order", "Left": 10, "Top": 130, "Height": 12, "Width": 40}
                    ]}
                ]
            }
        }],
        "IsErroredOnProcessing": false
    }"#;

    #[test]
    fn response_prefers_overlay_lines() {
        let payload = OcrResponse::from_json(OVERLAY_RESPONSE).unwrap().into_payload().unwrap();
        let OcrPayload::Overlay(lines) = payload else {
            panic!("expected overlay payload");
        };
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "Coffee $3.50");
        assert_eq!(lines[0].words[1], OverlayWord::new("$3.50", 101.0, 200.0));
    }

    #[test]
    fn response_without_overlay_falls_back_to_text() {
        let json = r#"{"ParsedResults": [{"ParsedText": "Milk $2.00"}]}"#;
        let payload = OcrResponse::from_json(json).unwrap().into_payload().unwrap();
        assert_eq!(payload, OcrPayload::PlainText("Milk $2.00".into()));
    }

    #[test]
    fn response_without_results_is_empty_text() {
        let payload = OcrResponse::from_json("{}").unwrap().into_payload().unwrap();
        assert!(payload.is_empty());
    }

    #[test]
    fn errored_response_carries_backend_message() {
        let json = r#"{"IsErroredOnProcessing": true, "ErrorMessage": ["File too large", "Max 1MB"]}"#;
        let err = OcrResponse::from_json(json).unwrap().into_payload().unwrap_err();
        assert_eq!(err.to_string(), "OCR backend reported an error: File too large; Max 1MB");
    }

    #[test]
    fn errored_response_without_message_uses_placeholder() {
        let json = r#"{"IsErroredOnProcessing": true}"#;
        let err = OcrResponse::from_json(json).unwrap().into_payload().unwrap_err();
        assert!(err.to_string().ends_with("Unknown error occurred."));
    }

    #[test]
    fn malformed_json_is_response_error() {
        assert!(matches!(OcrResponse::from_json("{not json"), Err(OcrError::Response(_))));
    }

    #[test]
    fn word_missing_top_fails_fast() {
        let word = OverlayWord { text: "Bagel".into(), top: None, left: Some(3.0) };
        assert_eq!(
            word.to_raw().unwrap_err(),
            ExtractError::MissingCoordinate { word: "Bagel".into(), field: "top" }
        );
    }

    #[test]
    fn word_with_nan_left_fails_fast() {
        let word = OverlayWord { text: "Bagel".into(), top: Some(1.0), left: Some(f64::NAN) };
        assert!(matches!(
            word.to_raw(),
            Err(ExtractError::InvalidCoordinate { field: "left", .. })
        ));
    }

    #[test]
    fn line_positions_at_minimum_word_coordinates() {
        let line = OverlayLine::new(
            "Order Total $9.99",
            vec![OverlayWord::new("Order", 102.0, 40.0), OverlayWord::new("Total", 99.0, 90.0)],
        );
        assert_eq!(line.to_raw().unwrap(), RawWord::new("Order Total $9.99", 99.0, 40.0));
    }

    #[test]
    fn line_without_words_cannot_be_positioned() {
        let line = OverlayLine::new("floating", vec![]);
        assert_eq!(line.to_raw().unwrap_err(), ExtractError::UnpositionedLine("floating".into()));
    }
}
