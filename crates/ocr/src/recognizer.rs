use thiserror::Error;

use crate::overlay::OcrPayload;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Image decode error: {0}")]
    ImageDecode(String),
    #[error("OCR engine error: {0}")]
    Engine(String),
    #[error("OCR backend reported an error: {0}")]
    Backend(String),
    #[error("Invalid OCR response: {0}")]
    Response(#[from] serde_json::Error),
    #[error("Tesseract not available; build with `tesseract` feature")]
    NotAvailable,
}

/// Abstraction over an OCR backend.
/// Implementations accept raw PNG/JPEG image bytes and return either flat
/// text or text with word positions.
pub trait OcrBackend: Send + Sync {
    fn recognize(&self, image_bytes: &[u8]) -> Result<OcrPayload, OcrError>;
}

// ── Mock backend (always available, used for tests) ───────────────────────────

/// Returns a pre-set payload regardless of the image.
pub struct MockRecognizer {
    pub payload: OcrPayload,
}

impl MockRecognizer {
    pub fn new(text: impl Into<String>) -> Self {
        Self { payload: OcrPayload::PlainText(text.into()) }
    }

    pub fn with_payload(payload: OcrPayload) -> Self {
        Self { payload }
    }
}

impl OcrBackend for MockRecognizer {
    fn recognize(&self, _image_bytes: &[u8]) -> Result<OcrPayload, OcrError> {
        Ok(self.payload.clone())
    }
}

// ── Tesseract backend (optional, gated behind `tesseract` feature) ─────────────

#[cfg(feature = "tesseract")]
pub mod tesseract_backend {
    use super::{OcrBackend, OcrError};
    use crate::overlay::OcrPayload;
    use leptess::LepTess;

    pub struct TesseractRecognizer {
        data_path: Option<String>,
        lang: String,
    }

    impl TesseractRecognizer {
        pub fn new(data_path: Option<String>, lang: &str) -> Self {
            Self { data_path, lang: lang.to_string() }
        }
    }

    impl OcrBackend for TesseractRecognizer {
        fn recognize(&self, image_bytes: &[u8]) -> Result<OcrPayload, OcrError> {
            let mut lt = LepTess::new(self.data_path.as_deref(), &self.lang)
                .map_err(|e| OcrError::Engine(e.to_string()))?;
            lt.set_image_from_mem(image_bytes)
                .map_err(|e| OcrError::ImageDecode(e.to_string()))?;
            let text = lt.get_utf8_text().map_err(|e| OcrError::Engine(e.to_string()))?;
            Ok(OcrPayload::PlainText(text))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::{OverlayLine, OverlayWord};

    #[test]
    fn mock_returns_preset_text() {
        let r = MockRecognizer::new("Coffee $3.50\nOrder Total $3.50");
        assert_eq!(
            r.recognize(b"fake image data").unwrap(),
            OcrPayload::PlainText("Coffee $3.50\nOrder Total $3.50".into())
        );
    }

    #[test]
    fn mock_returns_preset_overlay() {
        let payload = OcrPayload::Overlay(vec![OverlayLine::new(
            "Bagel $2.25",
            vec![OverlayWord::new("Bagel", 10.0, 0.0), OverlayWord::new("$2.25", 10.0, 80.0)],
        )]);
        let r = MockRecognizer::with_payload(payload.clone());
        assert_eq!(r.recognize(b"").unwrap(), payload);
    }

    #[test]
    fn backend_error_message_is_readable() {
        let e = OcrError::Backend("Timed out".into());
        assert_eq!(e.to_string(), "OCR backend reported an error: Timed out");
    }
}
