use std::sync::OnceLock;

use regex::{Captures, Regex};
use tillroll_core::Price;

use crate::config::{DateFormat, ExtractionConfig, SignPolicy};

// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

re!(re_date_strict,
    r"\b\d{1,2}/\d{1,2}/\d{4}\b");
re!(re_date_loose,
    r"\b\d{2}[/-]\d{2}[/-](?:\d{4}|\d{2})\b");
re!(re_time,
    r"\b\d{1,2}:\d{2}(?::\d{2})?(?:\s*[AaPp][Mm])?\b");
// `$1.00`, `$ 1.00`, `-$1.00`, `$-1.00`
re!(re_price_prefixed,
    r"(?P<neg>-)?\$\s*(?:(?P<neg_inner>-)\s*)?(?P<amount>[\d,.]*\d)");
// `1.00$`, `-1.00$`
re!(re_price_suffixed,
    r"(?P<neg>-)?\b(?P<amount>\d(?:[\d,.]*\d)?)\s?\$");

/// What a logical line contributes to item scanning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    /// A price with whatever text preceded it (possibly empty).
    Priced { label: String, price: Price },
    /// No price; the text is a label candidate for the next priced line.
    Text(String),
}

/// Per-config line classifier. Patterns are shared; only policies vary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classifier {
    date_format: DateFormat,
    sign_policy: SignPolicy,
}

impl Classifier {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self { date_format: config.date_format, sign_policy: config.sign_policy }
    }

    pub fn classify(&self, text: &str) -> LineKind {
        let text = text.trim();
        match self.find_price(text) {
            Some((start, price)) => LineKind::Priced {
                label: text[..start].trim().to_string(),
                price,
            },
            None => LineKind::Text(text.to_string()),
        }
    }

    pub fn date_token<'t>(&self, text: &'t str) -> Option<&'t str> {
        if let Some(m) = re_date_strict().find(text) {
            return Some(m.as_str());
        }
        match self.date_format {
            DateFormat::Strict => None,
            DateFormat::Loose => re_date_loose().find(text).map(|m| m.as_str()),
        }
    }

    pub fn time_token<'t>(&self, text: &'t str) -> Option<&'t str> {
        re_time().find(text).map(|m| m.as_str())
    }

    /// Byte offset where the price starts, and the price itself.
    /// A `$`-prefixed amount wins over a suffixed one anywhere on the line.
    fn find_price(&self, text: &str) -> Option<(usize, Price)> {
        let caps = re_price_prefixed()
            .captures(text)
            .or_else(|| re_price_suffixed().captures(text))?;
        let start = caps.get(0)?.start();
        let amount = caps.name("amount")?.as_str();
        let negative = match self.sign_policy {
            SignPolicy::Preserve => is_negative(&caps),
            SignPolicy::Ignore => false,
        };
        Some((start, Price::new(negative, amount)))
    }
}

fn is_negative(caps: &Captures<'_>) -> bool {
    caps.name("neg").is_some() || caps.name("neg_inner").is_some()
}
