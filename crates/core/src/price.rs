use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A printed receipt amount.
///
/// The digit run is kept exactly as it appeared on the receipt (commas and
/// periods included) so that rendering never invents precision the scan
/// didn't have. Use [`Price::to_cents`] when arithmetic is needed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Price {
    negative: bool,
    amount: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid price: '{0}'")]
pub struct ParsePriceError(pub String);

impl Price {
    /// Build a price from a sign flag and a printed digit run (`"1,234.56"`).
    pub fn new(negative: bool, amount: impl Into<String>) -> Self {
        Self { negative, amount: amount.into() }
    }

    /// Signed value in cents, or `None` when the printed run isn't a number.
    pub fn to_cents(&self) -> Option<i64> {
        let clean = self.amount.replace(',', "");
        let dec = Decimal::from_str(&clean).ok()?;
        let cents = (dec * Decimal::from(100)).round().to_i64()?;
        Some(if self.negative { -cents } else { cents })
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            write!(f, "-${}", self.amount)
        } else {
            write!(f, "${}", self.amount)
        }
    }
}

impl FromStr for Price {
    type Err = ParsePriceError;

    /// Accepts `$1.00`, `-$1.00` and `$-1.00`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (negative, rest) = if let Some(rest) = trimmed.strip_prefix("-$") {
            (true, rest)
        } else if let Some(rest) = trimmed.strip_prefix("$-") {
            (true, rest)
        } else if let Some(rest) = trimmed.strip_prefix('$') {
            (false, rest)
        } else {
            return Err(ParsePriceError(s.to_string()));
        };

        let valid = !rest.is_empty()
            && rest.chars().any(|c| c.is_ascii_digit())
            && rest.chars().all(|c| c.is_ascii_digit() || c == ',' || c == '.');
        if !valid {
            return Err(ParsePriceError(s.to_string()));
        }
        Ok(Price::new(negative, rest))
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
