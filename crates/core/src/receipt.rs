use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::price::Price;

/// A single priced line of a receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptRecord {
    pub item: String,
    pub price: Price,
}

impl ReceiptRecord {
    pub fn new(item: impl Into<String>, price: Price) -> Self {
        Self { item: item.into(), price }
    }
}

/// The structured result of reading one receipt.
///
/// `date_time` and `total` are `None` when nothing was found; they
/// serialize as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptSummary {
    #[serde(with = "empty_is_none")]
    pub date_time: Option<String>,
    pub items: Vec<ReceiptRecord>,
    #[serde(with = "empty_is_none")]
    pub total: Option<Price>,
    /// Whether item scanning stopped at a terminating total line.
    #[serde(default)]
    pub terminated_early: bool,
}

impl ReceiptSummary {
    pub fn is_empty(&self) -> bool {
        self.date_time.is_none() && self.items.is_empty() && self.total.is_none()
    }

    /// Calendar date of the stamp, read as month/day/year.
    pub fn date(&self) -> Option<NaiveDate> {
        self.date_time
            .as_deref()?
            .split_whitespace()
            .find_map(parse_us_date)
    }
}

fn parse_us_date(token: &str) -> Option<NaiveDate> {
    let mut parts = token.split(['/', '-']);
    let month: u32 = parts.next()?.parse().ok()?;
    let day: u32 = parts.next()?.parse().ok()?;
    let year: i32 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    NaiveDate::from_ymd_opt(expand_year(year), month, day)
}

fn expand_year(y: i32) -> i32 {
    if y < 100 { 2000 + y } else { y }
}

/// Serde adapter mapping `None` <-> `""` for display/parse types.
mod empty_is_none {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::fmt::Display;
    use std::str::FromStr;

    pub fn serialize<T: Display, S: Serializer>(
        value: &Option<T>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.collect_str(v),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        T: FromStr,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        if s.is_empty() {
            return Ok(None);
        }
        s.parse().map(Some).map_err(serde::de::Error::custom)
    }
}
