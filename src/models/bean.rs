//! Bean inventory data models.
//!
//! Beans are keyed by name and soft-referenced from brew records; deleting a
//! bean leaves records pointing at it untouched.

use anyhow::{bail, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Bean {
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub store_name: String,
    #[serde(default)]
    pub store_url: String,
    #[serde(default)]
    pub roast_level: String,
    #[serde(default)]
    pub roast_date: RoastDate,
    #[serde(default)]
    pub purchase_type: String,
    #[serde(default)]
    pub price: Option<u32>,
    #[serde(default)]
    pub weight: Option<u32>,
    #[serde(default)]
    pub purchase_date: String,
}

impl Bean {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            bail!("enter a name for the bean");
        }
        Ok(())
    }
}

/// A bean's roast date, which the user may not know.
///
/// Serialized as the plain date string or the `"unknown"` sentinel, matching
/// the diary's document format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RoastDate {
    Known(NaiveDate),
    #[default]
    Unknown,
}

const UNKNOWN_SENTINEL: &str = "unknown";

impl RoastDate {
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            RoastDate::Known(date) => Some(*date),
            RoastDate::Unknown => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, RoastDate::Unknown)
    }

    /// Parse a stored roast-date value. Empty strings and anything that is
    /// not a calendar date collapse to `Unknown`.
    fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed == UNKNOWN_SENTINEL {
            return RoastDate::Unknown;
        }
        match trimmed.parse::<NaiveDate>() {
            Ok(date) => RoastDate::Known(date),
            Err(_) => RoastDate::Unknown,
        }
    }
}

impl Serialize for RoastDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RoastDate::Known(date) => serializer.serialize_str(&date.to_string()),
            RoastDate::Unknown => serializer.serialize_str(UNKNOWN_SENTINEL),
        }
    }
}

impl<'de> Deserialize<'de> for RoastDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(RoastDate::parse(&value))
    }
}
