//! History ordering.

use serde::{Deserialize, Serialize};

use crate::metrics::days_since_roast;
use crate::models::{Bean, BrewRecord};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    Date,
    Satisfaction,
    BeanType,
    DaysSinceRoast,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SortConfig {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl Default for SortConfig {
    fn default() -> Self {
        // History opens newest-first.
        Self {
            key: SortKey::Date,
            direction: SortDirection::Desc,
        }
    }
}

/// Stable sort of the history view. Records whose days-since-roast is
/// unknown sort as -1, below every known value.
pub fn sort_records(records: &mut [BrewRecord], config: SortConfig, beans: &[Bean]) {
    records.sort_by(|a, b| {
        let ordering = match config.key {
            SortKey::Date => a.date.cmp(&b.date),
            SortKey::Satisfaction => a.ratings.satisfaction.cmp(&b.ratings.satisfaction),
            SortKey::BeanType => a.recipe.bean_type.cmp(&b.recipe.bean_type),
            SortKey::DaysSinceRoast => {
                let days_a = days_since_roast(a.date, &a.recipe.bean_type, beans).unwrap_or(-1);
                let days_b = days_since_roast(b.date, &b.recipe.bean_type, beans).unwrap_or(-1);
                days_a.cmp(&days_b)
            }
        };
        match config.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}
