//! Brew-record data models.
//!
//! A record's brew timestamp doubles as its identity: there is at most one
//! record per exact timestamp, and edits replace the record wholesale.

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BrewRecord {
    pub date: DateTime<Utc>,
    pub recipe: Recipe,
    #[serde(default)]
    pub details: BrewDetails,
    pub ratings: Ratings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub bean_type: String,
    pub bean_weight: f64,
    #[serde(default)]
    pub brew_ratio: f64,
    #[serde(default)]
    pub grind_size: String,
    #[serde(default)]
    pub dripper: String,
    pub water_weight: f64,
    pub water_temperature: u32,
    #[serde(default)]
    pub extraction_method: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BrewDetails {
    #[serde(default)]
    pub theme: String,
    #[serde(default)]
    pub summary: String,
}

/// Tasting ratings, each a 0-5 integer. Zero means "not rated".
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Ratings {
    pub satisfaction: u8,
    #[serde(default)]
    pub aroma: u8,
    #[serde(default)]
    pub acidity: u8,
    #[serde(default)]
    pub sweetness: u8,
    #[serde(default)]
    pub bitterness: u8,
    #[serde(default)]
    pub body: u8,
    #[serde(default)]
    pub aftertaste: u8,
}

impl BrewRecord {
    /// Check the fields a record must carry before it may be saved.
    /// The message is surfaced to the user as a warning.
    pub fn validate(&self) -> Result<()> {
        let recipe = &self.recipe;
        if recipe.bean_type.trim().is_empty() {
            bail!("select a bean before saving");
        }
        if !recipe.bean_weight.is_finite() || recipe.bean_weight <= 0.0 {
            bail!("bean weight must be a positive number");
        }
        if !recipe.water_weight.is_finite() || recipe.water_weight <= 0.0 {
            bail!("water weight must be a positive number");
        }
        if recipe.water_temperature == 0 {
            bail!("water temperature must be a positive number");
        }
        if self.ratings.satisfaction == 0 {
            bail!("rate the overall satisfaction before saving");
        }
        Ok(())
    }

    /// True when the record carries tasting notes beyond the overall score.
    pub fn has_tasting_notes(&self) -> bool {
        self.ratings.aroma > 0
    }
}
