//! Extraction-method data models.
//!
//! A method is an ordered list of timed steps. Step durations are relative;
//! the cumulative sum of durations up to a step is the elapsed time at which
//! that step becomes active. The first step is always the zero-duration bloom.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Action label of the mandatory first step.
pub const BLOOM_ACTION: &str = "Bloom";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BrewMethod {
    pub name: String,
    pub steps: Vec<MethodStep>,
    /// Target time for the whole brew, in seconds.
    #[serde(default)]
    pub total_time: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MethodStep {
    pub action: String,
    #[serde(default)]
    pub minutes: u32,
    #[serde(default)]
    pub seconds: u32,
    #[serde(default)]
    pub water_amount: Option<f64>,
}

impl MethodStep {
    pub fn duration_secs(&self) -> u32 {
        self.minutes * 60 + self.seconds
    }

    pub fn bloom(water_amount: Option<f64>) -> Self {
        Self {
            action: BLOOM_ACTION.to_string(),
            minutes: 0,
            seconds: 0,
            water_amount,
        }
    }
}

impl BrewMethod {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            bail!("enter a name for the method");
        }
        if self.steps.is_empty() {
            bail!("add at least one step");
        }
        Ok(())
    }

    /// Force the first step into the bloom convention: zero duration,
    /// keeping whatever water amount the user entered.
    pub fn normalize_bloom(&mut self) {
        if let Some(first) = self.steps.first_mut() {
            first.minutes = 0;
            first.seconds = 0;
        }
    }
}
