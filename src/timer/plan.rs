//! Step sequencing for an armed method.
//!
//! Each cue carries the cumulative elapsed time at which it becomes active:
//! a step's trigger is the sum of the durations of every step up to and
//! including itself, which puts the zero-duration bloom at zero. A trailing
//! completion cue fires at the method's target total time.

use serde::{Deserialize, Serialize};

use crate::models::BrewMethod;

/// Action label of the trailing completion cue.
pub const FINISH_ACTION: &str = "Finish";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StepCue {
    pub action: String,
    pub trigger_secs: u32,
    pub water_amount: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BrewPlan {
    pub method_name: String,
    pub cues: Vec<StepCue>,
    pub total_secs: u32,
}

impl BrewPlan {
    pub fn from_method(method: &BrewMethod) -> Self {
        let mut cues = Vec::with_capacity(method.steps.len() + 1);
        let mut cumulative = 0u32;
        for step in &method.steps {
            cumulative += step.duration_secs();
            cues.push(StepCue {
                action: step.action.clone(),
                trigger_secs: cumulative,
                water_amount: step.water_amount,
            });
        }
        cues.push(StepCue {
            action: FINISH_ACTION.to_string(),
            trigger_secs: method.total_time,
            water_amount: None,
        });

        Self {
            method_name: method.name.clone(),
            cues,
            total_secs: method.total_time,
        }
    }
}

/// Index of the cue active at `elapsed_ms`: the last cue whose trigger time
/// has been reached. `None` before the first trigger and for empty cue lists.
/// Cues sharing a trigger time resolve to the later index.
pub fn active_cue_index(cues: &[StepCue], elapsed_ms: u64) -> Option<usize> {
    cues.iter()
        .rposition(|cue| u64::from(cue.trigger_secs) * 1000 <= elapsed_ms)
}
