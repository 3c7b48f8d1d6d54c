pub mod controller;
pub mod plan;
pub mod state;

pub use controller::{DripTimerController, DripTimerSnapshot};
pub use plan::{active_cue_index, BrewPlan, StepCue};
pub use state::{format_clock, DripTimerState, TimerStatus};
