use serde::{Deserialize, Serialize};
use std::time::Instant;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TimerStatus {
    Idle,
    Running,
    Paused,
}

impl Default for TimerStatus {
    fn default() -> Self {
        TimerStatus::Idle
    }
}

/// Stopwatch core of the drip timer.
///
/// `elapsed_ms` accumulates time from earlier running windows; while running,
/// `running_anchor` marks when the current window began and the true elapsed
/// time is baseline plus anchor age.
#[derive(Debug, Clone, Copy, Default)]
pub struct DripTimerState {
    pub status: TimerStatus,
    pub elapsed_ms: u64,
    pub running_anchor: Option<Instant>,
}

impl DripTimerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Elapsed time at `now`. Non-decreasing while running, frozen otherwise.
    pub fn elapsed_at(&self, now: Instant) -> u64 {
        if let (TimerStatus::Running, Some(anchor)) = (self.status, self.running_anchor) {
            self.elapsed_ms
                .saturating_add(now.saturating_duration_since(anchor).as_millis() as u64)
        } else {
            self.elapsed_ms
        }
    }

    /// Begin (or resume) running. A start while already running is a silent
    /// no-op; the original anchor keeps counting.
    pub fn start(&mut self, now: Instant) {
        if self.status == TimerStatus::Running {
            return;
        }
        self.status = TimerStatus::Running;
        self.running_anchor = Some(now);
    }

    /// Fold the current window into the baseline and stop counting.
    /// Only meaningful while running; otherwise a no-op.
    pub fn pause(&mut self, now: Instant) {
        if self.status != TimerStatus::Running {
            return;
        }
        self.elapsed_ms = self.elapsed_at(now);
        self.running_anchor = None;
        self.status = TimerStatus::Paused;
    }

    /// Back to idle with a zeroed clock. Idempotent.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Render elapsed time as `MM:SS.t`. Derived by floor division; the clock
/// never shows a tenth that has not fully elapsed.
pub fn format_clock(elapsed_ms: u64) -> String {
    let total_secs = elapsed_ms / 1000;
    let minutes = total_secs / 60;
    let seconds = total_secs % 60;
    let tenths = (elapsed_ms / 100) % 10;
    format!("{minutes:02}:{seconds:02}.{tenths}")
}
