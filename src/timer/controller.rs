use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use log::info;
use serde::Serialize;
use tokio::{
    sync::{watch, Mutex},
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::models::BrewMethod;

use super::plan::{active_cue_index, BrewPlan};
use super::state::{format_clock, DripTimerState, TimerStatus};

/// Sampling cadence while the timer runs.
const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// What the renderer needs to draw the timer at one instant.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DripTimerSnapshot {
    pub status: TimerStatus,
    pub elapsed_ms: u64,
    pub clock: String,
    pub active_cue: Option<usize>,
    pub method: Option<String>,
}

impl DripTimerSnapshot {
    fn idle() -> Self {
        Self {
            status: TimerStatus::Idle,
            elapsed_ms: 0,
            clock: format_clock(0),
            active_cue: None,
            method: None,
        }
    }
}

struct TimerInner {
    state: DripTimerState,
    plan: Option<BrewPlan>,
}

struct TickerHandle {
    handle: JoinHandle<()>,
    cancel: CancellationToken,
}

/// Drives the drip timer: owns the stopwatch state and the armed step plan,
/// runs the periodic tick task while the timer is running, and publishes a
/// snapshot on every tick over a watch channel.
#[derive(Clone)]
pub struct DripTimerController {
    inner: Arc<Mutex<TimerInner>>,
    ticker: Arc<Mutex<Option<TickerHandle>>>,
    events: watch::Sender<DripTimerSnapshot>,
    tick_interval: Duration,
}

impl Default for DripTimerController {
    fn default() -> Self {
        Self::new()
    }
}

impl DripTimerController {
    pub fn new() -> Self {
        let (events, _) = watch::channel(DripTimerSnapshot::idle());
        Self {
            inner: Arc::new(Mutex::new(TimerInner {
                state: DripTimerState::new(),
                plan: None,
            })),
            ticker: Arc::new(Mutex::new(None)),
            events,
            tick_interval: TICK_INTERVAL,
        }
    }

    /// Subscribe to tick snapshots. The receiver always holds the latest one.
    pub fn subscribe(&self) -> watch::Receiver<DripTimerSnapshot> {
        self.events.subscribe()
    }

    /// Arm the timer with a method's step plan, resetting the clock.
    pub async fn arm(&self, method: &BrewMethod) {
        let mut inner = self.inner.lock().await;
        self.cancel_ticker().await;
        inner.state.reset();
        inner.plan = Some(BrewPlan::from_method(method));
        self.publish(&inner);
        info!("drip timer armed with method '{}'", method.name);
    }

    pub async fn plan(&self) -> Option<BrewPlan> {
        self.inner.lock().await.plan.clone()
    }

    /// Start (or resume) the clock. Starting while already running changes
    /// nothing.
    pub async fn start(&self) -> DripTimerSnapshot {
        let snapshot = {
            let mut inner = self.inner.lock().await;
            if inner.state.status == TimerStatus::Running {
                return snapshot_of(&inner, Instant::now());
            }
            inner.state.start(Instant::now());
            self.publish(&inner)
        };
        self.spawn_ticker().await;
        snapshot
    }

    /// Freeze the clock. A no-op unless running.
    pub async fn pause(&self) -> DripTimerSnapshot {
        let mut inner = self.inner.lock().await;
        self.cancel_ticker().await;
        inner.state.pause(Instant::now());
        self.publish(&inner)
    }

    /// The start/stop button: pause when running, start otherwise.
    pub async fn toggle(&self) -> DripTimerSnapshot {
        let running = {
            let inner = self.inner.lock().await;
            inner.state.status == TimerStatus::Running
        };
        if running {
            self.pause().await
        } else {
            self.start().await
        }
    }

    /// Zero the clock and return to idle, keeping the armed plan. Safe to
    /// call in any state, any number of times.
    pub async fn reset(&self) -> DripTimerSnapshot {
        let mut inner = self.inner.lock().await;
        self.cancel_ticker().await;
        inner.state.reset();
        self.publish(&inner)
    }

    pub async fn snapshot(&self) -> DripTimerSnapshot {
        let inner = self.inner.lock().await;
        snapshot_of(&inner, Instant::now())
    }

    /// Publish the current snapshot to subscribers. Called with the state
    /// lock held so ticks and state changes cannot interleave.
    fn publish(&self, inner: &TimerInner) -> DripTimerSnapshot {
        let snapshot = snapshot_of(inner, Instant::now());
        self.events.send_replace(snapshot.clone());
        snapshot
    }

    async fn spawn_ticker(&self) {
        let mut ticker_guard = self.ticker.lock().await;
        if let Some(ticker) = ticker_guard.take() {
            ticker.cancel.cancel();
            ticker.handle.abort();
        }

        let inner = self.inner.clone();
        let events = self.events.clone();
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let tick_interval = self.tick_interval;

        let handle = tokio::spawn(async move {
            let mut interval = time::interval(tick_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let guard = inner.lock().await;
                        if guard.state.status != TimerStatus::Running {
                            break;
                        }
                        // Send under the lock: once a reset or pause holds
                        // it, no stale running snapshot can follow.
                        events.send_replace(snapshot_of(&guard, Instant::now()));
                    }
                    _ = token.cancelled() => break,
                }
            }
        });

        *ticker_guard = Some(TickerHandle { handle, cancel });
    }

    /// Tear down the tick task. Idempotent; cancelling an idle timer is a
    /// no-op.
    async fn cancel_ticker(&self) {
        if let Some(ticker) = self.ticker.lock().await.take() {
            ticker.cancel.cancel();
            ticker.handle.abort();
        }
    }
}

fn snapshot_of(inner: &TimerInner, now: Instant) -> DripTimerSnapshot {
    let elapsed_ms = inner.state.elapsed_at(now);
    let active_cue = inner
        .plan
        .as_ref()
        .and_then(|plan| active_cue_index(&plan.cues, elapsed_ms));

    DripTimerSnapshot {
        status: inner.state.status,
        elapsed_ms,
        clock: format_clock(elapsed_ms),
        active_cue,
        method: inner.plan.as_ref().map(|plan| plan.method_name.clone()),
    }
}
