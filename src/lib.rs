//! Coffee-brewing diary core: records, bean inventory, extraction methods,
//! derived statistics, and the drip timer. The embedding UI talks to [`App`]
//! through [`AppCommand`] dispatch or the typed methods directly.

mod commands;
pub mod metrics;
pub mod models;
pub mod store;
pub mod timer;

use std::path::PathBuf;
use std::sync::RwLock;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::info;

pub use commands::{AppCommand, HistoryEntry};

use metrics::sort::{SortConfig, SortKey};
use models::{Bean, BrewMethod, BrewRecord};
use store::DiaryStore;
use timer::DripTimerController;

/// Initialize logging (reads RUST_LOG, defaults to info). Call once from the
/// embedding host.
pub fn init_logging() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
}

/// The application state: the diary store, the drip-timer controller, and
/// the history sort preference. Constructed once at startup; every mutation
/// goes through its methods.
pub struct App {
    store: DiaryStore,
    timer: DripTimerController,
    sort: RwLock<SortConfig>,
}

impl App {
    pub fn new(data_dir: PathBuf) -> Result<Self> {
        let store = DiaryStore::new(data_dir)?;
        info!("brewlog starting up");

        Ok(Self {
            store,
            timer: DripTimerController::new(),
            sort: RwLock::new(SortConfig::default()),
        })
    }

    /// Construct from the platform data directory.
    pub fn init() -> Result<Self> {
        let data_dir = dirs::data_dir()
            .context("no platform data directory available")?
            .join("brewlog");
        Self::new(data_dir)
    }

    pub fn store(&self) -> &DiaryStore {
        &self.store
    }

    pub fn timer(&self) -> &DripTimerController {
        &self.timer
    }

    // --- Records ---

    pub fn save_record(&self, record: BrewRecord) -> Result<()> {
        record.validate()?;
        self.store.insert_record(record)
    }

    /// Replace the record sharing the given timestamp wholesale. Returns
    /// false when no such record exists.
    pub fn update_record(&self, record: BrewRecord) -> Result<bool> {
        record.validate()?;
        self.store.replace_record(record)
    }

    pub fn delete_record(&self, date: DateTime<Utc>) -> Result<bool> {
        self.store.remove_record(date)
    }

    // --- Beans ---

    pub fn add_bean(&self, bean: Bean) -> Result<()> {
        bean.validate()?;
        self.store.add_bean(bean)
    }

    pub fn update_bean(&self, name: &str, bean: Bean) -> Result<bool> {
        bean.validate()?;
        self.store.replace_bean(name, bean)
    }

    // --- Methods ---

    pub fn add_method(&self, mut method: BrewMethod) -> Result<()> {
        method.validate()?;
        method.normalize_bloom();
        self.store.add_method(method)
    }

    // --- Drip timer ---

    /// Arm the timer with a stored method. Returns false (doing nothing)
    /// when no method carries that name.
    pub async fn arm_timer(&self, method_name: &str) -> Result<bool> {
        let Some(method) = self.store.method(method_name) else {
            return Ok(false);
        };
        self.timer.arm(&method).await;
        Ok(true)
    }

    // --- History ordering ---

    pub fn sort_config(&self) -> SortConfig {
        *self.sort.read().unwrap()
    }

    pub fn set_sort_key(&self, key: SortKey) {
        self.sort.write().unwrap().key = key;
    }

    pub fn toggle_sort_direction(&self) {
        let mut config = self.sort.write().unwrap();
        config.direction = config.direction.toggled();
    }
}
