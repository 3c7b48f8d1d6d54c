//! Diary persistence.
//!
//! The store owns the single in-memory snapshot of the three collections and
//! mirrors each one to its own JSON document in the data directory. Mutations
//! write through synchronously; collections are small enough that accessors
//! hand out clones.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::RwLock,
};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{de::DeserializeOwned, Serialize};

use crate::models::{Bean, BrewMethod, BrewRecord};

pub mod backup;

const RECORDS_FILE: &str = "records.json";
const BEANS_FILE: &str = "beans.json";
const METHODS_FILE: &str = "methods.json";

#[derive(Default)]
struct DiaryData {
    records: Vec<BrewRecord>,
    beans: Vec<Bean>,
    methods: Vec<BrewMethod>,
}

pub struct DiaryStore {
    dir: PathBuf,
    data: RwLock<DiaryData>,
}

impl DiaryStore {
    pub fn new(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create diary directory {}", dir.display()))?;

        let data = DiaryData {
            records: load_collection(&dir.join(RECORDS_FILE)),
            beans: load_collection(&dir.join(BEANS_FILE)),
            methods: load_collection(&dir.join(METHODS_FILE)),
        };

        info!(
            "Diary store loaded from {} ({} records, {} beans, {} methods)",
            dir.display(),
            data.records.len(),
            data.beans.len(),
            data.methods.len()
        );

        Ok(Self {
            dir,
            data: RwLock::new(data),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    // --- Records ---

    pub fn records(&self) -> Vec<BrewRecord> {
        self.data.read().unwrap().records.clone()
    }

    pub fn record(&self, date: DateTime<Utc>) -> Option<BrewRecord> {
        self.data
            .read()
            .unwrap()
            .records
            .iter()
            .find(|r| r.date == date)
            .cloned()
    }

    /// Newest record, if any. Records are kept newest-first.
    pub fn latest_record(&self) -> Option<BrewRecord> {
        self.data.read().unwrap().records.first().cloned()
    }

    pub fn insert_record(&self, record: BrewRecord) -> Result<()> {
        let mut guard = self.data.write().unwrap();
        if guard.records.iter().any(|r| r.date == record.date) {
            bail!("a record with this timestamp already exists");
        }
        guard.records.insert(0, record);
        self.persist(&self.dir.join(RECORDS_FILE), &guard.records)
    }

    /// Replace the record sharing `record.date` wholesale. Returns false
    /// (leaving everything untouched) when no such record exists.
    pub fn replace_record(&self, record: BrewRecord) -> Result<bool> {
        let mut guard = self.data.write().unwrap();
        let Some(slot) = guard.records.iter_mut().find(|r| r.date == record.date) else {
            return Ok(false);
        };
        *slot = record;
        self.persist(&self.dir.join(RECORDS_FILE), &guard.records)?;
        Ok(true)
    }

    pub fn remove_record(&self, date: DateTime<Utc>) -> Result<bool> {
        let mut guard = self.data.write().unwrap();
        let Some(index) = guard.records.iter().position(|r| r.date == date) else {
            return Ok(false);
        };
        guard.records.remove(index);
        self.persist(&self.dir.join(RECORDS_FILE), &guard.records)?;
        Ok(true)
    }

    // --- Beans ---

    pub fn beans(&self) -> Vec<Bean> {
        self.data.read().unwrap().beans.clone()
    }

    pub fn bean(&self, name: &str) -> Option<Bean> {
        self.data
            .read()
            .unwrap()
            .beans
            .iter()
            .find(|b| b.name == name)
            .cloned()
    }

    pub fn add_bean(&self, bean: Bean) -> Result<()> {
        let mut guard = self.data.write().unwrap();
        if guard.beans.iter().any(|b| b.name == bean.name) {
            bail!("a bean with the same name already exists");
        }
        guard.beans.push(bean);
        self.persist(&self.dir.join(BEANS_FILE), &guard.beans)
    }

    /// Replace the bean currently named `name` wholesale (renames allowed).
    /// Returns false when no such bean exists.
    pub fn replace_bean(&self, name: &str, bean: Bean) -> Result<bool> {
        let mut guard = self.data.write().unwrap();
        let Some(slot) = guard.beans.iter_mut().find(|b| b.name == name) else {
            return Ok(false);
        };
        *slot = bean;
        self.persist(&self.dir.join(BEANS_FILE), &guard.beans)?;
        Ok(true)
    }

    /// Delete a bean. Records referencing it by name are left untouched.
    pub fn remove_bean(&self, name: &str) -> Result<bool> {
        let mut guard = self.data.write().unwrap();
        let Some(index) = guard.beans.iter().position(|b| b.name == name) else {
            return Ok(false);
        };
        guard.beans.remove(index);
        self.persist(&self.dir.join(BEANS_FILE), &guard.beans)?;
        Ok(true)
    }

    // --- Methods ---

    pub fn methods(&self) -> Vec<BrewMethod> {
        self.data.read().unwrap().methods.clone()
    }

    pub fn method(&self, name: &str) -> Option<BrewMethod> {
        self.data
            .read()
            .unwrap()
            .methods
            .iter()
            .find(|m| m.name == name)
            .cloned()
    }

    pub fn add_method(&self, method: BrewMethod) -> Result<()> {
        let mut guard = self.data.write().unwrap();
        if guard.methods.iter().any(|m| m.name == method.name) {
            bail!("a method with the same name already exists");
        }
        guard.methods.push(method);
        self.persist(&self.dir.join(METHODS_FILE), &guard.methods)
    }

    pub fn remove_method(&self, name: &str) -> Result<bool> {
        let mut guard = self.data.write().unwrap();
        let Some(index) = guard.methods.iter().position(|m| m.name == name) else {
            return Ok(false);
        };
        guard.methods.remove(index);
        self.persist(&self.dir.join(METHODS_FILE), &guard.methods)?;
        Ok(true)
    }

    // --- Bulk replacement (import) ---

    /// Swap in fully-validated collections and persist all three documents.
    pub fn replace_all(
        &self,
        records: Vec<BrewRecord>,
        beans: Vec<Bean>,
        methods: Vec<BrewMethod>,
    ) -> Result<()> {
        let mut guard = self.data.write().unwrap();
        guard.records = records;
        guard.beans = beans;
        guard.methods = methods;
        self.persist(&self.dir.join(RECORDS_FILE), &guard.records)?;
        self.persist(&self.dir.join(BEANS_FILE), &guard.beans)?;
        self.persist(&self.dir.join(METHODS_FILE), &guard.methods)?;
        Ok(())
    }

    fn persist<T: Serialize>(&self, path: &Path, collection: &[T]) -> Result<()> {
        let serialized = serde_json::to_string_pretty(collection)?;
        fs::write(path, serialized)
            .with_context(|| format!("Failed to write diary document {}", path.display()))
    }
}

fn load_collection<T: DeserializeOwned>(path: &Path) -> Vec<T> {
    if !path.exists() {
        return Vec::new();
    }

    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) => {
            warn!("Failed to read {}: {err}", path.display());
            return Vec::new();
        }
    };

    match serde_json::from_str(&contents) {
        Ok(collection) => collection,
        Err(err) => {
            warn!("Failed to parse {}: {err}", path.display());
            Vec::new()
        }
    }
}
