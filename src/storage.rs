//! Local persistence for the task collection.
//!
//! The whole collection lives as one JSON document under [`TASKS_KEY`] in a
//! small key-value store. Reads never fail: a missing or unreadable document
//! is treated as an empty collection.

use crate::error::StorageError;
use crate::task::Task;
use log::{debug, warn};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

pub const TASKS_KEY: &str = "taskflow-tasks";

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Task collection adapter over a [`KeyValueStore`].
#[derive(Debug, Clone)]
pub struct TaskStorage<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> TaskStorage<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn load(&self) -> Vec<Task> {
        let data = match self.store.get(TASKS_KEY) {
            Ok(Some(data)) => data,
            Ok(None) => {
                debug!("event=tasks_load status=empty reason=absent");
                return Vec::new();
            }
            Err(err) => {
                warn!("event=tasks_load status=error reason=read error={err}");
                return Vec::new();
            }
        };
        match serde_json::from_str::<Vec<Task>>(&data) {
            Ok(tasks) => {
                debug!("event=tasks_load status=ok count={}", tasks.len());
                tasks
            }
            Err(err) => {
                warn!("event=tasks_load status=error reason=parse error={err}");
                Vec::new()
            }
        }
    }

    pub fn save(&mut self, tasks: &[Task]) -> Result<(), StorageError> {
        let data = serde_json::to_string_pretty(tasks)?;
        self.store.set(TASKS_KEY, &data)?;
        debug!("event=tasks_save status=ok count={}", tasks.len());
        Ok(())
    }
}
