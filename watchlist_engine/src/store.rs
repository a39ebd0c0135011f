//! Durable key/value persistence.
//!
//! The engine only ever stores two things: the ordered ticker list (a string
//! list) and the encoded alert map (a string). Both stores below are plain
//! string-keyed maps; the engine owns the serialization format of its values.
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use log::debug;
use serde_json::{Map, Value};
use watchlist_common::{Result, WatchlistError};

/// String-keyed storage that survives process restarts.
pub trait PersistenceStore: Send {
    /// Reads a string list. `Ok(None)` when the key was never written.
    fn get_string_list(&self, key: &str) -> Result<Option<Vec<String>>>;
    /// Replaces the string list stored under `key`.
    fn set_string_list(&mut self, key: &str, values: &[String]) -> Result<()>;
    /// Reads a string. `Ok(None)` when the key was never written.
    fn get_string(&self, key: &str) -> Result<Option<String>>;
    /// Replaces the string stored under `key`.
    fn set_string(&mut self, key: &str, value: &str) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq)]
enum StoredValue {
    Text(String),
    List(Vec<String>),
}

/// In-memory store. Clones share the same map, so a test can keep a handle
/// while the engine owns another one.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: Arc<Mutex<HashMap<String, StoredValue>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PersistenceStore for MemoryStore {
    fn get_string_list(&self, key: &str) -> Result<Option<Vec<String>>> {
        match self.values.lock()?.get(key) {
            None => Ok(None),
            Some(StoredValue::List(list)) => Ok(Some(list.clone())),
            Some(StoredValue::Text(_)) => Err(WatchlistError::Store(format!(
                "`{}` holds a string, not a list",
                key
            ))),
        }
    }

    fn set_string_list(&mut self, key: &str, values: &[String]) -> Result<()> {
        self.values
            .lock()?
            .insert(key.to_string(), StoredValue::List(values.to_vec()));
        Ok(())
    }

    fn get_string(&self, key: &str) -> Result<Option<String>> {
        match self.values.lock()?.get(key) {
            None => Ok(None),
            Some(StoredValue::Text(text)) => Ok(Some(text.clone())),
            Some(StoredValue::List(_)) => Err(WatchlistError::Store(format!(
                "`{}` holds a list, not a string",
                key
            ))),
        }
    }

    fn set_string(&mut self, key: &str, value: &str) -> Result<()> {
        self.values
            .lock()?
            .insert(key.to_string(), StoredValue::Text(value.to_string()));
        Ok(())
    }
}

/// Store backed by a single JSON object file.
///
/// Every write rewrites the whole file through a sibling temporary file and a
/// rename, so a crash mid-write leaves the previous contents intact.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: Map<String, Value>,
}

impl JsonFileStore {
    /// Opens `path`, treating a missing file as an empty store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let values = if path.exists() {
            let text = fs::read_to_string(&path)?;
            if text.trim().is_empty() {
                Map::new()
            } else {
                match serde_json::from_str::<Value>(&text)? {
                    Value::Object(map) => map,
                    _ => {
                        return Err(WatchlistError::Format(format!(
                            "{} does not contain a JSON object",
                            path.display()
                        )));
                    }
                }
            }
        } else {
            Map::new()
        };
        debug!("Opened store {} with {} keys", path.display(), values.len());
        Ok(Self { path, values })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<()> {
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(&self.values)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl PersistenceStore for JsonFileStore {
    fn get_string_list(&self, key: &str) -> Result<Option<Vec<String>>> {
        match self.values.get(key) {
            None => Ok(None),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str().map(String::from).ok_or_else(|| {
                        WatchlistError::Store(format!("`{}` contains a non-string item", key))
                    })
                })
                .collect::<Result<Vec<_>>>()
                .map(Some),
            Some(_) => Err(WatchlistError::Store(format!(
                "`{}` is not a string list",
                key
            ))),
        }
    }

    fn set_string_list(&mut self, key: &str, values: &[String]) -> Result<()> {
        let items = values.iter().cloned().map(Value::String).collect();
        self.values.insert(key.to_string(), Value::Array(items));
        self.persist()
    }

    fn get_string(&self, key: &str) -> Result<Option<String>> {
        match self.values.get(key) {
            None => Ok(None),
            Some(Value::String(text)) => Ok(Some(text.clone())),
            Some(_) => Err(WatchlistError::Store(format!("`{}` is not a string", key))),
        }
    }

    fn set_string(&mut self, key: &str, value: &str) -> Result<()> {
        self.values
            .insert(key.to_string(), Value::String(value.to_string()));
        self.persist()
    }
}
