//! Durable string preferences.
//!
//! The screen only ever stores one value, the last city picked by the user,
//! under [`CITY_KEY`].

use std::{
    collections::BTreeMap,
    fmt::Debug,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use crate::error::PreferenceError;

/// Key under which the last selected city is persisted.
pub const CITY_KEY: &str = "city";

#[async_trait]
pub trait PreferenceStore: Send + Sync + Debug {
    async fn get(&self, key: &str) -> Result<Option<String>, PreferenceError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError>;
}

/// Preferences kept only for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(key: &str, value: &str) -> Self {
        let store = Self::default();
        store.values.lock().insert(key.to_string(), value.to_string());
        store
    }
}

#[async_trait]
impl PreferenceStore for MemoryPreferenceStore {
    async fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        Ok(self.values.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Preferences stored as a flat TOML table of strings.
#[derive(Debug)]
pub struct FilePreferenceStore {
    path: PathBuf,
    // serializes read-modify-write cycles within this process
    write_lock: tokio::sync::Mutex<()>,
}

impl FilePreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), write_lock: tokio::sync::Mutex::new(()) }
    }

    /// Store in the platform data directory.
    pub fn in_data_dir() -> Result<Self, PreferenceError> {
        let dirs = crate::config::project_dirs().map_err(|_| PreferenceError::NoDataDir)?;
        Ok(Self::new(dirs.data_dir().join("preferences.toml")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<BTreeMap<String, String>, PreferenceError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => return Err(self.io_error(source)),
        };

        toml::from_str(&contents)
            .map_err(|source| PreferenceError::Parse { path: self.display_path(), source })
    }

    fn io_error(&self, source: std::io::Error) -> PreferenceError {
        PreferenceError::Io { path: self.display_path(), source }
    }

    fn display_path(&self) -> String {
        self.path.display().to_string()
    }
}

#[async_trait]
impl PreferenceStore for FilePreferenceStore {
    async fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        let mut values = self.read_all().await?;
        Ok(values.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        let _guard = self.write_lock.lock().await;

        let mut values = self.read_all().await?;
        values.insert(key.to_string(), value.to_string());
        let contents = toml::to_string(&values)?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| self.io_error(e))?;
        }
        tokio::fs::write(&self.path, contents).await.map_err(|e| self.io_error(e))?;

        debug!(key, path = %self.path.display(), "preference stored");
        Ok(())
    }
}
