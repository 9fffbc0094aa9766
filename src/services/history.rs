//! File-backed search history.
//!
//! The whole history lives in one JSON array of `{id, name}` objects. Every
//! operation reads the full file, mutates an in-memory copy and writes the
//! full list back through a temp file + rename. The read-modify-write cycle
//! runs under a single async mutex so parallel requests cannot duplicate a
//! name or lose an update.

use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use utoipa::ToSchema;
use uuid::Uuid;

/// A previously searched city.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct City {
    /// Opaque unique identifier
    pub id: String,
    /// City name as the user typed it
    pub name: String,
}

impl City {
    fn new(name: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("history file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("history file is not a valid city list: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Search history persisted to a flat JSON file.
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl HistoryStore {
    /// Open the store, creating the file with an empty list if it is missing.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, HistoryError> {
        let store = Self {
            path: path.into(),
            lock: Mutex::new(()),
        };

        match tokio::fs::metadata(&store.path).await {
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                if let Some(parent) = store.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    tokio::fs::create_dir_all(parent).await?;
                }
                store.write(&[]).await?;
                tracing::info!("Created empty search history at {}", store.path.display());
            }
            Err(e) => return Err(e.into()),
        }

        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Return every stored city in insertion order.
    pub async fn list_cities(&self) -> Result<Vec<City>, HistoryError> {
        let _guard = self.lock.lock().await;
        self.read().await
    }

    /// Add a city unless one with the same name (ignoring case) already exists.
    ///
    /// Returns the stored city: the existing entry on a match, otherwise the
    /// newly created one. Nothing is written when the name is already present.
    pub async fn add_city(&self, name: &str) -> Result<City, HistoryError> {
        let _guard = self.lock.lock().await;
        let mut cities = self.read().await?;

        let needle = name.to_lowercase();
        if let Some(existing) = cities.iter().find(|c| c.name.to_lowercase() == needle) {
            tracing::debug!("City '{}' already in history as {}", name, existing.id);
            return Ok(existing.clone());
        }

        let city = City::new(name);
        cities.push(city.clone());
        self.write(&cities).await?;

        tracing::info!("Added '{}' to search history ({})", city.name, city.id);
        Ok(city)
    }

    /// Remove the city with the given id. Returns `false` if no such city exists.
    pub async fn remove_city(&self, id: &str) -> Result<bool, HistoryError> {
        let _guard = self.lock.lock().await;
        let mut cities = self.read().await?;

        let Some(index) = cities.iter().position(|c| c.id == id) else {
            return Ok(false);
        };

        let removed = cities.remove(index);
        self.write(&cities).await?;

        tracing::info!("Removed '{}' from search history ({})", removed.name, removed.id);
        Ok(true)
    }

    async fn read(&self) -> Result<Vec<City>, HistoryError> {
        let data = match tokio::fs::read_to_string(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        if data.trim().is_empty() {
            return Ok(Vec::new());
        }

        Ok(serde_json::from_str(&data)?)
    }

    /// Sibling file the next write is staged in (`<file>.tmp`).
    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }

    async fn write(&self, cities: &[City]) -> Result<(), HistoryError> {
        let json = serde_json::to_string_pretty(cities)?;
        let temp_path = self.temp_path();
        tokio::fs::write(&temp_path, json).await?;
        if let Err(e) = tokio::fs::rename(&temp_path, &self.path).await {
            if let Err(cleanup) = tokio::fs::remove_file(&temp_path).await {
                tracing::warn!("Failed to remove {}: {}", temp_path.display(), cleanup);
            }
            return Err(e.into());
        }
        Ok(())
    }
}
