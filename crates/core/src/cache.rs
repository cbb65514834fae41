//! Single-slot cache of the most recent first page of results.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::models::Game;

/// Storage for the last fresh first page, most-recent-search-wins.
pub trait ResultCache: Send {
    /// Return the cached games, or `None` when the slot is empty.
    fn load(&self) -> Result<Option<Vec<Game>>>;
    /// Overwrite the slot with `games`.
    fn store(&self, games: &[Game]) -> Result<()>;
    /// Empty the slot.
    fn clear(&self) -> Result<()>;
}

/// On-disk representation of the cached page.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedResults {
    saved_at: DateTime<Utc>,
    #[serde(default)]
    games: Vec<Game>,
}

/// Cache persisted as JSON in a single file.
#[derive(Debug, Clone)]
pub struct FileResultCache {
    path: PathBuf,
}

impl FileResultCache {
    /// Cache backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the cache file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResultCache for FileResultCache {
    fn load(&self) -> Result<Option<Vec<Game>>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read results cache {}", self.path.display()))?;
        let cached: CachedResults = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse results cache {}", self.path.display()))?;
        Ok(Some(cached.games))
    }

    fn store(&self, games: &[Game]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create cache directory {}", parent.display())
            })?;
        }

        let cached = CachedResults {
            saved_at: Utc::now(),
            games: games.to_vec(),
        };
        let serialized =
            serde_json::to_vec(&cached).context("failed to serialize cached results")?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("failed to write results cache {}", self.path.display()))
    }

    fn clear(&self) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }
        fs::remove_file(&self.path)
            .with_context(|| format!("failed to remove results cache {}", self.path.display()))
    }
}

/// In-process cache slot; clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryResultCache {
    slot: Arc<Mutex<Option<Vec<Game>>>>,
}

impl MemoryResultCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache pre-filled with `games`.
    pub fn with_games(games: Vec<Game>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(games))),
        }
    }

    /// Copy of the slot's contents.
    pub fn snapshot(&self) -> Option<Vec<Game>> {
        self.slot.lock().clone()
    }
}

impl ResultCache for MemoryResultCache {
    fn load(&self) -> Result<Option<Vec<Game>>> {
        Ok(self.snapshot())
    }

    fn store(&self, games: &[Game]) -> Result<()> {
        *self.slot.lock() = Some(games.to_vec());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.slot.lock() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn sample_games() -> Vec<Game> {
        Game::from_values(vec![
            json!({"id": 1, "name": "Halo", "genres": ["Shooter"], "rating": 4.1}),
            json!({"id": 2, "name": "Halo 2", "genres": ["Shooter"]}),
        ])
    }

    #[test]
    fn file_cache_keeps_only_latest_page() -> Result<()> {
        let dir = tempdir()?;
        let cache = FileResultCache::new(dir.path().join("cache").join("last_results.json"));
        assert!(cache.load()?.is_none());

        let games = sample_games();
        cache.store(&games)?;
        assert!(cache.path().exists());
        assert_eq!(cache.load()?, Some(games.clone()));

        cache.store(&games[1..])?;
        let reloaded = cache.load()?.expect("cache should hold the newest page");
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded[0].name, "Halo 2");

        cache.clear()?;
        assert!(cache.load()?.is_none());
        cache.clear()?;
        Ok(())
    }

    #[test]
    fn corrupt_cache_file_is_an_error() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("last_results.json");
        fs::write(&path, "{not json")?;
        let cache = FileResultCache::new(path);
        assert!(cache.load().is_err());
        Ok(())
    }

    #[test]
    fn memory_cache_clones_share_a_slot() -> Result<()> {
        let cache = MemoryResultCache::new();
        let observer = cache.clone();
        cache.store(&sample_games())?;
        assert_eq!(observer.snapshot().map(|games| games.len()), Some(2));
        cache.clear()?;
        assert!(observer.load()?.is_none());
        Ok(())
    }
}
