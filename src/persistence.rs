//! Layout persistence: one flat JSON snapshot of the card collection.
//!
//! DESIGN
//! ======
//! The snapshot lives under a single namespace key in a string key/value
//! store (the desktop equivalent of browser `localStorage`). Every committed
//! registry change rewrites the whole record; there is no incremental log.
//!
//! Each entry carries `{id, position, inBucket}` plus the card's own fields
//! (`name`, `action`, `icon`, `kind`). Readers that only understand the first
//! three ignore the rest, and `load` uses them to revive cards that are not in
//! the seed collection, so user-added cards survive a restart.
//!
//! Load failures are never surfaced: a missing or corrupt record means "no
//! saved layout" and the seed is returned unchanged.

#[cfg(test)]
#[path = "persistence_test.rs"]
mod persistence_test;

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::card::{Card, CardId, CardKind, IconRef};
use crate::consts::LAYOUT_KEY;
use crate::geometry::Point;

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store file {path} could not be accessed: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("store file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("layout encode failed: {0}")]
    Encode(#[from] serde_json::Error),
}

// =============================================================================
// KEY/VALUE STORE
// =============================================================================

/// Durable string key/value storage. Values are raw JSON text per key.
pub trait KvStore: Send + Sync {
    /// Read the raw value for `key`, `None` when absent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backing storage cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Overwrite the value for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backing storage cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// In-memory store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.inner.lock().unwrap_or_else(PoisonError::into_inner).get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// Process-wide write locks, one per store file.
static FILE_LOCKS: LazyLock<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> = LazyLock::new(Mutex::default);

fn file_lock(path: &Path) -> Arc<Mutex<()>> {
    let key = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut locks = FILE_LOCKS.lock().unwrap_or_else(PoisonError::into_inner);
    Arc::clone(locks.entry(key).or_default())
}

/// JSON file holding a `{ key: value }` object.
///
/// Every `FileStore` on the same path shares one lock, and each write
/// re-reads the file under it and replaces it through a uniquely named
/// temporary sibling. Stores sharing a file therefore only change their own
/// keys, even when writes overlap.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl FileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let lock = file_lock(&path);
        Self { path, lock }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => return Err(StoreError::Io { path: self.path.clone(), source }),
        };
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt { path: self.path.clone(), source })
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let raw = serde_json::to_string_pretty(map)?;
        let tmp = self.path.with_extension(format!("{}.tmp", uuid::Uuid::new_v4().simple()));
        std::fs::write(&tmp, raw).map_err(|source| StoreError::Io { path: tmp.clone(), source })?;
        std::fs::rename(&tmp, &self.path).map_err(|source| StoreError::Io { path: self.path.clone(), source })
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.read_map()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut map = match self.read_map() {
            Ok(map) => map,
            Err(StoreError::Corrupt { path, source }) => {
                warn!(path = %path.display(), error = %source, "replacing corrupt store file");
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        map.insert(key.to_owned(), value.to_owned());
        self.write_map(&map)
    }
}

// =============================================================================
// LAYOUT RECORD
// =============================================================================

/// One entry of the persisted layout record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutEntry {
    pub id: CardId,
    pub position: Point,
    #[serde(rename = "inBucket")]
    pub in_bucket: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<IconRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<CardKind>,
}

impl LayoutEntry {
    #[must_use]
    pub fn from_card(card: &Card) -> Self {
        Self {
            id: card.id.clone(),
            position: card.position,
            in_bucket: card.contained,
            name: Some(card.name.clone()),
            action: Some(card.action.clone()),
            icon: Some(card.icon.clone()),
            kind: Some(card.kind),
        }
    }

    /// Rebuild a full card from this entry, if it carries the card's fields.
    #[must_use]
    pub fn revive(&self) -> Option<Card> {
        let name = self.name.as_deref().filter(|s| !s.trim().is_empty())?;
        let action = self.action.as_deref().filter(|s| !s.trim().is_empty())?;
        let icon = self.icon.clone().filter(|icon| !icon.is_empty())?;
        Some(Card {
            id: self.id.clone(),
            name: name.to_owned(),
            icon,
            kind: self.kind.unwrap_or_else(|| CardKind::infer(action)),
            action: action.to_owned(),
            position: self.position,
            contained: self.in_bucket,
        })
    }
}

// =============================================================================
// LAYOUT PERSISTENCE
// =============================================================================

/// Reads and writes the layout record under a fixed namespace key.
#[derive(Debug, Clone)]
pub struct LayoutPersistence<S> {
    store: S,
    key: String,
}

impl<S: KvStore> LayoutPersistence<S> {
    /// Persistence under the standard `alpha-workspace-layout` key.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self::with_key(store, LAYOUT_KEY)
    }

    #[must_use]
    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self { store, key: key.into() }
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Overwrite the record with the full card collection, in order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if encoding or the store write fails.
    pub fn save(&self, cards: &[Card]) -> Result<(), StoreError> {
        let entries: Vec<LayoutEntry> = cards.iter().map(LayoutEntry::from_card).collect();
        let raw = serde_json::to_string(&entries)?;
        self.store.set(&self.key, &raw)?;
        debug!(key = %self.key, count = entries.len(), "layout saved");
        Ok(())
    }

    /// Read the saved entries. Absent, unreadable, or unparsable records are
    /// logged and reported as `None`.
    #[must_use]
    pub fn read_entries(&self) -> Option<Vec<LayoutEntry>> {
        let raw = match self.store.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key = %self.key, "no saved layout");
                return None;
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "layout store unreadable; using seed layout");
                return None;
            }
        };
        match serde_json::from_str::<Vec<LayoutEntry>>(&raw) {
            Ok(entries) => Some(entries),
            Err(e) => {
                warn!(key = %self.key, error = %e, "saved layout is malformed; using seed layout");
                None
            }
        }
    }

    /// Reconcile the saved record with `seed`.
    ///
    /// Seed cards with a saved entry take its position and containment; the
    /// rest keep their own placement. Saved entries missing from the seed are
    /// appended in saved order when they carry full card fields and dropped
    /// otherwise.
    #[must_use]
    pub fn load(&self, seed: Vec<Card>) -> Vec<Card> {
        let Some(entries) = self.read_entries() else {
            return seed;
        };
        let saved: HashMap<&str, &LayoutEntry> = entries.iter().map(|e| (e.id.as_str(), e)).collect();

        let mut cards: Vec<Card> = seed
            .into_iter()
            .map(|mut card| {
                if let Some(entry) = saved.get(card.id.as_str()) {
                    card.position = entry.position;
                    card.contained = entry.in_bucket;
                }
                card
            })
            .collect();

        let mut known: HashSet<CardId> = cards.iter().map(|c| c.id.clone()).collect();
        for entry in &entries {
            if known.contains(&entry.id) {
                continue;
            }
            match entry.revive() {
                Some(card) => {
                    known.insert(card.id.clone());
                    cards.push(card);
                }
                None => debug!(card_id = %entry.id, "dropping saved entry without card fields"),
            }
        }
        cards
    }
}
