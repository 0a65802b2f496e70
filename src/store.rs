//! Local favorites and settings capability.

use crate::types::{Item, SortDirection};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Local persistence for the favorite set and the sort-direction setting.
///
/// The controller only reads snapshots and issues idempotent toggle
/// commands; it never holds the store across an await of its own state.
#[async_trait]
pub trait FavoritesStore: Send + Sync {
    /// Snapshot of every favorited item id.
    async fn load_all_ids(&self) -> Result<HashSet<u64>>;

    /// Add the item to the favorite set if absent, remove it otherwise.
    /// The full item is passed so a removal-then-restart can re-display it.
    async fn toggle(&self, item: &Item) -> Result<()>;

    /// Sort direction persisted from a previous run, default ascending.
    async fn load_sort_direction(&self) -> Result<SortDirection>;

    /// Persist the sort direction for the next run.
    async fn save_sort_direction(&self, direction: SortDirection) -> Result<()>;
}

/// In-memory store for tests and throwaway composition.
///
/// Supports fault injection on `toggle` so callers can exercise the
/// optimistic-update failure path.
#[derive(Debug, Default)]
pub struct MemoryFavoritesStore {
    ids: Mutex<HashSet<u64>>,
    sort_direction: Mutex<SortDirection>,
    fail_toggles: AtomicBool,
}

impl MemoryFavoritesStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed the favorite set.
    pub fn with_ids(ids: impl IntoIterator<Item = u64>) -> Self {
        let store = Self::new();
        *store.ids.lock().unwrap() = ids.into_iter().collect();
        store
    }

    /// Pre-seed the persisted sort direction.
    pub fn with_sort_direction(self, direction: SortDirection) -> Self {
        *self.sort_direction.lock().unwrap() = direction;
        self
    }

    /// Make every subsequent `toggle` call fail.
    pub fn set_fail_toggles(&self, fail: bool) {
        self.fail_toggles.store(fail, Ordering::SeqCst);
    }

    /// Current favorite ids, for assertions.
    pub fn ids(&self) -> HashSet<u64> {
        self.ids.lock().unwrap().clone()
    }

    /// Currently stored sort direction, for assertions.
    pub fn sort_direction(&self) -> SortDirection {
        *self.sort_direction.lock().unwrap()
    }
}

#[async_trait]
impl FavoritesStore for MemoryFavoritesStore {
    async fn load_all_ids(&self) -> Result<HashSet<u64>> {
        Ok(self.ids.lock().unwrap().clone())
    }

    async fn toggle(&self, item: &Item) -> Result<()> {
        if self.fail_toggles.load(Ordering::SeqCst) {
            anyhow::bail!("favorite toggle failed (injected)");
        }
        let mut ids = self.ids.lock().unwrap();
        if !ids.insert(item.id) {
            ids.remove(&item.id);
        }
        Ok(())
    }

    async fn load_sort_direction(&self) -> Result<SortDirection> {
        Ok(*self.sort_direction.lock().unwrap())
    }

    async fn save_sort_direction(&self, direction: SortDirection) -> Result<()> {
        *self.sort_direction.lock().unwrap() = direction;
        Ok(())
    }
}
