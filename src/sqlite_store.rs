//! SQLite-backed favorites store.
//!
//! Persists the favorite set and the sort-direction setting in a single
//! database file so both survive process restart. Statements are short and
//! run under one connection behind a mutex.

use crate::store::FavoritesStore;
use crate::types::{Item, SortDirection};
use anyhow::{Context, Result};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex};

const SORT_DIRECTION_KEY: &str = "sort_direction";

/// SQLite-backed [`FavoritesStore`].
pub struct SqliteFavoritesStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteFavoritesStore {
    /// Open (or create) the database at `path` and run schema migration.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref()).with_context(|| {
            format!("failed to open favorites database at {}", path.as_ref().display())
        })?;
        Self::from_connection(conn)
    }

    /// In-memory database, used by tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    fn initialize_schema(&self) -> Result<()> {
        let conn = self.lock_conn()?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS favorites (
                id INTEGER PRIMARY KEY,
                display_name TEXT NOT NULL,
                image_ref TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )
        .context("failed to create favorites tables")?;
        Ok(())
    }

    fn lock_conn(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow::anyhow!("favorites database lock poisoned"))
    }
}

#[async_trait]
impl FavoritesStore for SqliteFavoritesStore {
    async fn load_all_ids(&self) -> Result<HashSet<u64>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn
            .prepare("SELECT id FROM favorites")
            .context("failed to prepare favorites query")?;
        let ids = stmt
            .query_map([], |row| row.get::<_, i64>(0))
            .context("failed to query favorites")?
            .collect::<Result<Vec<_>, _>>()
            .context("failed to collect favorite ids")?;
        Ok(ids.into_iter().map(|id| id as u64).collect())
    }

    async fn toggle(&self, item: &Item) -> Result<()> {
        let conn = self.lock_conn()?;
        let removed = conn
            .execute(
                "DELETE FROM favorites WHERE id = ?1",
                params![item.id as i64],
            )
            .context("failed to remove favorite")?;

        if removed == 0 {
            conn.execute(
                "INSERT INTO favorites (id, display_name, image_ref) VALUES (?1, ?2, ?3)",
                params![item.id as i64, item.display_name, item.image_ref],
            )
            .context("failed to insert favorite")?;
        }
        Ok(())
    }

    async fn load_sort_direction(&self) -> Result<SortDirection> {
        let conn = self.lock_conn()?;
        let value: Option<String> = conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![SORT_DIRECTION_KEY],
                |row| row.get(0),
            )
            .optional()
            .context("failed to read sort direction setting")?;

        match value {
            Some(json) => {
                serde_json::from_str(&json).context("failed to decode sort direction setting")
            }
            None => Ok(SortDirection::default()),
        }
    }

    async fn save_sort_direction(&self, direction: SortDirection) -> Result<()> {
        let json = serde_json::to_string(&direction)?;
        let conn = self.lock_conn()?;
        conn.execute(
            "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
            params![SORT_DIRECTION_KEY, json],
        )
        .context("failed to save sort direction setting")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn item(id: u64, name: &str) -> Item {
        Item {
            id,
            display_name: name.to_string(),
            image_ref: format!("https://example.com/{id}.png"),
            liked: false,
        }
    }

    #[tokio::test]
    async fn test_toggle_round_trip() {
        let store = SqliteFavoritesStore::open_in_memory().unwrap();

        store.toggle(&item(42, "alice")).await.unwrap();
        store.toggle(&item(7, "bob")).await.unwrap();
        let ids = store.load_all_ids().await.unwrap();
        assert_eq!(ids, [42, 7].into_iter().collect());

        // Second toggle removes
        store.toggle(&item(42, "alice")).await.unwrap();
        let ids = store.load_all_ids().await.unwrap();
        assert_eq!(ids, [7].into_iter().collect());
    }

    #[tokio::test]
    async fn test_sort_direction_defaults_to_ascending() {
        let store = SqliteFavoritesStore::open_in_memory().unwrap();
        assert_eq!(
            store.load_sort_direction().await.unwrap(),
            SortDirection::Ascending
        );
    }

    #[tokio::test]
    async fn test_state_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("favorites.db");

        {
            let store = SqliteFavoritesStore::open(&path).unwrap();
            store.toggle(&item(1, "alice")).await.unwrap();
            store
                .save_sort_direction(SortDirection::Descending)
                .await
                .unwrap();
        }

        let reopened = SqliteFavoritesStore::open(&path).unwrap();
        assert!(reopened.load_all_ids().await.unwrap().contains(&1));
        assert_eq!(
            reopened.load_sort_direction().await.unwrap(),
            SortDirection::Descending
        );
    }
}
