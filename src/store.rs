//! Local SQLite store for favorites and search history
//!
//! Schema is created idempotently on open; both tables are keyed by wallet
//! address. Re-searching an address refreshes its history timestamp instead
//! of duplicating the row.

use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("store lock poisoned")]
    Lock,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoriteWallet {
    pub address: String,
    pub name: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHistoryEntry {
    pub address: String,
    pub searched_at: i64,
}

pub struct WalletStore {
    conn: Mutex<Connection>,
}

impl WalletStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn init_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS favorite_wallets (
                address    TEXT PRIMARY KEY,
                name       TEXT,
                created_at INTEGER NOT NULL
            );
            CREATE TABLE IF NOT EXISTS search_history (
                address     TEXT PRIMARY KEY,
                searched_at INTEGER NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    fn with_conn<T>(
        &self,
        op: impl FnOnce(&Connection) -> Result<T, rusqlite::Error>,
    ) -> Result<T, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Lock)?;
        Ok(op(&conn)?)
    }

    // ---- favorites ----

    pub fn list_favorites(&self) -> Result<Vec<FavoriteWallet>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT address, name, created_at FROM favorite_wallets
                 ORDER BY created_at DESC",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok(FavoriteWallet {
                    address: row.get(0)?,
                    name: row.get(1)?,
                    created_at: row.get(2)?,
                })
            })?;
            rows.collect()
        })
    }

    pub fn get_favorite(&self, address: &str) -> Result<Option<FavoriteWallet>, StoreError> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT address, name, created_at FROM favorite_wallets WHERE address = ?1",
                params![address],
                |row| {
                    Ok(FavoriteWallet {
                        address: row.get(0)?,
                        name: row.get(1)?,
                        created_at: row.get(2)?,
                    })
                },
            )
            .optional()
        })
    }

    pub fn upsert_favorite(&self, address: &str, name: Option<&str>) -> Result<(), StoreError> {
        let now = chrono::Utc::now().timestamp();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO favorite_wallets (address, name, created_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(address) DO UPDATE SET name = excluded.name",
                params![address, name, now],
            )
            .map(|_| ())
        })
    }

    pub fn rename_favorite(&self, address: &str, name: Option<&str>) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE favorite_wallets SET name = ?2 WHERE address = ?1",
                params![address, name],
            )
            .map(|_| ())
        })
    }

    pub fn remove_favorite(&self, address: &str) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            conn.execute(
                "DELETE FROM favorite_wallets WHERE address = ?1",
                params![address],
            )
            .map(|_| ())
        })
    }

    pub fn is_favorite(&self, address: &str) -> Result<bool, StoreError> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM favorite_wallets WHERE address = ?1)",
                params![address],
                |row| row.get(0),
            )
        })
    }

    pub fn clear_favorites(&self) -> Result<(), StoreError> {
        self.with_conn(|conn| conn.execute("DELETE FROM favorite_wallets", []).map(|_| ()))
    }

    // ---- search history ----

    pub fn list_history(&self) -> Result<Vec<SearchHistoryEntry>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT address, searched_at FROM search_history
                 ORDER BY searched_at DESC",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok(SearchHistoryEntry {
                    address: row.get(0)?,
                    searched_at: row.get(1)?,
                })
            })?;
            rows.collect()
        })
    }

    pub fn add_history(&self, address: &str) -> Result<(), StoreError> {
        let now = chrono::Utc::now().timestamp();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO search_history (address, searched_at)
                 VALUES (?1, ?2)
                 ON CONFLICT(address) DO UPDATE SET searched_at = excluded.searched_at",
                params![address, now],
            )
            .map(|_| ())
        })
    }

    pub fn remove_history(&self, address: &str) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            conn.execute(
                "DELETE FROM search_history WHERE address = ?1",
                params![address],
            )
            .map(|_| ())
        })
    }

    pub fn clear_history(&self) -> Result<(), StoreError> {
        self.with_conn(|conn| conn.execute("DELETE FROM search_history", []).map(|_| ()))
    }
}
