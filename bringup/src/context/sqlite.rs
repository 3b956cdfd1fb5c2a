//! Persistent context library backed by SQLite.

use rusqlite::{params, Connection, Result as SqlResult};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use super::{rank, ContextHit, ContextStore, Metadata, StoreError};

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        let store = SqliteStore {
            conn: Mutex::new(conn),
        };
        store.initialize()?;
        Ok(store)
    }

    fn get_conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|e| StoreError::Lock(e.to_string()))
    }

    fn initialize(&self) -> Result<(), StoreError> {
        let conn = self.get_conn()?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS documents (
                id TEXT PRIMARY KEY,
                text TEXT NOT NULL,
                metadata TEXT NOT NULL,
                added_at TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }
}

impl ContextStore for SqliteStore {
    fn upsert(&self, id: &str, text: &str, metadata: &Metadata) -> Result<(), StoreError> {
        let metadata_json =
            serde_json::to_string(metadata).map_err(|e| StoreError::Serialization(e.to_string()))?;
        let added_at = chrono::Utc::now().to_rfc3339();
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO documents (id, text, metadata, added_at) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET text = excluded.text, metadata = excluded.metadata",
            params![id, text, metadata_json, added_at],
        )?;
        Ok(())
    }

    fn query(&self, text: &str, k: usize) -> Result<Vec<ContextHit>, StoreError> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT id, text, metadata FROM documents ORDER BY rowid")?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<SqlResult<Vec<_>>>()?;

        let docs = rows
            .into_iter()
            .map(|(id, body, meta)| {
                let metadata: Metadata = serde_json::from_str(&meta)
                    .map_err(|e| StoreError::Serialization(e.to_string()))?;
                Ok((id, body, metadata))
            })
            .collect::<Result<Vec<_>, StoreError>>()?;

        Ok(rank(
            text,
            k,
            docs.iter().map(|(id, body, meta)| (id.as_str(), body.as_str(), meta)),
        ))
    }

    fn count(&self) -> Result<usize, StoreError> {
        let conn = self.get_conn()?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
        Ok(n as usize)
    }

    fn clear(&self) -> Result<(), StoreError> {
        let conn = self.get_conn()?;
        conn.execute("DELETE FROM documents", [])?;
        Ok(())
    }
}
