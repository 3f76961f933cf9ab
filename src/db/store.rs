use crate::error::Result;
use rusqlite::{Connection, OptionalExtension};
#[cfg(test)]
use std::collections::HashMap;

/// Key-value blob storage keyed by username. Writes replace the whole blob.
pub trait Store {
    fn load(&self, username: &str) -> Result<Option<String>>;
    fn save(&mut self, username: &str, blob: &str) -> Result<()>;
}

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }
}

impl Store for SqliteStore {
    fn load(&self, username: &str) -> Result<Option<String>> {
        let blob = self
            .conn
            .query_row("SELECT data FROM finance_users WHERE username = ?1", [username], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(blob)
    }

    fn save(&mut self, username: &str, blob: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO finance_users (username, data) VALUES (?1, ?2)
             ON CONFLICT(username) DO UPDATE SET data = excluded.data",
            [username, blob],
        )?;
        Ok(())
    }
}

/// In-memory store for tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: HashMap<String, String>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blob(username: &str, blob: &str) -> Self {
        let mut store = Self::new();
        store.blobs.insert(username.to_string(), blob.to_string());
        store
    }
}

#[cfg(test)]
impl Store for MemoryStore {
    fn load(&self, username: &str) -> Result<Option<String>> {
        Ok(self.blobs.get(username).cloned())
    }

    fn save(&mut self, username: &str, blob: &str) -> Result<()> {
        self.blobs.insert(username.to_string(), blob.to_string());
        Ok(())
    }
}
