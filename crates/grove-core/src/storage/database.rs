//! SQLite-backed persistence.
//!
//! A single `kv` table carries the little state that outlives the process;
//! today that is the tree's age. The core only requires round-trip
//! fidelity of the value -- every failure on this path is logged and
//! defaulted, never surfaced to the control loop.

use rusqlite::{params, Connection};
use tracing::warn;

use super::data_dir;
use crate::error::StorageError;

const AGE_KEY: &str = "tree_age";
const DEFAULT_AGE: f64 = 1.0;

/// SQLite database for session state.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/grove/grove.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StorageError> {
        let path = data_dir()
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?
            .join("grove.db");
        let conn = Connection::open(&path).map_err(|source| StorageError::OpenFailed {
            path,
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (tests and dry runs).
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )
    }

    pub fn kv_get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let mut rows = stmt.query(params![key])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    /// Persisted tree age; 1.0 on a missing, unreadable, or corrupt record.
    pub fn load_age(&self) -> f64 {
        match self.kv_get(AGE_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<f64>(&raw) {
                Ok(age) if age.is_finite() && age >= 0.0 => age,
                _ => {
                    warn!(%raw, "corrupt persisted age, defaulting");
                    DEFAULT_AGE
                }
            },
            Ok(None) => DEFAULT_AGE,
            Err(err) => {
                warn!(%err, "could not read persisted age, defaulting");
                DEFAULT_AGE
            }
        }
    }

    /// Fire-and-forget write-back at session end.
    pub fn save_age(&self, age: f64) {
        let value = match serde_json::to_string(&age) {
            Ok(v) => v,
            Err(err) => {
                warn!(%err, "could not encode age");
                return;
            }
        };
        if let Err(err) = self.kv_set(AGE_KEY, &value) {
            warn!(%err, "could not persist age");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kv_roundtrip() {
        let db = Database::open_memory().unwrap();
        assert_eq!(db.kv_get("missing").unwrap(), None);
        db.kv_set("k", "v1").unwrap();
        db.kv_set("k", "v2").unwrap();
        assert_eq!(db.kv_get("k").unwrap().as_deref(), Some("v2"));
    }

    #[test]
    fn age_defaults_when_absent() {
        let db = Database::open_memory().unwrap();
        assert_eq!(db.load_age(), 1.0);
    }

    #[test]
    fn age_roundtrips_fractional_values() {
        let db = Database::open_memory().unwrap();
        db.save_age(42.5);
        assert_eq!(db.load_age(), 42.5);
    }

    #[test]
    fn corrupt_age_defaults() {
        let db = Database::open_memory().unwrap();
        db.kv_set(AGE_KEY, "not a number").unwrap();
        assert_eq!(db.load_age(), 1.0);
        db.kv_set(AGE_KEY, "-7").unwrap();
        assert_eq!(db.load_age(), 1.0);
    }
}
