//! Key/value access to the `local_storage` table.

use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

use unisync_shared::constants::TOKEN_STORAGE_KEY;

use crate::database::Database;
use crate::error::{Result, StoreError};

impl Database {
    pub fn get_item(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn()
            .query_row(
                "SELECT value FROM local_storage WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    pub fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.conn().execute(
            "INSERT INTO local_storage (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Remove a key. Returns `true` if it existed.
    pub fn remove_item(&self, key: &str) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM local_storage WHERE key = ?1", params![key])?;
        Ok(affected > 0)
    }

    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get_item(key)? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|source| StoreError::Json {
                    key: key.to_string(),
                    source,
                }),
            None => Ok(None),
        }
    }

    pub fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value).map_err(|source| StoreError::Json {
            key: key.to_string(),
            source,
        })?;
        self.set_item(key, &raw)
    }

    // ------------------------------------------------------------------
    // Auth token
    // ------------------------------------------------------------------

    /// The stored bearer token. Blank values count as absent.
    pub fn token(&self) -> Result<Option<String>> {
        Ok(self
            .get_item(TOKEN_STORAGE_KEY)?
            .filter(|t| !t.trim().is_empty()))
    }

    pub fn set_token(&self, token: &str) -> Result<()> {
        self.set_item(TOKEN_STORAGE_KEY, token.trim())
    }

    pub fn clear_token(&self) -> Result<bool> {
        self.remove_item(TOKEN_STORAGE_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    fn db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn test_set_get_overwrite() {
        let db = db();
        assert_eq!(db.get_item("k").unwrap(), None);
        db.set_item("k", "v1").unwrap();
        db.set_item("k", "v2").unwrap();
        assert_eq!(db.get_item("k").unwrap().as_deref(), Some("v2"));
    }

    #[test]
    fn test_remove() {
        let db = db();
        db.set_item("k", "v").unwrap();
        assert!(db.remove_item("k").unwrap());
        assert!(!db.remove_item("k").unwrap());
        assert_eq!(db.get_item("k").unwrap(), None);
    }

    #[test]
    fn test_token_blank_is_absent() {
        let db = db();
        db.set_token("   ").unwrap();
        assert_eq!(db.token().unwrap(), None);
        db.set_token(" abc ").unwrap();
        assert_eq!(db.token().unwrap().as_deref(), Some("abc"));
        assert!(db.clear_token().unwrap());
        assert_eq!(db.token().unwrap(), None);
    }

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Prefs {
        dark: bool,
    }

    #[test]
    fn test_json_round_trip_and_corruption() {
        let db = db();
        db.set_json("prefs", &Prefs { dark: true }).unwrap();
        assert_eq!(db.get_json::<Prefs>("prefs").unwrap(), Some(Prefs { dark: true }));

        db.set_item("prefs", "{not json").unwrap();
        assert!(matches!(
            db.get_json::<Prefs>("prefs"),
            Err(StoreError::Json { .. })
        ));
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ls.db");
        Database::open_at(&path).unwrap().set_token("t0k").unwrap();
        let db = Database::open_at(&path).unwrap();
        assert_eq!(db.token().unwrap().as_deref(), Some("t0k"));
    }
}
