use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

use crate::error::StorageError;
use crate::recipe::Recipe;

pub const RECIPES_KEY: &str = "recipes";

/// String key-value store the recipe list is mirrored into.
pub trait LocalStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        log::info!("Opening local storage at {:?}", path);
        Self::with_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        log::info!("Opening in-memory local storage");
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StorageError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS local_storage (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            (),
        )?;
        Ok(SqliteStorage {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        // statements are atomic, so a poisoned connection is still consistent
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl LocalStorage for SqliteStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let db = self.lock();
        let value = db
            .query_row(
                "SELECT value FROM local_storage WHERE key = ?1",
                (key,),
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let db = self.lock();
        db.execute(
            "INSERT INTO local_storage (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            (key, value),
        )?;
        Ok(())
    }
}

/// Overwrites the stored list with `recipes`.
pub fn persist_recipes(storage: &dyn LocalStorage, recipes: &[Recipe]) -> Result<(), StorageError> {
    let json = serde_json::to_string(recipes)?;
    storage.set(RECIPES_KEY, &json)?;
    log::debug!("Stored {} recipes", recipes.len());
    Ok(())
}

pub fn load_recipes(storage: &dyn LocalStorage) -> Result<Vec<Recipe>, StorageError> {
    match storage.get(RECIPES_KEY)? {
        Some(json) => Ok(serde_json::from_str(&json)?),
        None => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn recipe(id: i64, title: &str) -> Recipe {
        Recipe {
            id,
            title: title.to_string(),
            image: format!("https://img.example/{}.jpg", id),
        }
    }

    #[test]
    fn missing_key_reads_as_empty_list() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        assert_eq!(storage.get(RECIPES_KEY).unwrap(), None);
        assert!(load_recipes(&storage).unwrap().is_empty());
    }

    #[test]
    fn persist_overwrites_whole_value() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        persist_recipes(&storage, &[recipe(1, "Soup"), recipe(2, "Salad")]).unwrap();
        persist_recipes(&storage, &[recipe(2, "Salad")]).unwrap();

        assert_eq!(load_recipes(&storage).unwrap(), vec![recipe(2, "Salad")]);
        assert_eq!(
            storage.get(RECIPES_KEY).unwrap().unwrap(),
            r#"[{"id":2,"title":"Salad","image":"https://img.example/2.jpg"}]"#
        );
    }

    #[test]
    fn file_storage_survives_reopen() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("local.sqlite");
        {
            let storage = SqliteStorage::open(&path).unwrap();
            persist_recipes(&storage, &[recipe(7, "Pie")]).unwrap();
        }
        let storage = SqliteStorage::open(&path).unwrap();
        assert_eq!(load_recipes(&storage).unwrap(), vec![recipe(7, "Pie")]);
    }
}
