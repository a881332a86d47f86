//! SQLite-backed collection store.
//!
//! # Invariants
//! - One row per collection key in `collections`.
//! - `write_all` runs inside a single transaction.

use super::{CollectionKey, CollectionStore, StoreResult};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;

/// Collection store over a migrated connection (see `open_store`).
pub struct SqliteCollectionStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCollectionStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl CollectionStore for SqliteCollectionStore<'_> {
    fn read(&self, key: CollectionKey) -> StoreResult<Option<Value>> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT payload FROM collections WHERE key = ?1;",
                [key.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        match payload {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    fn write_all(&self, writes: &[(CollectionKey, Value)]) -> StoreResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        for (key, value) in writes {
            let payload = serde_json::to_string(value)?;
            tx.execute(
                "INSERT INTO collections (key, payload, updated_at)
                 VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
                 ON CONFLICT(key) DO UPDATE SET
                    payload = excluded.payload,
                    updated_at = excluded.updated_at;",
                params![key.as_str(), payload],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::SqliteCollectionStore;
    use crate::store::{open_store_in_memory, CollectionKey, CollectionStore};
    use serde_json::json;

    #[test]
    fn migrated_store_starts_with_empty_collections() {
        let conn = open_store_in_memory().unwrap();
        let store = SqliteCollectionStore::new(&conn);

        assert_eq!(store.read(CollectionKey::Participants).unwrap(), Some(json!([])));
        assert_eq!(store.read(CollectionKey::Appointments).unwrap(), Some(json!([])));
    }

    #[test]
    fn write_replaces_whole_payload() {
        let conn = open_store_in_memory().unwrap();
        let store = SqliteCollectionStore::new(&conn);

        store
            .write(CollectionKey::Participants, json!([{"id": 1}]))
            .unwrap();
        store
            .write(CollectionKey::Participants, json!([{"id": 2}]))
            .unwrap();

        assert_eq!(
            store.read(CollectionKey::Participants).unwrap(),
            Some(json!([{"id": 2}]))
        );
    }

    #[test]
    fn corrupt_payload_is_reported_not_masked() {
        let conn = open_store_in_memory().unwrap();
        conn.execute(
            "UPDATE collections SET payload = 'not json' WHERE key = 'appointments';",
            [],
        )
        .unwrap();

        let store = SqliteCollectionStore::new(&conn);
        assert!(store.read(CollectionKey::Appointments).is_err());
    }
}
