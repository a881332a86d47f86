use rusqlite::Connection;
use slotbook_core::store::migrations::latest_version;
use slotbook_core::store::{open_store, open_store_in_memory, StoreError};
use slotbook_core::{
    CollectionRepository, NewParticipant, ParticipantRepository, SqliteCollectionStore,
};

#[test]
fn open_store_in_memory_applies_all_migrations() {
    let conn = open_store_in_memory().unwrap();

    assert_eq!(latest_version(), 1);
    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "collections");
    assert_eq!(collection_keys(&conn), vec!["appointments", "participants"]);
}

#[test]
fn open_store_keeps_sqlite_pragma_defaults() {
    let conn = open_store_in_memory().unwrap();
    let foreign_keys: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(foreign_keys, 0);
}

#[test]
fn opening_same_database_twice_is_idempotent_and_keeps_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("slotbook.db");

    {
        let conn = open_store(&path).unwrap();
        assert_eq!(schema_version(&conn), latest_version());
        let repo = CollectionRepository::new(SqliteCollectionStore::new(&conn));
        repo.create_participant(&NewParticipant::new("Ada", "ada@example.com"))
            .unwrap();
    }

    let conn = open_store(&path).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    let repo = CollectionRepository::new(SqliteCollectionStore::new(&conn));
    let participants = repo.list_participants().unwrap();
    assert_eq!(participants.len(), 1);
    assert_eq!(participants[0].name, "Ada");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_store(&path).unwrap_err();
    match err {
        StoreError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn collection_keys(conn: &Connection) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT key FROM collections ORDER BY key ASC;")
        .unwrap();
    let keys = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    keys
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
