use rusqlite::Connection;
use todosync_core::db::migrations::latest_version;
use todosync_core::db::{open_db, open_db_in_memory, DbError};
use todosync_core::{ActorId, LocalBackend, Note, NoteId, NoteMutation, NoteQuery};

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().expect("in-memory store should open");

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "notes");
}

#[test]
fn reopening_file_store_keeps_schema_and_rows() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let path = dir.path().join("todosync.db");

    {
        let backend = LocalBackend::open(&path).expect("store should open");
        backend
            .create_note(&Note::new(
                NoteId::new("1"),
                "persist",
                "across reopen",
                ActorId::new("writer"),
            ))
            .expect("create should succeed");
    }

    let conn = open_db(&path).expect("store should reopen");
    assert_eq!(schema_version(&conn), latest_version());
    drop(conn);

    let backend = LocalBackend::open(&path).expect("store should reopen");
    let notes = backend.list_notes().expect("list should succeed");
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].id, NoteId::new("1"));
}

#[test]
fn opening_store_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).expect("raw connection should open");
    conn.execute_batch("PRAGMA user_version = 999;")
        .expect("user_version should be set");
    drop(conn);

    let err = open_db(&path).expect_err("newer schema should be rejected");
    match err {
        DbError::UnsupportedSchemaVersion {
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
        .expect("user_version should be readable")
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
        .expect("sqlite_master should be queryable");
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
