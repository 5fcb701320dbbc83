//! Note repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist notes for the local backend.
//! - Keep SQL details inside the store boundary.
//!
//! # Invariants
//! - Writes reject blank `name`/`description` before SQL runs.
//! - `id` is unique; inserting a known id is a `Duplicate` error.
//! - Listing is newest-first by insertion sequence.

use crate::db::DbError;
use crate::model::note::{ActorId, Note, NoteId};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const NOTE_SELECT_SQL: &str = "SELECT
    id,
    name,
    description,
    completed,
    client_id
FROM notes";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for note persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(NoteId),
    Duplicate(NoteId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "note not found: {id}"),
            Self::Duplicate(id) => write!(f, "note already exists: {id}"),
            Self::InvalidData(message) => write!(f, "invalid note data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::Duplicate(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for note CRUD.
pub trait NoteRepository {
    fn insert_note(&self, note: &Note) -> RepoResult<()>;
    /// Replaces every mutable field of an existing note.
    fn update_note(&self, note: &Note) -> RepoResult<()>;
    fn delete_note(&self, id: &NoteId) -> RepoResult<()>;
    fn get_note(&self, id: &NoteId) -> RepoResult<Option<Note>>;
    fn list_notes(&self) -> RepoResult<Vec<Note>>;
}

/// SQLite-backed note repository.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    /// Wraps a migrated connection from `db::open_db*`.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn insert_note(&self, note: &Note) -> RepoResult<()> {
        validate_note(note)?;
        if self.get_note(&note.id)?.is_some() {
            return Err(RepoError::Duplicate(note.id.clone()));
        }

        self.conn.execute(
            "INSERT INTO notes (id, name, description, completed, client_id)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                note.id.as_str(),
                note.name.as_str(),
                note.description.as_str(),
                bool_to_int(note.completed),
                note.origin_id.as_ref().map(ActorId::as_str),
            ],
        )?;
        Ok(())
    }

    fn update_note(&self, note: &Note) -> RepoResult<()> {
        validate_note(note)?;

        let changed = self.conn.execute(
            "UPDATE notes
             SET
                name = ?2,
                description = ?3,
                completed = ?4,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![
                note.id.as_str(),
                note.name.as_str(),
                note.description.as_str(),
                bool_to_int(note.completed),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(note.id.clone()));
        }
        Ok(())
    }

    fn delete_note(&self, id: &NoteId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM notes WHERE id = ?1;", [id.as_str()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id.clone()));
        }
        Ok(())
    }

    fn get_note(&self, id: &NoteId) -> RepoResult<Option<Note>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NOTE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.as_str()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_note_row(row)?));
        }
        Ok(None)
    }

    fn list_notes(&self) -> RepoResult<Vec<Note>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NOTE_SELECT_SQL} ORDER BY seq DESC;"))?;
        let mut rows = stmt.query([])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }
        Ok(notes)
    }
}

fn validate_note(note: &Note) -> RepoResult<()> {
    if note.id.as_str().trim().is_empty() {
        return Err(RepoError::InvalidData("note id cannot be blank".to_string()));
    }
    if note.name.trim().is_empty() {
        return Err(RepoError::InvalidData(format!(
            "note {} has a blank name",
            note.id
        )));
    }
    if note.description.trim().is_empty() {
        return Err(RepoError::InvalidData(format!(
            "note {} has a blank description",
            note.id
        )));
    }
    Ok(())
}

fn parse_note_row(row: &Row<'_>) -> RepoResult<Note> {
    let id: String = row.get("id")?;
    let completed = match row.get::<_, i64>("completed")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid completed value `{other}` in notes.completed for {id}"
            )));
        }
    };

    Ok(Note {
        id: NoteId::new(id),
        name: row.get("name")?,
        description: row.get("description")?,
        completed,
        origin_id: row.get::<_, Option<String>>("client_id")?.map(ActorId::new),
    })
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
