//! GraphQL documents, request encoding and response decoding.
//!
//! # Responsibility
//! - Hold the operation documents the client sends to the note API.
//! - Turn response and subscription payloads into notes and `RemoteEvent`s.
//!
//! # Invariants
//! - A payload carrying a non-empty `errors` array is always an error, even
//!   when `data` is also present.
//! - `null` entries inside `listNotes.items` are skipped.

use crate::backend::{NotePatch, RemoteEvent, Topic};
use crate::model::note::{Note, NoteId};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

const NOTE_FIELDS: &str = "id name description completed clientId";

pub const LIST_NOTES: &str =
    "query ListNotes { listNotes { items { id name description completed clientId } } }";
pub const CREATE_NOTE: &str = "mutation CreateNote($input: CreateNoteInput!) { createNote(input: $input) { id name description completed clientId } }";
pub const UPDATE_NOTE: &str = "mutation UpdateNote($input: UpdateNoteInput!) { updateNote(input: $input) { id name description completed clientId } }";
pub const DELETE_NOTE: &str =
    "mutation DeleteNote($input: DeleteNoteInput!) { deleteNote(input: $input) { id } }";

pub type WireResult<T> = Result<T, WireError>;

/// Payload decoding failure.
#[derive(Debug)]
pub enum WireError {
    Json(serde_json::Error),
    /// The server answered with GraphQL `errors`.
    GraphQl(Vec<String>),
    MissingField(&'static str),
}

impl Display for WireError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "malformed payload: {err}"),
            Self::GraphQl(messages) => write!(f, "graphql errors: {}", messages.join("; ")),
            Self::MissingField(field) => write!(f, "payload is missing `{field}`"),
        }
    }
}

impl Error for WireError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::GraphQl(_) | Self::MissingField(_) => None,
        }
    }
}

impl From<serde_json::Error> for WireError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct ItemsPage {
    #[serde(default)]
    items: Vec<Option<Note>>,
}

/// Subscription document for one realtime topic.
pub fn subscription_document(topic: Topic) -> String {
    let field = topic.field_name();
    let selection = match topic {
        Topic::Deleted => "id",
        Topic::Created | Topic::Updated => NOTE_FIELDS,
    };
    let operation = format!("{}{}", field[..1].to_ascii_uppercase(), &field[1..]);
    format!("subscription {operation} {{ {field} {{ {selection} }} }}")
}

/// Request body for the full-list query.
pub fn list_notes_request() -> Value {
    json!({ "query": LIST_NOTES })
}

/// Request body creating `note` with every field, origin included.
pub fn create_note_request(note: &Note) -> WireResult<Value> {
    Ok(json!({
        "query": CREATE_NOTE,
        "variables": { "input": serde_json::to_value(note)? },
    }))
}

/// Request body updating only the fields set in `patch`.
pub fn update_note_request(id: &NoteId, patch: &NotePatch) -> WireResult<Value> {
    let mut input = match serde_json::to_value(patch)? {
        Value::Object(fields) => fields,
        _ => Map::new(),
    };
    input.insert("id".to_string(), Value::String(id.as_str().to_string()));
    Ok(json!({
        "query": UPDATE_NOTE,
        "variables": { "input": Value::Object(input) },
    }))
}

pub fn delete_note_request(id: &NoteId) -> Value {
    json!({
        "query": DELETE_NOTE,
        "variables": { "input": { "id": id.as_str() } },
    })
}

/// Decodes a `listNotes` response body.
pub fn decode_list_response(body: &str) -> WireResult<Vec<Note>> {
    let page: ItemsPage = serde_json::from_value(take_field(body, "listNotes")?)?;
    Ok(page.items.into_iter().flatten().collect())
}

/// Decodes a `createNote`/`updateNote` response body.
pub fn decode_mutation_note(field: &'static str, body: &str) -> WireResult<Note> {
    Ok(serde_json::from_value(take_field(body, field)?)?)
}

/// Decodes a `deleteNote` response body into the removed id.
pub fn decode_deleted_id(body: &str) -> WireResult<NoteId> {
    id_of(&take_field(body, "deleteNote")?)
}

/// Decodes one realtime delivery for `topic`.
pub fn decode_subscription_payload(topic: Topic, body: &str) -> WireResult<RemoteEvent> {
    let payload = take_field(body, topic.field_name())?;
    match topic {
        Topic::Created => Ok(RemoteEvent::Created(serde_json::from_value(payload)?)),
        Topic::Updated => Ok(RemoteEvent::Updated(serde_json::from_value(payload)?)),
        Topic::Deleted => Ok(RemoteEvent::Deleted(id_of(&payload)?)),
    }
}

fn id_of(payload: &Value) -> WireResult<NoteId> {
    payload
        .get("id")
        .and_then(Value::as_str)
        .map(NoteId::new)
        .ok_or(WireError::MissingField("id"))
}

fn take_field(body: &str, field: &'static str) -> WireResult<Value> {
    let mut data = decode_data(body)?;
    data.get_mut(field)
        .map(Value::take)
        .filter(|value| !value.is_null())
        .ok_or(WireError::MissingField(field))
}

fn decode_data(body: &str) -> WireResult<Value> {
    let envelope: Envelope = serde_json::from_str(body)?;
    if !envelope.errors.is_empty() {
        return Err(WireError::GraphQl(
            envelope.errors.into_iter().map(|err| err.message).collect(),
        ));
    }
    envelope.data.ok_or(WireError::MissingField("data"))
}
