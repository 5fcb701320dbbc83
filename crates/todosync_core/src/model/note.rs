//! Note domain model.
//!
//! # Responsibility
//! - Define the to-do note record shared by local state and remote payloads.
//! - Define the pending-create draft and its caller-side validation.
//!
//! # Invariants
//! - `NoteId` is the only identity of a note; two notes with equal ids are
//!   the same note.
//! - `completed` defaults to `false` for every newly created note.
//! - `origin_id` is set by the creating client and never rewritten.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Opaque note identifier, client- or server-assigned.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Generates a fresh random id for a locally created note.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for NoteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NoteId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Identity of one running client process.
///
/// Generated once at startup and attached to every note the process creates,
/// so realtime echoes of its own writes can be recognized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(String);

impl ActorId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for ActorId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One to-do entry.
///
/// Serialized with the remote schema's camelCase names; the origin is
/// `clientId` on the wire and `originId` is accepted on input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    /// Missing for notes written by producers that do not tag their origin.
    #[serde(rename = "clientId", alias = "originId", default)]
    pub origin_id: Option<ActorId>,
}

impl Note {
    /// Creates a not-yet-completed note tagged with its creating actor.
    pub fn new(
        id: NoteId,
        name: impl Into<String>,
        description: impl Into<String>,
        origin_id: ActorId,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
            completed: false,
            origin_id: Some(origin_id),
        }
    }

    /// Returns whether this note was created by `actor`.
    pub fn originated_by(&self, actor: &ActorId) -> bool {
        self.origin_id.as_ref() == Some(actor)
    }
}

/// Editable field of the pending-create draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    Name,
    Description,
}

impl DraftField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Description => "description",
        }
    }
}

impl FromStr for DraftField {
    type Err = NoteValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "name" => Ok(Self::Name),
            "description" => Ok(Self::Description),
            other => Err(NoteValidationError::UnknownField(other.to_string())),
        }
    }
}

/// Uncommitted name/description pair backing the create form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteDraft {
    pub name: String,
    pub description: String,
}

impl NoteDraft {
    pub fn set(&mut self, field: DraftField, value: impl Into<String>) {
        match field {
            DraftField::Name => self.name = value.into(),
            DraftField::Description => self.description = value.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.description.is_empty()
    }

    /// Checks the create precondition: both fields carry non-blank text.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        if self.name.trim().is_empty() {
            return Err(NoteValidationError::EmptyName);
        }
        if self.description.trim().is_empty() {
            return Err(NoteValidationError::EmptyDescription);
        }
        Ok(())
    }
}

/// Caller-side rejection of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteValidationError {
    EmptyName,
    EmptyDescription,
    UnknownField(String),
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "please enter a name"),
            Self::EmptyDescription => write!(f, "please enter a description"),
            Self::UnknownField(value) => {
                write!(f, "unknown draft field `{value}`; expected name|description")
            }
        }
    }
}

impl Error for NoteValidationError {}
