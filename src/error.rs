//! Error types for the notes engine
//!
//! All errors use thiserror for structured error handling.
//! These errors can be serialized to a host UI.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Persistence error: {0}")]
    Persistence(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Note not found: {0}")]
    NoteNotFound(String),

    #[error("A PIN must be set before a note can be made private")]
    PinRequired,

    #[error("PIN must be exactly 4 digits")]
    InvalidPin,

    #[error("The PINs entered do not match")]
    PinMismatch,

    #[error("No notes to export")]
    EmptyExport,

    #[error("Malformed backup document: {0}")]
    MalformedBackup(String),

    #[error("No notes found in the backup document")]
    NoNotesFound,

    #[error("No valid notes in the backup document")]
    NoValidNotes,

    #[error("{0}")]
    Generic(String),
}

impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
