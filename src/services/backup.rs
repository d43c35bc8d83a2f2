//! Backup codec and merge engine
//!
//! Serializes the active collection to a versioned, portable document
//! and turns an external document back into importable notes. Backups
//! are text/metadata only: image references never leave the device and
//! are reset on import.
//!
//! Import is deliberately lenient. Anything note-shaped is normalized
//! into a valid `Note`; only documents with no usable entries at all are
//! rejected, and always before any repository mutation.

use crate::config::{BACKUP_FORMAT_VERSION, THEME_PALETTE_SIZE};
use crate::error::{AppError, Result};
use crate::notes::model::{ChecklistItem, Note, NoteContent, NoteKind};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// The portable backup document
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupDocument {
    pub note_count: usize,
    pub version: u32,
    pub notes: Vec<BackupEntry>,
}

/// One serialized note inside a backup document
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupEntry {
    pub id: String,
    pub title: String,
    pub content: NoteContent,
    pub date: DateTime<Utc>,
    pub is_locked: bool,
    #[serde(rename = "type")]
    pub kind: NoteKind,
    pub theme_index: u32,
    pub is_favorite: bool,
}

/// Serialize the active collection. Fails with `EmptyExport` when there
/// is nothing to export.
pub fn export(notes: &[Note]) -> Result<BackupDocument> {
    if notes.is_empty() {
        return Err(AppError::EmptyExport);
    }

    let entries: Vec<BackupEntry> = notes
        .iter()
        .map(|note| BackupEntry {
            id: note.id.clone(),
            title: note.title.clone(),
            content: note.content.clone(),
            date: note.date,
            is_locked: note.is_private,
            kind: note.kind,
            theme_index: note.theme_index,
            is_favorite: note.is_favorite,
        })
        .collect();

    tracing::info!("Exporting {} note(s)", entries.len());

    Ok(BackupDocument {
        note_count: entries.len(),
        version: BACKUP_FORMAT_VERSION,
        notes: entries,
    })
}

/// Export rendered as pretty-printed JSON, ready to hand to the host's
/// file dialog.
pub fn export_json(notes: &[Note]) -> Result<String> {
    let document = export(notes)?;
    Ok(serde_json::to_string_pretty(&document)?)
}

/// Default filename for a backup written at `now`.
pub fn backup_filename(now: DateTime<Utc>) -> String {
    format!("notes_backup_{}.json", now.format("%Y-%m-%d_%H-%M-%S"))
}

/// Parse, validate, and normalize an external backup document into
/// importable notes. Accepts the versioned document shape and the legacy
/// bare-array shape.
pub fn import(raw: &str) -> Result<Vec<Note>> {
    let document: Value =
        serde_json::from_str(raw).map_err(|e| AppError::MalformedBackup(e.to_string()))?;

    let entries = match &document {
        Value::Object(map) => match map.get("notes") {
            Some(Value::Array(entries)) => entries.as_slice(),
            _ => {
                return Err(AppError::MalformedBackup(
                    "expected a notes array".to_string(),
                ))
            }
        },
        Value::Array(entries) => entries.as_slice(),
        _ => {
            return Err(AppError::MalformedBackup(
                "expected a notes array".to_string(),
            ))
        }
    };

    if entries.is_empty() {
        return Err(AppError::NoNotesFound);
    }

    let now = Utc::now();
    let mut rng = rand::thread_rng();

    let notes: Vec<Note> = entries
        .iter()
        .filter(|entry| has_note_shape(entry))
        .map(|entry| normalize_entry(entry, now, &mut rng))
        .collect();

    if notes.is_empty() {
        return Err(AppError::NoValidNotes);
    }

    tracing::info!("Import parsed {} usable note(s)", notes.len());
    Ok(notes)
}

/// Additive combination: imported notes first, existing untouched.
/// Re-importing the same document doubles the notes; the codec's fresh
/// ids make that harmless.
pub fn merge(imported: Vec<Note>, existing: Vec<Note>) -> Vec<Note> {
    let mut merged = imported;
    merged.extend(existing);
    merged
}

/// Garbage rejection: an entry must be an object carrying at least one
/// of id, title, or content.
fn has_note_shape(entry: &Value) -> bool {
    let Value::Object(map) = entry else {
        return false;
    };
    ["id", "title", "content"]
        .iter()
        .any(|key| map.get(*key).is_some_and(|v| !v.is_null()))
}

fn normalize_entry(entry: &Value, now: DateTime<Utc>, rng: &mut impl Rng) -> Note {
    let title = entry
        .get("title")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    // The content's JSON shape decides the kind; a contradictory
    // declared type is ignored.
    let content = normalize_content(entry.get("content"));

    let date = entry
        .get("date")
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or(now);

    let is_private = truthy(entry.get("isLocked")) || truthy(entry.get("isPrivate"));

    Note {
        // Always a fresh id: merges stay collision-free and re-imports
        // stay harmless.
        id: Uuid::new_v4().to_string(),
        kind: content.kind(),
        title,
        content,
        date,
        is_private,
        is_favorite: truthy(entry.get("isFavorite")),
        theme_index: rng.gen_range(0..THEME_PALETTE_SIZE),
        images: Vec::new(),
        deleted_at: None,
    }
}

fn normalize_content(value: Option<&Value>) -> NoteContent {
    match value {
        Some(Value::String(text)) => NoteContent::Text(text.clone()),
        Some(Value::Array(items)) => {
            NoteContent::Checklist(items.iter().filter_map(normalize_item).collect())
        }
        _ => NoteContent::Text(String::new()),
    }
}

fn normalize_item(item: &Value) -> Option<ChecklistItem> {
    let map = item.as_object()?;

    let id = match map.get("id") {
        Some(Value::String(id)) if !id.is_empty() => id.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => Uuid::new_v4().to_string(),
    };

    Some(ChecklistItem {
        id,
        text: map
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        is_checked: map
            .get("isChecked")
            .and_then(Value::as_bool)
            .unwrap_or(false),
    })
}

fn truthy(value: Option<&Value>) -> bool {
    value.and_then(Value::as_bool).unwrap_or(false)
}
