//! Note repository
//!
//! Owns the in-memory collections (active notes, trashed notes, the
//! application PIN) and every mutation over them; the sole writer of the
//! persisted records. Constructed once per session via [`NoteRepository::load`].
//!
//! Every mutation persists first and commits to memory only on success,
//! so a failed store write never leaves memory ahead of disk.

use crate::config::{ACTIVE_NOTES_KEY, BACKUP_META_KEY, PIN_KEY, PIN_LENGTH, TRASHED_NOTES_KEY};
use crate::error::{AppError, Result};
use crate::notes::model::{Note, NoteContent, NoteDraft, NotePatch, NoteView};
use crate::notes::retention;
use crate::services::backup;
use crate::storage::KeyValueStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata about the most recent manual backup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupMetadata {
    pub last_backup: DateTime<Utc>,
    pub filename: String,
    pub note_count: usize,
}

/// Repository over a key-value store
pub struct NoteRepository<S: KeyValueStore> {
    store: S,
    active: Vec<Note>,
    trash: Vec<Note>,
    pin: Option<String>,
    backup_meta: Option<BackupMetadata>,
}

impl<S: KeyValueStore> NoteRepository<S> {
    /// Load the persisted collections and run the retention sweep.
    /// The pruned trash is written back only when the sweep removed
    /// something.
    pub async fn load(store: S) -> Result<Self> {
        tracing::info!("Loading note repository");

        let active: Vec<Note> = match store.get(ACTIVE_NOTES_KEY).await? {
            Some(json) => serde_json::from_str(&json)?,
            None => Vec::new(),
        };

        let stored_trash: Vec<Note> = match store.get(TRASHED_NOTES_KEY).await? {
            Some(json) => serde_json::from_str(&json)?,
            None => Vec::new(),
        };

        let (trash, pruned) = retention::sweep_expired(stored_trash, Utc::now());
        if pruned > 0 {
            let json = serde_json::to_string(&trash)?;
            store.set(TRASHED_NOTES_KEY, &json).await?;
        }

        let pin = store.get(PIN_KEY).await?;

        let backup_meta = match store.get(BACKUP_META_KEY).await? {
            Some(json) => Some(serde_json::from_str(&json)?),
            None => None,
        };

        tracing::info!(
            "Repository loaded: {} active, {} trashed",
            active.len(),
            trash.len()
        );

        Ok(Self {
            store,
            active,
            trash,
            pin,
            backup_meta,
        })
    }

    // ===== Reads =====

    /// Live read of a single note, active or trashed.
    pub fn get(&self, id: &str) -> Option<&Note> {
        self.active
            .iter()
            .chain(self.trash.iter())
            .find(|note| note.id == id)
    }

    /// The active collection, most-recent-first.
    pub fn notes(&self) -> &[Note] {
        &self.active
    }

    /// The trashed collection, most-recently-deleted-first.
    pub fn trashed(&self) -> &[Note] {
        &self.trash
    }

    /// Filtered, ordered view over one collection. The query is a
    /// trimmed, case-insensitive substring match on the title and, for
    /// text notes only, the content. Collection order is preserved.
    pub fn list(&self, view: NoteView, query: &str) -> Vec<Note> {
        let source = match view {
            NoteView::Trash => &self.trash,
            _ => &self.active,
        };

        let query = query.trim().to_lowercase();

        source
            .iter()
            .filter(|note| view != NoteView::Favorites || note.is_favorite)
            .filter(|note| {
                if query.is_empty() {
                    return true;
                }
                if note.title.to_lowercase().contains(&query) {
                    return true;
                }
                match &note.content {
                    NoteContent::Text(body) => body.to_lowercase().contains(&query),
                    NoteContent::Checklist(_) => false,
                }
            })
            .cloned()
            .collect()
    }

    // ===== Mutations =====

    /// Create a note from a draft and prepend it to the active
    /// collection. Rejects a private draft while no PIN is set.
    pub async fn create(&mut self, draft: NoteDraft) -> Result<Note> {
        if draft.is_private && self.pin.is_none() {
            return Err(AppError::PinRequired);
        }

        let note = Note::from_draft(draft, Utc::now());
        tracing::info!("Creating note: {}", note.id);

        let mut next = self.active.clone();
        next.insert(0, note.clone());

        self.persist_active(&next).await?;
        self.active = next;

        Ok(note)
    }

    /// Merge patch fields into an existing active note and refresh its
    /// modification date. Same privacy precondition as [`create`](Self::create).
    pub async fn update(&mut self, id: &str, patch: NotePatch) -> Result<Note> {
        if patch.is_private == Some(true) && self.pin.is_none() {
            return Err(AppError::PinRequired);
        }

        let index = self
            .active
            .iter()
            .position(|note| note.id == id)
            .ok_or_else(|| AppError::NoteNotFound(id.to_string()))?;

        let mut patch = patch;
        patch.content = patch.content.map(NoteContent::normalized);

        let mut next = self.active.clone();
        next[index].apply_patch(patch, Utc::now());

        self.persist_active(&next).await?;
        self.active = next;

        tracing::debug!("Updated note: {}", id);
        Ok(self.active[index].clone())
    }

    /// Flip the favorite flag. Not a content change, so the modification
    /// date is untouched. No-op if the id is unknown.
    pub async fn toggle_favorite(&mut self, id: &str) -> Result<()> {
        let Some(index) = self.active.iter().position(|note| note.id == id) else {
            return Ok(());
        };

        let mut next = self.active.clone();
        next[index].is_favorite = !next[index].is_favorite;

        self.persist_active(&next).await?;
        self.active = next;

        Ok(())
    }

    /// Flip the private flag. Requires a PIN to be set. No-op if the id
    /// is unknown.
    pub async fn toggle_private(&mut self, id: &str) -> Result<()> {
        if self.pin.is_none() {
            return Err(AppError::PinRequired);
        }

        let Some(index) = self.active.iter().position(|note| note.id == id) else {
            return Ok(());
        };

        let mut next = self.active.clone();
        next[index].is_private = !next[index].is_private;

        self.persist_active(&next).await?;
        self.active = next;

        Ok(())
    }

    /// Flip one checklist item and refresh the note's modification date.
    /// No-op for text notes, unknown note ids, and unknown item ids.
    pub async fn toggle_checklist_item(&mut self, id: &str, item_id: &str) -> Result<()> {
        let Some(index) = self.active.iter().position(|note| note.id == id) else {
            return Ok(());
        };

        let mut next = self.active.clone();
        let note = &mut next[index];

        let NoteContent::Checklist(items) = &mut note.content else {
            return Ok(());
        };
        let Some(item) = items.iter_mut().find(|item| item.id == item_id) else {
            return Ok(());
        };

        item.is_checked = !item.is_checked;
        note.date = Utc::now();

        self.persist_active(&next).await?;
        self.active = next;

        Ok(())
    }

    /// Move an active note to the trash, stamping `deleted_at`. No-op if
    /// the id is unknown.
    pub async fn move_to_trash(&mut self, id: &str) -> Result<()> {
        let Some(index) = self.active.iter().position(|note| note.id == id) else {
            return Ok(());
        };

        let mut next_active = self.active.clone();
        let mut note = next_active.remove(index);
        note.deleted_at = Some(Utc::now());

        let mut next_trash = self.trash.clone();
        next_trash.insert(0, note);

        // Trash is written before the active list: a failure between the
        // two writes duplicates the note, never drops it.
        self.persist_trash(&next_trash).await?;
        self.persist_active(&next_active).await?;
        self.trash = next_trash;
        self.active = next_active;

        tracing::info!("Moved note to trash: {}", id);
        Ok(())
    }

    /// Move a trashed note back to the active collection, clearing
    /// `deleted_at`. No-op if the id is unknown.
    pub async fn restore(&mut self, id: &str) -> Result<()> {
        let Some(index) = self.trash.iter().position(|note| note.id == id) else {
            return Ok(());
        };

        let mut next_trash = self.trash.clone();
        let mut note = next_trash.remove(index);
        note.deleted_at = None;

        let mut next_active = self.active.clone();
        next_active.insert(0, note);

        // Active list is written before the trash, same duplication-over-loss
        // ordering as move_to_trash.
        self.persist_active(&next_active).await?;
        self.persist_trash(&next_trash).await?;
        self.active = next_active;
        self.trash = next_trash;

        tracing::info!("Restored note: {}", id);
        Ok(())
    }

    /// Permanently remove a trashed note. Irreversible. No-op if the id
    /// is unknown.
    pub async fn purge(&mut self, id: &str) -> Result<()> {
        let Some(index) = self.trash.iter().position(|note| note.id == id) else {
            return Ok(());
        };

        let mut next = self.trash.clone();
        next.remove(index);

        self.persist_trash(&next).await?;
        self.trash = next;

        tracing::info!("Purged note: {}", id);
        Ok(())
    }

    /// Prepend imported notes to the active collection. Returns how many
    /// were added. Existing notes are never touched.
    pub async fn import_merge(&mut self, imported: Vec<Note>) -> Result<usize> {
        let added = imported.len();
        let next = backup::merge(imported, self.active.clone());

        self.persist_active(&next).await?;
        self.active = next;

        tracing::info!("Imported {} note(s)", added);
        Ok(added)
    }

    // ===== PIN =====

    pub fn pin_is_set(&self) -> bool {
        self.pin.is_some()
    }

    pub fn verify_pin(&self, entry: &str) -> bool {
        self.pin.as_deref() == Some(entry)
    }

    /// Set the application PIN: exactly four ASCII digits.
    pub async fn set_pin(&mut self, pin: &str) -> Result<()> {
        if pin.len() != PIN_LENGTH || !pin.chars().all(|c| c.is_ascii_digit()) {
            return Err(AppError::InvalidPin);
        }

        self.store.set(PIN_KEY, pin).await?;
        self.pin = Some(pin.to_string());

        tracing::info!("Application PIN set");
        Ok(())
    }

    // ===== Backup metadata =====

    /// Record a completed manual backup.
    pub async fn record_backup(&mut self, filename: &str, note_count: usize) -> Result<BackupMetadata> {
        let meta = BackupMetadata {
            last_backup: Utc::now(),
            filename: filename.to_string(),
            note_count,
        };

        let json = serde_json::to_string(&meta)?;
        self.store.set(BACKUP_META_KEY, &json).await?;
        self.backup_meta = Some(meta.clone());

        tracing::debug!("Recorded backup: {}", filename);
        Ok(meta)
    }

    pub fn last_backup(&self) -> Option<&BackupMetadata> {
        self.backup_meta.as_ref()
    }

    // ===== Persistence =====

    async fn persist_active(&self, notes: &[Note]) -> Result<()> {
        let json = serde_json::to_string(notes)?;
        self.store.set(ACTIVE_NOTES_KEY, &json).await
    }

    async fn persist_trash(&self, notes: &[Note]) -> Result<()> {
        let json = serde_json::to_string(notes)?;
        self.store.set(TRASHED_NOTES_KEY, &json).await
    }
}
