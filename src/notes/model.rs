//! Note data model
//!
//! Serde wire names match the persisted document format (camelCase, a
//! `type` discriminator, `deletedAt` only present on trashed notes).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Discriminator for the two note shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteKind {
    Text,
    Checklist,
}

/// One entry of a checklist note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    pub id: String,
    pub text: String,
    pub is_checked: bool,
}

impl ChecklistItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            is_checked: false,
        }
    }
}

/// Note body. Serialized untagged: a JSON string for text notes, a JSON
/// array for checklists, matching the stored document shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NoteContent {
    Text(String),
    Checklist(Vec<ChecklistItem>),
}

impl NoteContent {
    pub fn kind(&self) -> NoteKind {
        match self {
            NoteContent::Text(_) => NoteKind::Text,
            NoteContent::Checklist(_) => NoteKind::Checklist,
        }
    }

    /// Whether the body carries anything beyond whitespace
    pub fn is_blank(&self) -> bool {
        match self {
            NoteContent::Text(text) => text.trim().is_empty(),
            NoteContent::Checklist(items) => items.iter().all(|i| i.text.trim().is_empty()),
        }
    }

    /// Drop checklist items whose text is blank; text bodies pass through.
    pub fn normalized(self) -> Self {
        match self {
            NoteContent::Checklist(items) => NoteContent::Checklist(
                items
                    .into_iter()
                    .filter(|item| !item.text.trim().is_empty())
                    .collect(),
            ),
            text => text,
        }
    }
}

impl Default for NoteContent {
    fn default() -> Self {
        NoteContent::Text(String::new())
    }
}

/// A note, either active or trashed (`deleted_at` present iff trashed)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub title: String,
    pub content: NoteContent,
    /// Always agrees with the content variant; kept as a stored field so
    /// the persisted and backup documents carry the `type` discriminator.
    #[serde(rename = "type")]
    pub kind: NoteKind,
    pub date: DateTime<Utc>,
    pub is_private: bool,
    pub is_favorite: bool,
    pub theme_index: u32,
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Note {
    /// Build a fresh note from a draft. Assigns a new id, stamps the
    /// modification date, and starts unfavorited and untrashed.
    pub fn from_draft(draft: NoteDraft, now: DateTime<Utc>) -> Self {
        let draft = draft.normalized();
        Self {
            id: Uuid::new_v4().to_string(),
            kind: draft.content.kind(),
            title: draft.title,
            content: draft.content,
            date: now,
            is_private: draft.is_private,
            is_favorite: false,
            theme_index: draft.theme_index,
            images: draft.images,
            deleted_at: None,
        }
    }

    /// Merge patch fields into the note and refresh the modification date.
    pub fn apply_patch(&mut self, patch: NotePatch, now: DateTime<Utc>) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(content) = patch.content {
            self.kind = content.kind();
            self.content = content;
        }
        if let Some(is_private) = patch.is_private {
            self.is_private = is_private;
        }
        if let Some(theme_index) = patch.theme_index {
            self.theme_index = theme_index;
        }
        if let Some(images) = patch.images {
            self.images = images;
        }
        self.date = now;
    }

    /// Theme index clamped to the host's palette length.
    pub fn theme_index_in(&self, palette_len: u32) -> u32 {
        if palette_len == 0 {
            0
        } else {
            self.theme_index.min(palette_len - 1)
        }
    }
}

/// Payload for creating or editing a note
#[derive(Debug, Clone)]
pub struct NoteDraft {
    pub title: String,
    pub content: NoteContent,
    pub is_private: bool,
    pub theme_index: u32,
    pub images: Vec<String>,
}

impl NoteDraft {
    pub fn text(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: NoteContent::Text(body.into()),
            is_private: false,
            theme_index: 0,
            images: Vec::new(),
        }
    }

    pub fn checklist(title: impl Into<String>, items: Vec<ChecklistItem>) -> Self {
        Self {
            title: title.into(),
            content: NoteContent::Checklist(items),
            is_private: false,
            theme_index: 0,
            images: Vec::new(),
        }
    }

    /// Drop checklist items whose text is blank; text bodies pass through.
    pub fn normalized(mut self) -> Self {
        self.content = self.content.normalized();
        self
    }

    /// Whether the draft is worth saving: a non-blank title or body.
    pub fn has_content(&self) -> bool {
        !self.title.trim().is_empty() || !self.content.is_blank()
    }
}

/// Partial update for an existing note
#[derive(Debug, Clone, Default)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<NoteContent>,
    pub is_private: Option<bool>,
    pub theme_index: Option<u32>,
    pub images: Option<Vec<String>>,
}

/// Which collection (and filter) a listing reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteView {
    All,
    Favorites,
    Trash,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_follows_content() {
        let note = Note::from_draft(NoteDraft::text("Title", "body"), Utc::now());
        assert_eq!(note.kind, NoteKind::Text);

        let items = vec![ChecklistItem::new("milk")];
        let note = Note::from_draft(NoteDraft::checklist("List", items), Utc::now());
        assert_eq!(note.kind, NoteKind::Checklist);
    }

    #[test]
    fn test_patch_content_switches_kind() {
        let mut note = Note::from_draft(NoteDraft::text("Title", "body"), Utc::now());

        let patch = NotePatch {
            content: Some(NoteContent::Checklist(vec![ChecklistItem::new("one")])),
            ..NotePatch::default()
        };
        note.apply_patch(patch, Utc::now());

        assert_eq!(note.kind, NoteKind::Checklist);
        assert!(matches!(note.content, NoteContent::Checklist(_)));
    }

    #[test]
    fn test_draft_normalization_drops_blank_items() {
        let items = vec![
            ChecklistItem::new("keep"),
            ChecklistItem::new("   "),
            ChecklistItem::new(""),
        ];
        let draft = NoteDraft::checklist("List", items).normalized();

        match draft.content {
            NoteContent::Checklist(items) => {
                assert_eq!(items.len(), 1);
                assert_eq!(items[0].text, "keep");
            }
            NoteContent::Text(_) => panic!("expected checklist content"),
        }
    }

    #[test]
    fn test_has_content() {
        assert!(NoteDraft::text("Title", "").has_content());
        assert!(NoteDraft::text("", "body").has_content());
        assert!(!NoteDraft::text("  ", "  ").has_content());

        let blank = NoteDraft::checklist("", vec![ChecklistItem::new("  ")]);
        assert!(!blank.has_content());
        let filled = NoteDraft::checklist("", vec![ChecklistItem::new("milk")]);
        assert!(filled.has_content());
    }

    #[test]
    fn test_theme_index_clamped() {
        let mut note = Note::from_draft(NoteDraft::text("T", "b"), Utc::now());
        note.theme_index = 42;

        assert_eq!(note.theme_index_in(10), 9);
        assert_eq!(note.theme_index_in(0), 0);
        note.theme_index = 3;
        assert_eq!(note.theme_index_in(10), 3);
    }

    #[test]
    fn test_wire_format() {
        let mut note = Note::from_draft(NoteDraft::text("Title", "body"), Utc::now());
        note.is_favorite = true;

        let json = serde_json::to_value(&note).unwrap();
        assert_eq!(json["type"], "text");
        assert_eq!(json["isFavorite"], true);
        assert_eq!(json["isPrivate"], false);
        assert!(json["themeIndex"].is_number());
        // Active notes never carry deletedAt
        assert!(json.get("deletedAt").is_none());

        let back: Note = serde_json::from_value(json).unwrap();
        assert_eq!(back, note);
    }

    #[test]
    fn test_checklist_wire_format() {
        let items = vec![ChecklistItem::new("milk")];
        let note = Note::from_draft(NoteDraft::checklist("List", items), Utc::now());

        let json = serde_json::to_value(&note).unwrap();
        assert_eq!(json["type"], "checklist");
        assert!(json["content"].is_array());
        assert_eq!(json["content"][0]["isChecked"], false);

        let back: Note = serde_json::from_value(json).unwrap();
        assert_eq!(back, note);
    }
}
