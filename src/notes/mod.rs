//! Notes module
//!
//! Note data model, the repository owning the active/trashed collections
//! and the application PIN, and the trash retention sweep.

pub mod model;
pub mod repository;
pub mod retention;

pub use model::{ChecklistItem, Note, NoteContent, NoteDraft, NoteKind, NotePatch, NoteView};
pub use repository::{BackupMetadata, NoteRepository};
