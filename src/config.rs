//! Engine configuration constants
//!
//! Central location for retention, validation, and storage-layout
//! constants used throughout the engine.

// ===== Retention =====

/// Days a trashed note survives before the load-time sweep purges it
pub const TRASH_TTL_DAYS: i64 = 30;

// ===== Privacy =====

/// Required PIN length (digits)
pub const PIN_LENGTH: usize = 4;

// ===== Presentation-owned data =====

/// Size of the palette the host owns; imported notes are assigned a
/// random index in this range
pub const THEME_PALETTE_SIZE: u32 = 10;

// ===== Backup format =====

/// Version stamped into exported backup documents
pub const BACKUP_FORMAT_VERSION: u32 = 1;

// ===== Storage keys =====

/// Key holding the active note collection
pub const ACTIVE_NOTES_KEY: &str = "notes_v1";

/// Key holding the trashed note collection
pub const TRASHED_NOTES_KEY: &str = "notes_trash_v1";

/// Key holding the application PIN
pub const PIN_KEY: &str = "pin_v1";

/// Key holding metadata about the most recent backup
pub const BACKUP_META_KEY: &str = "backup_meta_v1";
