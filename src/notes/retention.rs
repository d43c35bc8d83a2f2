//! Trash retention sweep
//!
//! Run once when the repository loads. The only path in the engine that
//! removes data without an explicit user action.

use crate::config::TRASH_TTL_DAYS;
use crate::notes::model::Note;
use chrono::{DateTime, Duration, Utc};

/// Drop trashed notes whose `deleted_at` is older than the TTL.
/// Returns the retained collection and how many notes were pruned.
pub fn sweep_expired(trash: Vec<Note>, now: DateTime<Utc>) -> (Vec<Note>, usize) {
    let cutoff = now - Duration::days(TRASH_TTL_DAYS);
    let before = trash.len();

    let retained: Vec<Note> = trash
        .into_iter()
        // A trashed record without a deletion stamp can never age out;
        // treat it as expired.
        .filter(|note| note.deleted_at.map_or(false, |at| at > cutoff))
        .collect();

    let pruned = before - retained.len();
    if pruned > 0 {
        tracing::info!("Retention sweep pruned {} expired note(s)", pruned);
    }

    (retained, pruned)
}
