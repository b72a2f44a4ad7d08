//! Repository contract for the per-player record map.

use std::collections::BTreeMap;
use std::path::PathBuf;

use soul_core::{PlayerId, PlayerRecord};

use super::Result;

/// Snapshot of every known player record.
pub type RecordMap = BTreeMap<PlayerId, PlayerRecord>;

/// Durable storage for player records.
///
/// The whole map is read once at startup and rewritten on every save. Records
/// are never deleted.
pub trait RecordRepository: Send + Sync {
    /// Load every stored record. A missing store is an empty map.
    fn load_all(&self) -> Result<RecordMap>;

    /// Replace the stored map with `records`.
    fn save_all(&self, records: &RecordMap) -> Result<()>;

    /// Moves unreadable stored data aside so the next save cannot replace it.
    /// Returns where it went, `None` when there was nothing to move.
    fn set_aside(&self) -> Result<Option<PathBuf>> {
        Ok(None)
    }
}
