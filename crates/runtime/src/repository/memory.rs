//! In-memory RecordRepository implementation for tests and local runs.

use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{RecordMap, RecordRepository, RepositoryError, Result};

/// In-memory implementation of RecordRepository.
#[derive(Default)]
pub struct InMemoryRecordRepository {
    records: RwLock<RecordMap>,
    saves: AtomicUsize,
}

impl InMemoryRecordRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: RecordMap) -> Self {
        Self {
            records: RwLock::new(records),
            saves: AtomicUsize::new(0),
        }
    }

    /// Number of completed `save_all` calls.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::Relaxed)
    }

    /// Copy of the last saved map.
    pub fn snapshot(&self) -> Result<RecordMap> {
        self.load_all()
    }
}

impl RecordRepository for InMemoryRecordRepository {
    fn load_all(&self) -> Result<RecordMap> {
        let records = self
            .records
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(records.clone())
    }

    fn save_all(&self, records: &RecordMap) -> Result<()> {
        let mut stored = self
            .records
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        *stored = records.clone();
        self.saves.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
