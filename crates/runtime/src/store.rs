//! In-memory record store with per-player critical sections.
//!
//! The outer map lock is held only to find or insert an entry; every
//! read-modify-write of a record happens under that player's own mutex. Saves
//! snapshot all records and rewrite the repository under a dedicated save
//! lock, so concurrent saves cannot reorder.
//!
//! Persistence failures never surface to gameplay: they are logged and the
//! in-memory state stays authoritative until the next successful save.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use soul_core::{Counter, PlayerId, PlayerRecord, SoulConfig};

use crate::clock::Clock;
use crate::config::SharedConfig;
use crate::events::{ChangeReason, CounterChange};
use crate::repository::{RecordMap, RecordRepository, RepositoryError};

/// When a mutation reaches the repository.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Persist {
    /// Save immediately (write-through).
    Now,
    /// Mark dirty; the caller flushes once after a batch.
    Deferred,
}

type Slot = Arc<Mutex<PlayerRecord>>;

pub struct SoulStore {
    config: Arc<SharedConfig>,
    repository: Arc<dyn RecordRepository>,
    clock: Arc<dyn Clock>,
    records: RwLock<HashMap<PlayerId, Slot>>,
    save_lock: Mutex<()>,
    dirty: AtomicBool,
}

fn lock(slot: &Mutex<PlayerRecord>) -> MutexGuard<'_, PlayerRecord> {
    // A panic mid-update leaves a record that is still plain, clamped data.
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SoulStore {
    pub fn new(
        config: Arc<SharedConfig>,
        repository: Arc<dyn RecordRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            repository,
            clock,
            records: RwLock::new(HashMap::new()),
            save_lock: Mutex::new(()),
            dirty: AtomicBool::new(false),
        }
    }

    /// Loads every stored record, normalizing it against the current config.
    pub fn load(&self) -> Result<usize, RepositoryError> {
        let config = self.config.get();
        let stored = self.repository.load_all()?;
        let count = stored.len();

        let mut records = self
            .records
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        for (player, mut record) in stored {
            record.normalize(&config);
            records.insert(player, Arc::new(Mutex::new(record)));
        }

        tracing::info!("Loaded soul point data for {} players", count);
        Ok(count)
    }

    fn existing(&self, player: &PlayerId) -> Option<Slot> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        records.get(player).cloned()
    }

    /// Returns the player's slot, creating it with starting values if absent.
    /// The flag reports whether it was created.
    fn entry(&self, player: &PlayerId, config: &SoulConfig) -> (Slot, bool) {
        if let Some(slot) = self.existing(player) {
            return (slot, false);
        }
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(slot) = records.get(player) {
            return (Arc::clone(slot), false);
        }
        let record = PlayerRecord::new(config, self.clock.now());
        let slot = Arc::new(Mutex::new(record));
        records.insert(player.clone(), Arc::clone(&slot));
        tracing::debug!("Created soul point record for {}", player);
        (slot, true)
    }

    pub fn contains(&self, player: &PlayerId) -> bool {
        self.existing(player).is_some()
    }

    /// Copy of a record without creating one.
    pub fn record(&self, player: &PlayerId) -> Option<PlayerRecord> {
        self.existing(player).map(|slot| lock(&slot).clone())
    }

    pub fn players(&self) -> Vec<PlayerId> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        records.keys().cloned().collect()
    }

    /// Current soul points. Creates the record on first access while enabled;
    /// when disabled, unknown players read as the starting value.
    pub fn points(&self, player: &PlayerId) -> u32 {
        let config = self.config.get();
        if !config.enabled {
            return self
                .record(player)
                .map_or(config.starting, |record| record.current);
        }
        self.update(player, Persist::Now, |record, _| record.current)
    }

    /// Personal maximum, created lazily like [`SoulStore::points`].
    pub fn personal_max(&self, player: &PlayerId) -> u32 {
        let config = self.config.get();
        if !config.enabled {
            return self
                .record(player)
                .map_or(config.max, |record| record.personal_max);
        }
        self.update(player, Persist::Now, |record, _| record.personal_max)
    }

    /// Runs `f` inside the player's critical section, creating the record if
    /// needed. Creation always persists.
    pub fn update<R>(
        &self,
        player: &PlayerId,
        persist: Persist,
        f: impl FnOnce(&mut PlayerRecord, &SoulConfig) -> R,
    ) -> R {
        let config = self.config.get();
        let (slot, created) = self.entry(player, &config);
        let (result, changed) = {
            let mut record = lock(&slot);
            let before = record.clone();
            let result = f(&mut *record, &*config);
            (result, *record != before)
        };

        if created || (changed && persist == Persist::Now) {
            self.persist();
        } else if changed {
            self.dirty.store(true, Ordering::Release);
        }
        result
    }

    /// Like [`SoulStore::update`] but never creates a record.
    pub fn update_existing<R>(
        &self,
        player: &PlayerId,
        persist: Persist,
        f: impl FnOnce(&mut PlayerRecord, &SoulConfig) -> R,
    ) -> Option<R> {
        if !self.contains(player) {
            return None;
        }
        Some(self.update(player, persist, f))
    }

    /// Writes one counter, clamped. `None` when the system is disabled.
    pub fn write_counter(
        &self,
        player: &PlayerId,
        counter: Counter,
        reason: ChangeReason,
        value: impl FnOnce(u32) -> i64,
    ) -> Option<CounterChange> {
        if !self.config.get().enabled {
            return None;
        }
        let (old, new) = self.update(player, Persist::Now, |record, config| match counter {
            Counter::Points => {
                let old = record.current;
                (old, record.set_current(value(old), config))
            }
            Counter::PersonalMax => {
                let old = record.personal_max;
                (old, record.set_personal_max(value(old), config))
            }
        });
        Some(CounterChange {
            player: player.clone(),
            counter,
            old,
            new,
            reason,
        })
    }

    pub fn set_points(
        &self,
        player: &PlayerId,
        value: i64,
        reason: ChangeReason,
    ) -> Option<CounterChange> {
        self.write_counter(player, Counter::Points, reason, |_| value)
    }

    pub fn add_points(
        &self,
        player: &PlayerId,
        delta: i64,
        reason: ChangeReason,
    ) -> Option<CounterChange> {
        self.write_counter(player, Counter::Points, reason, |old| i64::from(old) + delta)
    }

    pub fn set_personal_max(
        &self,
        player: &PlayerId,
        value: i64,
        reason: ChangeReason,
    ) -> Option<CounterChange> {
        self.write_counter(player, Counter::PersonalMax, reason, |_| value)
    }

    pub fn add_personal_max(
        &self,
        player: &PlayerId,
        delta: i64,
        reason: ChangeReason,
    ) -> Option<CounterChange> {
        self.write_counter(player, Counter::PersonalMax, reason, |old| {
            i64::from(old) + delta
        })
    }

    /// Re-clamps every record, e.g. after a reload lowered the maximum.
    pub fn normalize_all(&self) {
        let config = self.config.get();
        let mut changed = false;
        for slot in self.slots() {
            let mut record = lock(&slot);
            let before = record.clone();
            record.normalize(&config);
            changed |= *record != before;
        }
        if changed {
            self.persist();
        }
    }

    fn slots(&self) -> Vec<Slot> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        records.values().cloned().collect()
    }

    pub fn snapshot(&self) -> RecordMap {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        let slots: Vec<(PlayerId, Slot)> = records
            .iter()
            .map(|(player, slot)| (player.clone(), Arc::clone(slot)))
            .collect();
        drop(records);

        slots
            .into_iter()
            .map(|(player, slot)| (player, lock(&slot).clone()))
            .collect()
    }

    /// Saves everything now. Failures are logged and leave the store dirty.
    pub fn persist(&self) {
        if let Err(e) = self.save() {
            tracing::warn!("Failed to save soul point data: {}", e);
        }
    }

    /// Saves only if a deferred mutation happened since the last save.
    pub fn flush_if_dirty(&self) {
        if self.dirty.load(Ordering::Acquire) {
            self.persist();
        }
    }

    /// Synchronous save that reports failure; used at shutdown.
    pub fn save(&self) -> Result<(), RepositoryError> {
        let _guard = self.save_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.dirty.store(false, Ordering::Release);
        let snapshot = self.snapshot();
        match self.repository.save_all(&snapshot) {
            Ok(()) => Ok(()),
            Err(e) => {
                self.dirty.store(true, Ordering::Release);
                Err(e)
            }
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }
}
