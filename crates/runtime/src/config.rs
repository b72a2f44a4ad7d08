//! Reloadable soul-point configuration shared by every entry point.

use std::sync::{Arc, PoisonError, RwLock};

use soul_core::SoulConfig;

/// Current [`SoulConfig`], swapped atomically on reload.
///
/// Readers take a cheap `Arc` snapshot and keep using it for the whole
/// operation, so a reload never changes rules halfway through a death.
#[derive(Debug)]
pub struct SharedConfig {
    current: RwLock<Arc<SoulConfig>>,
}

impl SharedConfig {
    pub fn new(config: SoulConfig) -> Self {
        Self {
            current: RwLock::new(Arc::new(config)),
        }
    }

    pub fn get(&self) -> Arc<SoulConfig> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    pub fn replace(&self, config: SoulConfig) {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(config);
    }
}

impl Default for SharedConfig {
    fn default() -> Self {
        Self::new(SoulConfig::default())
    }
}
