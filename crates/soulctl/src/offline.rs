//! Runtime opened over the record file with no game server attached.
//!
//! Every known player is offline, so no inventory, health or command side
//! effects happen; only records change.

use std::collections::BTreeSet;
use std::sync::Arc;

use anyhow::{Context, Result};

use soul_content::ConfigLoader;
use soul_core::{HealthAttribute, InventorySnapshot, ItemStack, PlayerId, SoulConfig};
use soul_runtime::{
    CommandDispatcher, FileRecordRepository, GameHost, Location, RecordRepository, SoulRuntime,
};

use crate::config::CliConfig;

/// Host that knows the players in the record file and nothing else.
pub struct OfflineHost {
    known: BTreeSet<PlayerId>,
    create: bool,
}

impl OfflineHost {
    pub fn new(known: impl IntoIterator<Item = PlayerId>, create: bool) -> Self {
        Self {
            known: known.into_iter().collect(),
            create,
        }
    }
}

impl GameHost for OfflineHost {
    fn is_online(&self, _player: &PlayerId) -> bool {
        false
    }

    fn online_players(&self) -> Vec<PlayerId> {
        Vec::new()
    }

    fn player_name(&self, player: &PlayerId) -> Option<String> {
        Some(player.to_string())
    }

    fn resolve_player(&self, name: &str) -> Option<PlayerId> {
        let id = PlayerId::new(name);
        (self.create || self.known.contains(&id)).then_some(id)
    }

    fn has_permission(&self, _player: &PlayerId, _permission: &str) -> bool {
        false
    }

    fn inventory(&self, _player: &PlayerId) -> InventorySnapshot {
        InventorySnapshot::empty()
    }

    fn clear_inventory(&self, _player: &PlayerId) {}

    fn restore_inventory(&self, _player: &PlayerId, _inventory: &InventorySnapshot) {}

    fn spawn_items(&self, _location: &Location, _items: &[ItemStack]) {}

    fn with_max_health(
        &self,
        _player: &PlayerId,
        _f: &mut dyn FnMut(&mut dyn HealthAttribute),
    ) -> bool {
        false
    }
}

/// Logs commands instead of running them; there is no server console.
pub struct LoggingDispatcher;

impl CommandDispatcher for LoggingDispatcher {
    fn dispatch(&self, command: &str) {
        tracing::info!("Skipping server command offline: {}", command);
    }
}

pub fn load_rules(config: &CliConfig) -> Result<SoulConfig> {
    match &config.config_path {
        Some(path) => ConfigLoader::load(path)
            .with_context(|| format!("Failed to load rules from {}", path.display())),
        None => {
            tracing::debug!("No rules file given, using defaults");
            Ok(SoulConfig::default())
        }
    }
}

/// Opens the runtime over `<data_dir>/playerdata.json`.
///
/// With `create`, unknown player ids get a fresh record instead of an
/// "unknown player" error.
pub fn open(config: &CliConfig, create: bool) -> Result<SoulRuntime> {
    let rules = load_rules(config)?;
    let repository = Arc::new(
        FileRecordRepository::in_dir(&config.data_dir).with_context(|| {
            format!("Failed to prepare data directory {}", config.data_dir.display())
        })?,
    );
    let known = repository
        .load_all()
        .with_context(|| format!("Failed to read {}", repository.path().display()))?
        .into_keys();

    SoulRuntime::builder()
        .soul_config(rules)
        .repository(repository)
        .host(Arc::new(OfflineHost::new(known, create)))
        .dispatcher(Arc::new(LoggingDispatcher))
        .build()
        .context("Failed to open soul point records")
}
