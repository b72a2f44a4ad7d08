//! High-level runtime orchestrator.
//!
//! The runtime loads the record store, owns the recovery worker, and exposes
//! a builder-based API for the embedding server to wire in its host
//! primitives.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, oneshot};
use tokio::task::JoinHandle;

use soul_core::{CurrencyLedger, SoulConfig};

use crate::api::handle::Inner;
use crate::api::{CommandDispatcher, GameHost, Result, RuntimeError, SoulHandle};
use crate::clock::{Clock, SystemClock};
use crate::config::SharedConfig;
use crate::events::{EventBus, SoulEvent, Topic};
use crate::pending::PendingDrops;
use crate::repository::{InMemoryRecordRepository, RecordRepository};
use crate::scheduler::{TICK, TaskScheduler, TokioScheduler};
use crate::store::SoulStore;
use crate::workers::RecoveryWorker;

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Period of the online recovery sweep.
    pub sweep_interval: Duration,
    /// How long pending drops wait for a grave collector.
    pub drop_claim_timeout: Duration,
    /// Delay before retained items are put back after a death.
    pub restore_delay: Duration,
    /// Delay before the max-health refresh after a respawn.
    pub respawn_refresh_delay: Duration,
    pub event_buffer_size: usize,
    /// Seed for the partition shuffle; random per death when `None`.
    pub fixed_seed: Option<u64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_secs(5 * 60),
            drop_claim_timeout: TICK * 40,
            restore_delay: TICK,
            respawn_refresh_delay: TICK,
            event_buffer_size: 100,
            fixed_seed: None,
        }
    }
}

/// Main runtime that owns the soul-point services
///
/// [`SoulHandle`] provides a cloneable façade for the host and other plugins.
pub struct SoulRuntime {
    handle: SoulHandle,
    shutdown_tx: oneshot::Sender<()>,
    worker_handle: JoinHandle<()>,
}

impl SoulRuntime {
    /// Create a new runtime builder
    pub fn builder() -> SoulRuntimeBuilder {
        SoulRuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    pub fn handle(&self) -> SoulHandle {
        self.handle.clone()
    }

    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<SoulEvent> {
        self.handle.subscribe(topic)
    }

    /// Shutdown the runtime gracefully
    ///
    /// Stops the recovery worker, removes the max-health modifier from every
    /// online player and saves all records.
    pub async fn shutdown(self) -> Result<()> {
        // The worker may already have exited; a closed channel is fine.
        let _ = self.shutdown_tx.send(());
        self.worker_handle
            .await
            .map_err(RuntimeError::WorkerJoin)?;

        for player in self.handle.host().online_players() {
            self.handle.clear_max_health(&player);
        }

        self.handle.store().save()?;
        tracing::info!("Soul point data saved on shutdown");
        Ok(())
    }
}

/// Builder for [`SoulRuntime`] with flexible configuration.
pub struct SoulRuntimeBuilder {
    config: RuntimeConfig,
    soul_config: Option<SoulConfig>,
    repository: Option<Arc<dyn RecordRepository>>,
    host: Option<Arc<dyn GameHost>>,
    ledger: Option<Arc<dyn CurrencyLedger>>,
    dispatcher: Option<Arc<dyn CommandDispatcher>>,
    scheduler: Option<Arc<dyn TaskScheduler>>,
    clock: Option<Arc<dyn Clock>>,
}

impl SoulRuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            soul_config: None,
            repository: None,
            host: None,
            ledger: None,
            dispatcher: None,
            scheduler: None,
            clock: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Soul-point rules (default: [`SoulConfig::default`])
    pub fn soul_config(mut self, config: SoulConfig) -> Self {
        self.soul_config = Some(config);
        self
    }

    /// Record storage (default: in-memory)
    pub fn repository(mut self, repository: Arc<dyn RecordRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Set required game host
    pub fn host(mut self, host: Arc<dyn GameHost>) -> Self {
        self.host = Some(host);
        self
    }

    /// Currency ledger (optional; currency penalties are skipped without one)
    pub fn ledger(mut self, ledger: Arc<dyn CurrencyLedger>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    /// Set required command dispatcher
    pub fn dispatcher(mut self, dispatcher: Arc<dyn CommandDispatcher>) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    /// Deferred task scheduler (default: tokio timers on the current runtime)
    pub fn scheduler(mut self, scheduler: Arc<dyn TaskScheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Wall clock (default: system time)
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Build the runtime: validate the rules, load stored records and spawn
    /// the recovery worker.
    ///
    /// Must be called from within a tokio runtime.
    pub fn build(self) -> Result<SoulRuntime> {
        let host = self.host.ok_or(RuntimeError::MissingHost)?;
        let dispatcher = self.dispatcher.ok_or(RuntimeError::MissingDispatcher)?;

        let soul_config = self.soul_config.unwrap_or_default();
        soul_config.validate().map_err(RuntimeError::InvalidConfig)?;
        let shared = Arc::new(SharedConfig::new(soul_config));

        let repository = self
            .repository
            .unwrap_or_else(|| Arc::new(InMemoryRecordRepository::new()));
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let scheduler = self
            .scheduler
            .unwrap_or_else(|| Arc::new(TokioScheduler::current()));

        let store = SoulStore::new(
            Arc::clone(&shared),
            Arc::clone(&repository),
            Arc::clone(&clock),
        );
        if let Err(e) = store.load() {
            tracing::warn!("Failed to load soul point data, starting empty: {}", e);
            match repository.set_aside() {
                Ok(Some(backup)) => {
                    tracing::warn!("Moved unreadable soul point data to {}", backup.display())
                }
                Ok(None) => {}
                Err(e) => tracing::warn!("Failed to move unreadable soul point data: {}", e),
            }
        }

        let handle = SoulHandle::new(Inner {
            events: EventBus::with_capacity(self.config.event_buffer_size),
            settings: self.config,
            config: shared,
            store,
            host,
            ledger: self.ledger,
            dispatcher,
            scheduler,
            clock,
            pending: PendingDrops::new(),
        });

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let worker = RecoveryWorker::new(
            handle.clone(),
            handle.settings().sweep_interval,
            shutdown_rx,
        );
        let worker_handle = tokio::spawn(worker.run());

        Ok(SoulRuntime {
            handle,
            shutdown_tx,
            worker_handle,
        })
    }
}
