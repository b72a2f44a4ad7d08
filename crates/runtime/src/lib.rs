//! Runtime orchestration for the soul-point death penalty system.
//!
//! This crate wires the pure rules of `soul-core` to a game server: it keeps
//! player records in a locked store, reacts to deaths, kills, respawns and
//! sessions, runs recovery on a timer, and publishes structured events.
//! Consumers build a [`SoulRuntime`] and hand out [`SoulHandle`] clones.
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the handle and the host contracts servers implement
//! - [`handlers`] reacts to host events (death, kill, respawn, join/quit)
//! - [`events`] provides topic-based event bus for flexible event routing
//! - [`admin`] parses and executes administrative commands
//! - [`store`] and [`repository`] keep and persist player records
//! - [`workers`] keeps background tasks internal to the crate
pub mod admin;
pub mod api;
pub mod clock;
pub mod config;
pub mod events;
pub mod handlers;
pub mod pending;
pub mod repository;
pub mod runtime;
pub mod scheduler;
pub mod store;

mod workers;

pub use admin::{AdminCommand, AdminError, AdminReply};
pub use api::{
    BYPASS_PERMISSION, CommandDispatcher, GameHost, Location, Result, RuntimeError, SoulHandle,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::SharedConfig;
pub use events::{
    ChangeReason, CounterChange, DeathReport, DropRelease, EventBus, SoulEvent, Topic,
};
pub use handlers::{DeathEvent, InventoryClose, InventoryView};
pub use repository::{
    FileRecordRepository, InMemoryRecordRepository, RecordMap, RecordRepository, RepositoryError,
};
pub use runtime::{RuntimeConfig, SoulRuntime, SoulRuntimeBuilder};
pub use scheduler::{TICK, Task, TaskScheduler, TokioScheduler};
pub use store::{Persist, SoulStore};
