//! Unified error types surfaced by the runtime API.
//!
//! Gameplay paths degrade instead of failing (persistence problems are
//! logged), so these errors come from startup, reload and shutdown.
use thiserror::Error;

pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("runtime requires a game host before building")]
    MissingHost,

    #[error("runtime requires a command dispatcher before building")]
    MissingDispatcher,

    #[error("invalid soul point configuration")]
    InvalidConfig(#[source] soul_core::ConfigError),

    #[error("failed to load configuration: {0}")]
    ConfigLoad(String),

    #[error("recovery worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
