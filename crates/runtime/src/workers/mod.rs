//! Worker tasks that back the runtime orchestration.

mod recovery;

pub use recovery::RecoveryWorker;
