//! Repository layer for player records.
//!
//! Records are the only data that changes at runtime; configuration is loaded
//! by `soul-content` and never persisted here.

mod error;
mod file;
mod memory;
mod traits;

pub use error::{RepositoryError, Result};
pub use file::FileRecordRepository;
pub use memory::InMemoryRecordRepository;
pub use traits::{RecordMap, RecordRepository};
