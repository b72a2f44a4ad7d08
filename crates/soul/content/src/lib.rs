//! Configuration content for the soul-point system.
//!
//! Loads [`SoulConfig`](soul_core::SoulConfig) from TOML. The file format
//! accepts the compact forms server owners tend to write (`money = 50`,
//! `max-health = 2`, legacy `item-drop` keys) and normalizes them into the
//! core types before validation.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{ConfigLoader, LoadResult};
