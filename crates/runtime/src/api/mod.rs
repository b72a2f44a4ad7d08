//! Public runtime API surface.
//!
//! The handle, the host contracts the embedding server implements, and the
//! errors surfaced by startup, reload and shutdown.

pub mod errors;
pub mod handle;
pub mod host;

pub use errors::{Result, RuntimeError};
pub use handle::SoulHandle;
pub use host::{BYPASS_PERMISSION, CommandDispatcher, GameHost, Location};
