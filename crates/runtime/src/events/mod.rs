//! Topic-based event system.
//!
//! The runtime publishes structured events instead of player messages; a
//! messaging layer subscribes to the topics it renders.

mod bus;
mod types;

pub use bus::{EventBus, Topic};
pub use types::{ChangeReason, CounterChange, DeathReport, DropRelease, SoulEvent};
