//! Join, quit and periodic recovery.

use soul_core::{CounterGrant, PlayerId, recovery};

use crate::api::SoulHandle;
use crate::events::{ChangeReason, CounterChange};
use crate::store::Persist;

/// Handler for session boundaries and the recovery sweep.
#[derive(Debug, Clone, Copy)]
pub struct SessionHandler;

impl SessionHandler {
    /// Creates the record if needed, credits offline real-time recovery,
    /// starts the active-time session and applies the max-health modifier.
    pub fn join(&self, soul: &SoulHandle, player: &PlayerId) -> Vec<CounterGrant> {
        let config = soul.config();
        if !config.enabled {
            soul.clear_max_health(player);
            return Vec::new();
        }

        let now = soul.now();
        let grants = soul
            .store()
            .update(player, Persist::Now, |record, config| {
                recovery::on_join(record, config, now)
            });
        self.publish(soul, player, &grants);
        soul.refresh_max_health(player);
        grants
    }

    /// Banks active play time and persists the record.
    pub fn quit(&self, soul: &SoulHandle, player: &PlayerId) -> Vec<CounterGrant> {
        if !soul.config().enabled {
            return Vec::new();
        }
        let now = soul.now();
        let grants = soul
            .store()
            .update_existing(player, Persist::Now, |record, config| {
                recovery::on_quit(record, config, now)
            })
            .unwrap_or_default();
        self.publish(soul, player, &grants);
        grants
    }

    /// Regenerates every online player and saves once if anything changed.
    /// Returns the number of players that received at least one unit.
    pub fn sweep(&self, soul: &SoulHandle) -> usize {
        if !soul.config().enabled {
            return 0;
        }
        let now = soul.now();
        let mut rewarded = 0;

        for player in soul.host().online_players() {
            let grants = soul
                .store()
                .update_existing(&player, Persist::Deferred, |record, config| {
                    recovery::sweep(record, config, now)
                })
                .unwrap_or_default();
            if grants.iter().any(|grant| grant.granted() > 0) {
                rewarded += 1;
            }
            self.publish(soul, &player, &grants);
        }

        soul.store().flush_if_dirty();
        if rewarded > 0 {
            tracing::debug!("Recovery sweep rewarded {} players", rewarded);
        }
        rewarded
    }

    fn publish(&self, soul: &SoulHandle, player: &PlayerId, grants: &[CounterGrant]) {
        for grant in grants.iter().filter(|grant| grant.granted() > 0) {
            let change = CounterChange {
                player: player.clone(),
                counter: grant.counter,
                old: grant.before,
                new: grant.after,
                reason: ChangeReason::Recovery,
            };
            soul.after_change(Some(&change), true);
        }
    }
}
