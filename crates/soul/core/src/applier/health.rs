use std::collections::BTreeMap;

use crate::penalty::{HealthMode, MaxHealthPenalty};

/// Identifier of the single max-health modifier owned by this system.
/// Re-applying replaces it, so penalties never stack.
pub const MAX_HEALTH_MODIFIER_ID: &str = "soulpoints:max-health-penalty";

/// Health points per heart.
pub const HEALTH_PER_HEART: f64 = 2.0;

/// Host view of a player's max-health attribute. All values in health points.
pub trait HealthAttribute {
    /// Max health before any modifiers.
    fn base_value(&self) -> f64;

    /// Effective max health with all modifiers applied.
    fn value(&self) -> f64;

    /// Additive amount of modifier `id`, if present.
    fn modifier(&self, id: &str) -> Option<f64>;

    fn set_modifier(&mut self, id: &str, amount: f64);

    fn remove_modifier(&mut self, id: &str);

    fn health(&self) -> f64;

    fn set_health(&mut self, health: f64);
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HealthOutcome {
    /// Hearts removed by the new modifier; negative when hearts were added.
    pub applied_hearts: f64,
    /// Change relative to the modifier that was replaced.
    pub delta_hearts: f64,
}

/// Replaces the penalty modifier with one derived from `penalty`.
///
/// `None` only clears the modifier. Remove mode never lowers the ceiling below
/// `max(1, floor)` health points; current health is clamped to the new
/// ceiling. Applying the same penalty twice leaves the same ceiling and
/// reports a zero delta the second time.
pub fn apply_max_health_penalty(
    attribute: &mut dyn HealthAttribute,
    penalty: Option<&MaxHealthPenalty>,
    floor: f64,
) -> HealthOutcome {
    let previous_hearts = attribute
        .modifier(MAX_HEALTH_MODIFIER_ID)
        .map_or(0.0, |amount| -amount / HEALTH_PER_HEART);
    attribute.remove_modifier(MAX_HEALTH_MODIFIER_ID);

    let mut applied_hearts = 0.0;
    if let Some(penalty) = penalty {
        let requested = penalty.amount.abs() * HEALTH_PER_HEART;
        if requested > 0.0 {
            match penalty.mode {
                HealthMode::Remove => {
                    let room = (attribute.base_value() - floor.max(1.0)).max(0.0);
                    let points = requested.min(room);
                    if points > 0.0 {
                        attribute.set_modifier(MAX_HEALTH_MODIFIER_ID, -points);
                        applied_hearts = points / HEALTH_PER_HEART;
                    }
                }
                HealthMode::Add => {
                    attribute.set_modifier(MAX_HEALTH_MODIFIER_ID, requested);
                    applied_hearts = -requested / HEALTH_PER_HEART;
                }
            }
        }
    }

    let ceiling = attribute.value();
    if attribute.health() > ceiling {
        attribute.set_health(ceiling);
    }

    HealthOutcome {
        applied_hearts,
        delta_hearts: applied_hearts - previous_hearts,
    }
}

/// In-memory max-health attribute for hosts without native attributes.
#[derive(Clone, Debug, PartialEq)]
pub struct SimpleHealth {
    pub base: f64,
    pub modifiers: BTreeMap<String, f64>,
    pub health: f64,
}

impl SimpleHealth {
    pub const DEFAULT_MAX_HEALTH: f64 = 20.0;

    pub fn new(base: f64) -> Self {
        Self {
            base,
            modifiers: BTreeMap::new(),
            health: base,
        }
    }
}

impl Default for SimpleHealth {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_HEALTH)
    }
}

impl HealthAttribute for SimpleHealth {
    fn base_value(&self) -> f64 {
        self.base
    }

    fn value(&self) -> f64 {
        (self.base + self.modifiers.values().sum::<f64>()).max(0.0)
    }

    fn modifier(&self, id: &str) -> Option<f64> {
        self.modifiers.get(id).copied()
    }

    fn set_modifier(&mut self, id: &str, amount: f64) {
        self.modifiers.insert(id.to_owned(), amount);
    }

    fn remove_modifier(&mut self, id: &str) {
        self.modifiers.remove(id);
    }

    fn health(&self) -> f64 {
        self.health
    }

    fn set_health(&mut self, health: f64) {
        self.health = health;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLOOR: f64 = 2.0;

    #[test]
    fn remove_lowers_ceiling_and_clamps_health() {
        let mut health = SimpleHealth::default();
        let penalty = MaxHealthPenalty::new(3.0, HealthMode::Remove);

        let outcome = apply_max_health_penalty(&mut health, Some(&penalty), FLOOR);

        assert_eq!(outcome.applied_hearts, 3.0);
        assert_eq!(outcome.delta_hearts, 3.0);
        assert_eq!(health.value(), 14.0);
        assert_eq!(health.health(), 14.0);
    }

    #[test]
    fn applying_twice_is_idempotent() {
        let mut health = SimpleHealth::default();
        let penalty = MaxHealthPenalty::new(2.0, HealthMode::Remove);

        apply_max_health_penalty(&mut health, Some(&penalty), FLOOR);
        let ceiling = health.value();
        let second = apply_max_health_penalty(&mut health, Some(&penalty), FLOOR);

        assert_eq!(health.value(), ceiling);
        assert_eq!(second.delta_hearts, 0.0);
        assert_eq!(health.modifiers.len(), 1);
    }

    #[test]
    fn remove_respects_floor() {
        let mut health = SimpleHealth::new(6.0);
        let penalty = MaxHealthPenalty::new(10.0, HealthMode::Remove);

        let outcome = apply_max_health_penalty(&mut health, Some(&penalty), FLOOR);

        assert_eq!(health.value(), FLOOR);
        assert_eq!(outcome.applied_hearts, 2.0);
    }

    #[test]
    fn add_mode_reports_negative_loss() {
        let mut health = SimpleHealth::default();
        let penalty = MaxHealthPenalty::new(1.5, HealthMode::Add);

        let outcome = apply_max_health_penalty(&mut health, Some(&penalty), FLOOR);

        assert_eq!(health.value(), 23.0);
        assert_eq!(outcome.applied_hearts, -1.5);
        assert_eq!(health.health(), 20.0);
    }

    #[test]
    fn clearing_reports_recovered_hearts() {
        let mut health = SimpleHealth::default();
        let penalty = MaxHealthPenalty::new(2.0, HealthMode::Remove);
        apply_max_health_penalty(&mut health, Some(&penalty), FLOOR);

        let outcome = apply_max_health_penalty(&mut health, None, FLOOR);

        assert_eq!(health.value(), 20.0);
        assert_eq!(outcome.applied_hearts, 0.0);
        assert_eq!(outcome.delta_hearts, -2.0);
    }
}
