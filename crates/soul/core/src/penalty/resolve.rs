use super::tier::{ItemPenalty, MaxHealthPenalty, MoneyPenalty, PenaltyTable, PenaltyTier};

/// Placeholder substituted with the player's name in tier commands.
pub const PLAYER_PLACEHOLDER: &str = "%player%";

/// Concrete penalties for one resource level.
#[derive(Clone, Debug, PartialEq)]
pub struct PenaltyParameters {
    pub item_drop_percent: u8,
    pub hotbar_vulnerable: bool,
    pub armor_vulnerable: bool,
    pub money: MoneyPenalty,
    pub max_health: MaxHealthPenalty,
    pub commands: Vec<String>,
}

impl PenaltyParameters {
    /// Parameters that change nothing.
    pub fn none() -> Self {
        Self::from_parts(
            ItemPenalty::NONE,
            MoneyPenalty::NONE,
            MaxHealthPenalty::NONE,
            Vec::new(),
        )
    }

    fn from_parts(
        items: ItemPenalty,
        money: MoneyPenalty,
        max_health: MaxHealthPenalty,
        commands: Vec<String>,
    ) -> Self {
        Self {
            item_drop_percent: items.drop_percent.min(100) as u8,
            hotbar_vulnerable: items.hotbar,
            armor_vulnerable: items.armor,
            money,
            max_health: MaxHealthPenalty::new(max_health.amount, max_health.mode),
            commands,
        }
    }

    /// Commands ready for dispatch: placeholder replaced, blanks skipped,
    /// configured order preserved.
    pub fn commands_for(&self, player_name: &str) -> Vec<String> {
        self.commands
            .iter()
            .map(|command| command.trim())
            .filter(|command| !command.is_empty())
            .map(|command| command.replace(PLAYER_PLACEHOLDER, player_name))
            .collect()
    }
}

impl PenaltyTable {
    /// Resolves the penalties for `level`.
    ///
    /// Each dimension is looked up independently: the first tier at or above
    /// `level` (up to `maximum`) that defines it wins, otherwise the default.
    /// `level` is clamped into `[0, maximum]`.
    pub fn resolve(&self, level: u32, maximum: u32) -> PenaltyParameters {
        let level = level.min(maximum);
        let items = self
            .scan(level, maximum, |tier| tier.items)
            .unwrap_or(self.defaults.items);
        let money = self
            .scan(level, maximum, |tier| tier.money)
            .unwrap_or(self.defaults.money);
        let max_health = self
            .scan(level, maximum, |tier| tier.max_health)
            .unwrap_or(self.defaults.max_health);
        let commands = self
            .scan(level, maximum, |tier| tier.commands.clone())
            .unwrap_or_default();

        PenaltyParameters::from_parts(items, money, max_health, commands)
    }

    /// Parameters built from the default record alone, ignoring every tier.
    pub fn defaults_only(&self) -> PenaltyParameters {
        PenaltyParameters::from_parts(
            self.defaults.items,
            self.defaults.money,
            self.defaults.max_health,
            Vec::new(),
        )
    }

    fn scan<T>(
        &self,
        level: u32,
        maximum: u32,
        pick: impl Fn(&PenaltyTier) -> Option<T>,
    ) -> Option<T> {
        self.tiers
            .range(level..=maximum)
            .find_map(|(_, tier)| pick(tier))
    }
}
