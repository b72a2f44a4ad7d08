//! Administrative commands.
//!
//! Parsing is separate from execution so that a server command, a console
//! and `soulctl` share the same grammar and messages. Replies are plain text
//! lines; colouring is left to the caller.

use thiserror::Error;

use soul_core::{
    Counter, ErrorSeverity, HealthMode, MoneyMode, PenaltyParameters, PlayerId, SoulError,
};

use crate::api::SoulHandle;
use crate::events::{ChangeReason, CounterChange};

const BAR_LENGTH: usize = 20;
const BAR_FILLED: char = '█';
const BAR_EMPTY: char = '░';

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AdminError {
    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("Unknown subcommand: {0}")]
    UnknownSubcommand(String),

    #[error("Invalid number: {0}")]
    InvalidNumber(String),

    #[error("Amount must be between 0 and {max}")]
    OutOfRange { max: u32 },

    #[error("Amount must be positive.")]
    NotPositive,

    #[error("Player not found: {0}")]
    UnknownPlayer(String),

    #[error("Soul points are disabled.")]
    Disabled,
}

impl SoulError for AdminError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Disabled => ErrorSeverity::Recoverable,
            _ => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Usage(_) => "ADMIN_USAGE",
            Self::UnknownSubcommand(_) => "ADMIN_UNKNOWN_SUBCOMMAND",
            Self::InvalidNumber(_) => "ADMIN_INVALID_NUMBER",
            Self::OutOfRange { .. } => "ADMIN_OUT_OF_RANGE",
            Self::NotPositive => "ADMIN_NOT_POSITIVE",
            Self::UnknownPlayer(_) => "ADMIN_UNKNOWN_PLAYER",
            Self::Disabled => "ADMIN_DISABLED",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AdminCommand {
    /// Show a player's standing; the sender's own when `player` is `None`.
    Check { player: Option<String> },
    Set { player: String, amount: i64 },
    Give { player: String, amount: i64 },
    Take { player: String, amount: i64 },
    SetMax { player: String, amount: i64 },
    AddMax { player: String, amount: i64 },
    ReduceMax { player: String, amount: i64 },
    /// Penalties at one level, or at every level when `level` is `None`.
    Rates { level: Option<u32> },
}

/// User-visible output of a command.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AdminReply {
    pub lines: Vec<String>,
}

impl AdminReply {
    fn line(line: impl Into<String>) -> Self {
        Self {
            lines: vec![line.into()],
        }
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

fn parse_amount(raw: &str) -> Result<i64, AdminError> {
    raw.trim()
        .parse::<i32>()
        .map(i64::from)
        .map_err(|_| AdminError::InvalidNumber(raw.to_owned()))
}

impl AdminCommand {
    /// Parses `args` (without the command label).
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Result<Self, AdminError> {
        let args: Vec<&str> = args.iter().map(AsRef::as_ref).collect();
        let Some((sub, rest)) = args.split_first() else {
            return Ok(Self::Check { player: None });
        };

        let target = |usage: &'static str| -> Result<(String, i64), AdminError> {
            match rest {
                [player, amount, ..] => Ok(((*player).to_owned(), parse_amount(amount)?)),
                _ => Err(AdminError::Usage(usage)),
            }
        };

        let command = match sub.to_lowercase().as_str() {
            "check" | "view" => Self::Check {
                player: rest.first().map(|p| (*p).to_owned()),
            },
            "set" => {
                let (player, amount) = target("set <player> <amount>")?;
                Self::Set { player, amount }
            }
            "give" | "add" => {
                let (player, amount) = target("give <player> <amount>")?;
                Self::Give { player, amount }
            }
            "take" | "remove" => {
                let (player, amount) = target("take <player> <amount>")?;
                Self::Take { player, amount }
            }
            "setmax" => {
                let (player, amount) = target("setmax <player> <amount>")?;
                Self::SetMax { player, amount }
            }
            "addmax" => {
                let (player, amount) = target("addmax <player> <amount>")?;
                Self::AddMax { player, amount }
            }
            "reducemax" => {
                let (player, amount) = target("reducemax <player> <amount>")?;
                Self::ReduceMax { player, amount }
            }
            "rates" => Self::Rates {
                level: match rest.first() {
                    Some(raw) => Some(
                        raw.trim()
                            .parse::<u32>()
                            .map_err(|_| AdminError::InvalidNumber((*raw).to_owned()))?,
                    ),
                    None => None,
                },
            },
            other => return Err(AdminError::UnknownSubcommand(other.to_owned())),
        };
        Ok(command)
    }

    /// Runs the command. `sender` is the issuing player, if any.
    ///
    /// Validation happens before any state change, so an error leaves every
    /// record untouched.
    pub fn execute(
        &self,
        soul: &SoulHandle,
        sender: Option<&PlayerId>,
    ) -> Result<AdminReply, AdminError> {
        let config = soul.config();
        let max = config.max;

        match self {
            Self::Check { player } => {
                let target = match (player, sender) {
                    (Some(name), _) => resolve(soul, name)?,
                    (None, Some(sender)) => sender.clone(),
                    (None, None) => return Err(AdminError::Usage("check <player>")),
                };
                Ok(check(soul, &target))
            }
            Self::Set { player, amount } => {
                if !(0..=i64::from(max)).contains(amount) {
                    return Err(AdminError::OutOfRange { max });
                }
                let target = resolve(soul, player)?;
                let change = written(soul.set_points(&target, *amount, ChangeReason::Command))?;
                Ok(AdminReply::line(format!(
                    "Set {}'s soul points to {}/{}",
                    display_name(soul, &target),
                    change.new,
                    max
                )))
            }
            Self::Give { player, amount } => {
                let target = resolve(soul, player)?;
                let amount = positive(*amount)?;
                let change = written(soul.add_points(&target, amount, ChangeReason::Command))?;
                Ok(AdminReply::line(format!(
                    "Gave {} soul points to {} (now {}/{})",
                    change.new.saturating_sub(change.old),
                    display_name(soul, &target),
                    change.new,
                    max
                )))
            }
            Self::Take { player, amount } => {
                let target = resolve(soul, player)?;
                let amount = positive(*amount)?;
                let change = written(soul.add_points(&target, -amount, ChangeReason::Command))?;
                Ok(AdminReply::line(format!(
                    "Took {} soul points from {} (now {}/{})",
                    change.old.saturating_sub(change.new),
                    display_name(soul, &target),
                    change.new,
                    max
                )))
            }
            Self::SetMax { player, amount } => {
                if !(0..=i64::from(max)).contains(amount) {
                    return Err(AdminError::OutOfRange { max });
                }
                let target = resolve(soul, player)?;
                let change =
                    written(soul.set_personal_max(&target, *amount, ChangeReason::Command))?;
                Ok(AdminReply::line(format!(
                    "Set {}'s personal max to {}/{}",
                    display_name(soul, &target),
                    change.new,
                    max
                )))
            }
            Self::AddMax { player, amount } => {
                let target = resolve(soul, player)?;
                let amount = positive(*amount)?;
                let change =
                    written(soul.add_personal_max(&target, amount, ChangeReason::Command))?;
                Ok(AdminReply::line(format!(
                    "Raised {}'s personal max by {} (now {}/{})",
                    display_name(soul, &target),
                    change.new.saturating_sub(change.old),
                    change.new,
                    max
                )))
            }
            Self::ReduceMax { player, amount } => {
                let target = resolve(soul, player)?;
                let amount = positive(*amount)?;
                let change =
                    written(soul.add_personal_max(&target, -amount, ChangeReason::Command))?;
                Ok(AdminReply::line(format!(
                    "Lowered {}'s personal max by {} (now {}/{})",
                    display_name(soul, &target),
                    change.old.saturating_sub(change.new),
                    change.new,
                    max
                )))
            }
            Self::Rates { level } => {
                let levels: Vec<u32> = match level {
                    Some(level) => vec![(*level).min(max)],
                    None => (0..=max).rev().collect(),
                };
                let lines = levels
                    .into_iter()
                    .map(|level| describe_rates(level, &config.drop_rates(level)))
                    .collect();
                Ok(AdminReply { lines })
            }
        }
    }
}

fn resolve(soul: &SoulHandle, name: &str) -> Result<PlayerId, AdminError> {
    soul.host()
        .resolve_player(name)
        .ok_or_else(|| AdminError::UnknownPlayer(name.to_owned()))
}

fn display_name(soul: &SoulHandle, player: &PlayerId) -> String {
    soul.host()
        .player_name(player)
        .unwrap_or_else(|| player.to_string())
}

fn positive(amount: i64) -> Result<i64, AdminError> {
    if amount <= 0 {
        Err(AdminError::NotPositive)
    } else {
        Ok(amount)
    }
}

fn written(change: Option<CounterChange>) -> Result<CounterChange, AdminError> {
    change.ok_or(AdminError::Disabled)
}

fn yes_no(value: bool) -> &'static str {
    if value { "Yes" } else { "No" }
}

fn check(soul: &SoulHandle, player: &PlayerId) -> AdminReply {
    let config = soul.config();
    let current = soul.points(player);
    let personal_max = soul.personal_max(player);
    let rates = config.drop_rates(current);

    let mut lines = vec![
        format!("Soul Points - {}", display_name(soul, player)),
        format!(
            "{} ({}/{})",
            progress_bar(current, config.max),
            current,
            config.max
        ),
    ];
    if config.max_points.enabled {
        lines.push(format!("Personal Max: {}/{}", personal_max, config.max));
    }
    lines.push("Current Penalties:".to_owned());
    lines.push(format!("  Item Drop: {}%", rates.item_drop_percent));
    lines.push(format!("  Hotbar Drop: {}", yes_no(rates.hotbar_vulnerable)));
    lines.push(format!("  Armor Drop: {}", yes_no(rates.armor_vulnerable)));

    let ceiling = soul
        .record(player)
        .map_or(config.max, |record| record.ceiling(&config));
    if current < ceiling {
        let next = soul.time_until_next_recovery(player, Counter::Points);
        lines.push(format!("Next Recovery: {}", format_remaining(next)));
    }
    if config.max_points.enabled
        && config.max_points.regeneration_enabled
        && personal_max < config.max
    {
        let next = soul.time_until_next_recovery(player, Counter::PersonalMax);
        lines.push(format!("Next Max Recovery: {}", format_remaining(next)));
    }
    AdminReply { lines }
}

/// One-line summary of the penalties at `level`.
pub fn describe_rates(level: u32, rates: &PenaltyParameters) -> String {
    let money = match rates.money.mode {
        MoneyMode::Flat => format!("{:.2}", rates.money.amount),
        MoneyMode::Percent => format!("{}%", rates.money.amount),
    };
    let sign = match rates.max_health.mode {
        HealthMode::Remove => '-',
        HealthMode::Add => '+',
    };
    format!(
        "Level {}: {}% items, hotbar {}, armor {}, money {}, max health {}{} hearts",
        level,
        rates.item_drop_percent,
        yes_no(rates.hotbar_vulnerable),
        yes_no(rates.armor_vulnerable),
        money,
        sign,
        rates.max_health.amount
    )
}

/// Fixed-width bar with `current / max` of its cells filled.
pub fn progress_bar(current: u32, max: u32) -> String {
    let filled = if max == 0 {
        0
    } else {
        (current.min(max) as usize * BAR_LENGTH) / max as usize
    };
    let mut bar = String::with_capacity(BAR_LENGTH * BAR_FILLED.len_utf8());
    bar.extend(std::iter::repeat_n(BAR_FILLED, filled));
    bar.extend(std::iter::repeat_n(BAR_EMPTY, BAR_LENGTH - filled));
    bar
}

/// `Ready!` when due, `Paused` when the counter is not running, otherwise
/// the largest non-zero units (`1h 2m 3s`, `4m 5s`, `6s`).
pub fn format_remaining(ms: Option<u64>) -> String {
    let Some(ms) = ms else {
        return "Paused".to_owned();
    };
    if ms == 0 {
        return "Ready!".to_owned();
    }
    let total = ms / 1000;
    let (hours, minutes, seconds) = (total / 3600, (total / 60) % 60, total % 60);
    if hours > 0 {
        format!("{hours}h {minutes}m {seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}
