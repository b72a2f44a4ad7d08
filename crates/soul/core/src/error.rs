//! Common error infrastructure for soul-core.
//!
//! The core is almost infallible: missing configuration falls back to
//! defaults and penalty application reports outcomes instead of failing. The
//! only hard errors are invalid configurations, rejected up front by
//! [`SoulConfig::validate`](crate::SoulConfig::validate).

/// Severity level of an error, used for categorization and recovery strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Temporary condition; retrying or degrading is fine.
    Recoverable,

    /// Invalid input that should be rejected without retry.
    Validation,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }
}

/// Common trait for all errors raised by the soul-point crates.
///
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait SoulError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// Rejected configuration values.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("maximum soul points must be at least 1")]
    ZeroMaximum,

    #[error("starting soul points ({starting}) exceed the maximum ({max})")]
    StartingAboveMaximum { starting: u32, max: u32 },

    #[error("{counter} recovery interval must be at least one second")]
    ZeroInterval { counter: &'static str },

    #[error("minimum max health must be a positive finite number, got {0}")]
    InvalidHealthFloor(f64),

    #[error("balance epsilon must be a non-negative finite number, got {0}")]
    InvalidEpsilon(f64),

    #[error("penalty amount in {tier} must be finite")]
    NonFiniteAmount { tier: String },
}

impl SoulError for ConfigError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::ZeroMaximum => "CONFIG_ZERO_MAXIMUM",
            Self::StartingAboveMaximum { .. } => "CONFIG_STARTING_ABOVE_MAXIMUM",
            Self::ZeroInterval { .. } => "CONFIG_ZERO_INTERVAL",
            Self::InvalidHealthFloor(_) => "CONFIG_INVALID_HEALTH_FLOOR",
            Self::InvalidEpsilon(_) => "CONFIG_INVALID_EPSILON",
            Self::NonFiniteAmount { .. } => "CONFIG_NON_FINITE_AMOUNT",
        }
    }
}
