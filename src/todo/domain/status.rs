//! Task lifecycle status and importance tiers.

use super::{ParseTaskStatusError, TodoDomainError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task lifecycle status.
///
/// Declaration order is the tiebreak order used by the "all" listing:
/// active tasks sort ahead of terminal ones.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task is open and being worked on.
    #[default]
    Started,
    /// Task has been completed.
    Finished,
    /// Task has been abandoned.
    Cancelled,
}

impl TaskStatus {
    /// All statuses an operator may assign.
    pub const ALL: [Self; 3] = [Self::Started, Self::Finished, Self::Cancelled];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::Finished => "finished",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns `true` for finished and cancelled tasks.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Cancelled)
    }

    /// Returns `true` when an edit may move a task from `self` to `target`.
    ///
    /// Started tasks may move anywhere. Terminal tasks only accept their
    /// own status again. This is deliberately stricter than accepting any
    /// known status: an edit never reopens a closed task and never swaps
    /// `finished` for `cancelled` or back.
    #[must_use]
    pub fn can_transition_to(self, target: Self) -> bool {
        match self {
            Self::Started => true,
            Self::Finished | Self::Cancelled => self == target,
        }
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "started" => Ok(Self::Started),
            "finished" => Ok(Self::Finished),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Importance tier of a task, one of `0`, `1` or `2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Importance(u8);

impl Importance {
    /// Lowest tier.
    pub const LOW: Self = Self(0);
    /// Tier assumed when a task does not record one.
    pub const NORMAL: Self = Self(1);
    /// Highest tier.
    pub const HIGH: Self = Self(2);

    /// Creates a validated importance tier.
    ///
    /// # Errors
    ///
    /// Returns [`TodoDomainError::InvalidImportance`] when `value` is not
    /// `0`, `1` or `2`.
    pub const fn new(value: i64) -> Result<Self, TodoDomainError> {
        match value {
            0 => Ok(Self::LOW),
            1 => Ok(Self::NORMAL),
            2 => Ok(Self::HIGH),
            _ => Err(TodoDomainError::InvalidImportance(value)),
        }
    }

    /// Returns the numeric tier.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl Default for Importance {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl TryFrom<i64> for Importance {
    type Error = TodoDomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Importance> for i64 {
    fn from(value: Importance) -> Self {
        Self::from(value.0)
    }
}

impl fmt::Display for Importance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
