//! Error types for todo domain validation and parsing.

use super::{RunningIndex, TaskStatus};
use thiserror::Error;

/// Errors returned while validating or mutating todo domain values.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TodoDomainError {
    /// The importance is outside the allowed set.
    #[error("importance {0} is invalid, expected one of [0, 1, 2]")]
    InvalidImportance(i64),

    /// The status string is not a known lifecycle status.
    #[error(transparent)]
    InvalidStatus(#[from] ParseTaskStatusError),

    /// The status edit would move the task backwards in its lifecycle.
    #[error("task {running_index} cannot move from {from} to {to}")]
    InvalidStatusTransition {
        /// Running index of the task being edited.
        running_index: RunningIndex,
        /// Status the task currently has.
        from: TaskStatus,
        /// Status the edit asked for.
        to: TaskStatus,
    },

    /// The description is empty after trimming.
    #[error("task description must not be empty")]
    EmptyDescription,

    /// The estimated duration is negative or not a number.
    #[error("estimated duration {0} is invalid, expected a non-negative number of minutes")]
    InvalidDuration(f64),

    /// The date string is neither a day offset nor an ISO date.
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    /// A relative due date was given for a task without a begin date.
    #[error("task {0} has no begin_date, so a relative due date cannot be resolved")]
    MissingBeginDate(RunningIndex),

    /// The person identifier is empty after trimming.
    #[error("person id must not be empty")]
    EmptyPersonId,

    /// The database name is empty after trimming.
    #[error("database name must not be empty")]
    EmptyDatabaseName,
}

/// Error returned while parsing task statuses from input or storage.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status '{0}', expected one of [started, finished, cancelled]")]
pub struct ParseTaskStatusError(pub String);
