//! Partial edits applied to a single task.

use super::{Importance, Task, TaskStatus, TodoDomainError, parse_date};
use chrono::{Days, NaiveDate};

/// A due date as typed by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueDateInput {
    /// Days after the task's begin date.
    OffsetDays(i64),
    /// A calendar date.
    Absolute(NaiveDate),
}

impl DueDateInput {
    /// Parses operator input, trying an integer day offset before an ISO
    /// date.
    ///
    /// # Errors
    ///
    /// Returns [`TodoDomainError::InvalidDate`] when the input is neither.
    pub fn parse(raw: &str) -> Result<Self, TodoDomainError> {
        match raw.trim().parse::<i64>() {
            Ok(days) => Ok(Self::OffsetDays(days)),
            Err(_) => parse_date(raw).map(Self::Absolute),
        }
    }

    /// Resolves the input against the task's begin date.
    ///
    /// # Errors
    ///
    /// Returns [`TodoDomainError::MissingBeginDate`] for an offset on a task
    /// with no begin date, or [`TodoDomainError::InvalidDate`] when the
    /// offset leaves the calendar range.
    pub fn resolve(self, task: &Task) -> Result<NaiveDate, TodoDomainError> {
        match self {
            Self::Absolute(date) => Ok(date),
            Self::OffsetDays(days) => {
                let begin = task
                    .begin_date()
                    .ok_or(TodoDomainError::MissingBeginDate(
                        task.running_index().unwrap_or_default(),
                    ))?;
                let magnitude = Days::new(days.unsigned_abs());
                let shifted = if days >= 0 {
                    begin.checked_add_days(magnitude)
                } else {
                    begin.checked_sub_days(magnitude)
                };
                shifted.ok_or_else(|| TodoDomainError::InvalidDate(days.to_string()))
            }
        }
    }
}

/// Operator-supplied partial edit: one optional slot per editable field.
///
/// Values are kept as entered and validated together by
/// [`TaskEdit::apply_to`], so a rejected edit never half-applies.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskEdit {
    description: Option<String>,
    due_date: Option<String>,
    estimated_duration: Option<f64>,
    importance: Option<i64>,
    status: Option<String>,
    notes: Option<Vec<String>>,
    begin_date: Option<String>,
    end_date: Option<String>,
}

impl TaskEdit {
    /// Creates an empty edit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the due date from an ISO date or a day offset from the begin
    /// date.
    #[must_use]
    pub fn with_due_date(mut self, due_date: impl Into<String>) -> Self {
        self.due_date = Some(due_date.into());
        self
    }

    /// Overwrites the estimated duration in minutes.
    #[must_use]
    pub const fn with_estimated_duration(mut self, minutes: f64) -> Self {
        self.estimated_duration = Some(minutes);
        self
    }

    /// Sets the importance tier.
    #[must_use]
    pub const fn with_importance(mut self, importance: i64) -> Self {
        self.importance = Some(importance);
        self
    }

    /// Sets the status by name.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Replaces the full notes sequence.
    #[must_use]
    pub fn with_notes(mut self, notes: impl IntoIterator<Item = String>) -> Self {
        self.notes = Some(notes.into_iter().collect());
        self
    }

    /// Replaces the begin date.
    #[must_use]
    pub fn with_begin_date(mut self, begin_date: impl Into<String>) -> Self {
        self.begin_date = Some(begin_date.into());
        self
    }

    /// Replaces the end date.
    #[must_use]
    pub fn with_end_date(mut self, end_date: impl Into<String>) -> Self {
        self.end_date = Some(end_date.into());
        self
    }

    /// Returns `true` when no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Validates every supplied field and returns the edited task.
    ///
    /// `task` itself is never modified.
    ///
    /// # Errors
    ///
    /// Returns [`TodoDomainError`] for the first field that fails
    /// validation.
    pub fn apply_to(&self, task: &Task) -> Result<Task, TodoDomainError> {
        let validated = self.validate(task)?;
        let mut edited = task.clone();
        validated.write_into(&mut edited);
        Ok(edited)
    }

    fn validate(&self, task: &Task) -> Result<ValidatedEdit, TodoDomainError> {
        let description = self
            .description
            .as_ref()
            .map(|text| {
                if text.trim().is_empty() {
                    Err(TodoDomainError::EmptyDescription)
                } else {
                    Ok(text.clone())
                }
            })
            .transpose()?;

        let due_date = self
            .due_date
            .as_deref()
            .map(|raw| DueDateInput::parse(raw)?.resolve(task))
            .transpose()?;

        let duration = self
            .estimated_duration
            .map(|minutes| {
                if minutes.is_finite() && minutes >= 0.0 {
                    Ok(minutes)
                } else {
                    Err(TodoDomainError::InvalidDuration(minutes))
                }
            })
            .transpose()?;

        let importance = self.importance.map(Importance::new).transpose()?;

        let status = self
            .status
            .as_deref()
            .map(|raw| {
                let target = TaskStatus::try_from(raw)?;
                if task.status().can_transition_to(target) {
                    Ok(target)
                } else {
                    Err(TodoDomainError::InvalidStatusTransition {
                        running_index: task.running_index().unwrap_or_default(),
                        from: task.status(),
                        to: target,
                    })
                }
            })
            .transpose()?;

        let begin_date = self.begin_date.as_deref().map(parse_date).transpose()?;
        let end_date = self.end_date.as_deref().map(parse_date).transpose()?;

        Ok(ValidatedEdit {
            description,
            due_date,
            duration,
            importance,
            status,
            notes: self.notes.clone(),
            begin_date,
            end_date,
        })
    }
}

struct ValidatedEdit {
    description: Option<String>,
    due_date: Option<NaiveDate>,
    duration: Option<f64>,
    importance: Option<Importance>,
    status: Option<TaskStatus>,
    notes: Option<Vec<String>>,
    begin_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
}

impl ValidatedEdit {
    fn write_into(self, task: &mut Task) {
        if let Some(description) = self.description {
            task.set_description(description);
        }
        if let Some(due_date) = self.due_date {
            task.set_due_date(due_date);
        }
        if let Some(minutes) = self.duration {
            task.set_duration(minutes);
        }
        if let Some(importance) = self.importance {
            task.set_importance(importance);
        }
        if let Some(status) = self.status {
            task.set_status(status);
        }
        if let Some(notes) = self.notes {
            task.set_notes(notes);
        }
        if let Some(begin_date) = self.begin_date {
            task.set_begin_date(begin_date);
        }
        if let Some(end_date) = self.end_date {
            task.set_end_date(end_date);
        }
    }
}
