//! Task record stored in a person's `todos` sequence.

use super::{Importance, RunningIndex, TaskStatus, TodoDomainError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Duration in minutes assumed for tasks without an estimate.
pub const UNKNOWN_DURATION_MINUTES: f64 = 10_000.0;

/// One todo item as stored in a person document.
///
/// Keys that are not modelled here are kept in `extra` and written back
/// unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    description: String,
    #[serde(default)]
    status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    importance: Option<Importance>,
    #[serde(
        default,
        with = "lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    due_date: Option<NaiveDate>,
    #[serde(
        default,
        with = "lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    begin_date: Option<NaiveDate>,
    #[serde(
        default,
        with = "lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    duration: Option<Number>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    notes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    running_index: Option<RunningIndex>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl Task {
    /// Creates a started task with the given description.
    ///
    /// # Errors
    ///
    /// Returns [`TodoDomainError::EmptyDescription`] when the description is
    /// blank.
    pub fn new(description: impl Into<String>) -> Result<Self, TodoDomainError> {
        let text = description.into();
        if text.trim().is_empty() {
            return Err(TodoDomainError::EmptyDescription);
        }
        Ok(Self {
            description: text,
            status: TaskStatus::Started,
            importance: None,
            due_date: None,
            begin_date: None,
            end_date: None,
            duration: None,
            notes: Vec::new(),
            running_index: None,
            extra: Map::new(),
        })
    }

    /// Sets the status.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the importance tier.
    #[must_use]
    pub const fn with_importance(mut self, importance: Importance) -> Self {
        self.importance = Some(importance);
        self
    }

    /// Sets the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Sets the begin date.
    #[must_use]
    pub const fn with_begin_date(mut self, begin_date: NaiveDate) -> Self {
        self.begin_date = Some(begin_date);
        self
    }

    /// Sets the estimated duration in minutes.
    ///
    /// Whole minutes are stored as integers. A non-finite value leaves the
    /// duration unchanged.
    #[must_use]
    pub fn with_duration(mut self, minutes: f64) -> Self {
        self.set_duration(minutes);
        self
    }

    /// Sets the notes.
    #[must_use]
    pub fn with_notes(mut self, notes: impl IntoIterator<Item = String>) -> Self {
        self.notes = notes.into_iter().collect();
        self
    }

    /// Sets the running index.
    #[must_use]
    pub const fn with_running_index(mut self, running_index: RunningIndex) -> Self {
        self.running_index = Some(running_index);
        self
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the importance, defaulting to [`Importance::NORMAL`].
    #[must_use]
    pub fn importance(&self) -> Importance {
        self.importance.unwrap_or_default()
    }

    /// Returns the due date, if any.
    #[must_use]
    pub const fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    /// Returns the begin date, if any.
    #[must_use]
    pub const fn begin_date(&self) -> Option<NaiveDate> {
        self.begin_date
    }

    /// Returns the end date, if any.
    #[must_use]
    pub const fn end_date(&self) -> Option<NaiveDate> {
        self.end_date
    }

    /// Returns the recorded duration estimate, if any.
    #[must_use]
    pub fn duration(&self) -> Option<f64> {
        self.duration.as_ref().and_then(Number::as_f64)
    }

    /// Returns the duration used for sorting.
    #[must_use]
    pub fn sort_duration(&self) -> f64 {
        self.duration().unwrap_or(UNKNOWN_DURATION_MINUTES)
    }

    /// Returns the notes.
    #[must_use]
    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    /// Returns the running index, if one has been assigned.
    #[must_use]
    pub const fn running_index(&self) -> Option<RunningIndex> {
        self.running_index
    }

    /// Returns keys carried through from storage that this type does not
    /// model.
    #[must_use]
    pub const fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    /// Returns `true` when the task is still open.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !self.status.is_terminal()
    }

    /// Days from `reference` to the due date; negative when overdue.
    #[must_use]
    pub fn days_to_due(&self, reference: NaiveDate) -> Option<i64> {
        self.due_date
            .map(|due| due.signed_duration_since(reference).num_days())
    }

    /// Marks the task finished on `end_date`.
    ///
    /// # Errors
    ///
    /// Returns [`TodoDomainError::InvalidStatusTransition`] when the task is
    /// already finished or cancelled.
    pub fn mark_finished(&mut self, end_date: NaiveDate) -> Result<(), TodoDomainError> {
        if self.status.is_terminal() {
            return Err(TodoDomainError::InvalidStatusTransition {
                running_index: self.running_index.unwrap_or_default(),
                from: self.status,
                to: TaskStatus::Finished,
            });
        }
        self.status = TaskStatus::Finished;
        self.end_date = Some(end_date);
        Ok(())
    }

    pub(crate) fn set_running_index(&mut self, running_index: RunningIndex) {
        self.running_index = Some(running_index);
    }

    pub(crate) fn set_description(&mut self, description: String) {
        self.description = description;
    }

    pub(crate) const fn set_status(&mut self, status: TaskStatus) {
        self.status = status;
    }

    pub(crate) const fn set_importance(&mut self, importance: Importance) {
        self.importance = Some(importance);
    }

    pub(crate) const fn set_due_date(&mut self, due_date: NaiveDate) {
        self.due_date = Some(due_date);
    }

    pub(crate) const fn set_begin_date(&mut self, begin_date: NaiveDate) {
        self.begin_date = Some(begin_date);
    }

    pub(crate) const fn set_end_date(&mut self, end_date: NaiveDate) {
        self.end_date = Some(end_date);
    }

    pub(crate) fn set_duration(&mut self, minutes: f64) {
        // Display drops the fraction of whole values, so `45.0` parses back
        // as the integer `45`.
        if let Ok(number) = minutes.to_string().parse::<Number>() {
            self.duration = Some(number);
        }
    }

    pub(crate) fn set_notes(&mut self, notes: Vec<String>) {
        self.notes = notes;
    }
}

/// Parses an ISO calendar date, accepting a trailing time component.
///
/// # Errors
///
/// Returns [`TodoDomainError::InvalidDate`] when no date can be read.
pub fn parse_date(value: &str) -> Result<NaiveDate, TodoDomainError> {
    let trimmed = value.trim();
    let date_part = trimmed
        .split_once(['T', ' '])
        .map_or(trimmed, |(date, _)| date);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|_| TodoDomainError::InvalidDate(value.to_owned()))
}

/// Serde helpers for optional dates stored as strings.
mod lenient_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    pub(super) fn serialize<S>(value: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(date) => serializer.serialize_str(&date.format("%Y-%m-%d").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.filter(|text| !text.trim().is_empty())
            .map(|text| super::parse_date(&text).map_err(D::Error::custom))
            .transpose()
    }
}
