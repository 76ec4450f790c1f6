//! Priority scoring blending urgency and importance.
//!
//! The score is `importance + 1 / (1 + e^|days_to_due|)`. The logistic term
//! peaks at `0.5` on the due date and decays symmetrically for overdue and
//! far-future tasks, so importance decides the tier and due-date proximity
//! orders tasks within a tier.

use super::{Importance, Task};
use chrono::NaiveDate;
use std::cmp::Ordering;

/// Computes the priority score for one task.
///
/// Tasks without a due date contribute no urgency term.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "the priority score is a real-valued logistic blend"
)]
pub fn priority_score(importance: Importance, days_to_due: Option<i64>) -> f64 {
    let urgency = days_to_due.map_or(0.0, |days| {
        let distance = i32::try_from(days.unsigned_abs()).map_or(f64::INFINITY, f64::from);
        1.0 / (1.0 + distance.exp())
    });
    f64::from(importance.value()) + urgency
}

/// A task paired with the values derived for one reference date.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredTask {
    /// The stored task.
    pub task: Task,
    /// Signed days until the due date, if the task has one.
    pub days_to_due: Option<i64>,
    /// Priority score; higher sorts first.
    pub order: f64,
}

/// Which components take part in the listing sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// `(-order, duration)`.
    PriorityThenDuration,
    /// `(-order, duration, status)`, used when active and terminal tasks
    /// are interleaved.
    PriorityThenDurationThenStatus,
}

/// Scores tasks against a fixed reference date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriorityScorer {
    reference_date: NaiveDate,
}

impl PriorityScorer {
    /// Creates a scorer for the given reference date.
    #[must_use]
    pub const fn new(reference_date: NaiveDate) -> Self {
        Self { reference_date }
    }

    /// Returns the reference date.
    #[must_use]
    pub const fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    /// Derives `days_to_due` and `order` for a task.
    #[must_use]
    pub fn score(&self, task: Task) -> ScoredTask {
        let days_to_due = task.days_to_due(self.reference_date);
        let order = priority_score(task.importance(), days_to_due);
        ScoredTask {
            task,
            days_to_due,
            order,
        }
    }

    /// Scores every task and sorts the result, keeping encounter order
    /// between tasks that compare equal.
    #[must_use]
    pub fn rank(&self, tasks: impl IntoIterator<Item = Task>, key: SortKey) -> Vec<ScoredTask> {
        let mut scored: Vec<ScoredTask> = tasks.into_iter().map(|task| self.score(task)).collect();
        scored.sort_by(|left, right| compare(left, right, key));
        scored
    }
}

/// Orders two scored tasks under the listing sort key.
#[must_use]
pub fn compare(left: &ScoredTask, right: &ScoredTask, key: SortKey) -> Ordering {
    let by_priority = right
        .order
        .total_cmp(&left.order)
        .then_with(|| left.task.sort_duration().total_cmp(&right.task.sort_duration()));
    match key {
        SortKey::PriorityThenDuration => by_priority,
        SortKey::PriorityThenDurationThenStatus => {
            by_priority.then_with(|| left.task.status().cmp(&right.task.status()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::priority_score;
    use crate::todo::domain::Importance;

    #[test]
    fn due_today_adds_half() {
        assert!((priority_score(Importance::LOW, Some(0)) - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_due_date_scores_importance_only() {
        assert!((priority_score(Importance::HIGH, None) - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn extreme_distance_does_not_overflow() {
        let score = priority_score(Importance::NORMAL, Some(i64::MIN));
        assert!(score.is_finite());
        assert!((score - 1.0).abs() < f64::EPSILON);
    }
}
