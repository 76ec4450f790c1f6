//! Sorted, sectioned views of one person's tasks.

use super::{PriorityScorer, ScoredTask, SortKey, Task};
use chrono::NaiveDate;

/// Which sections a listing contains.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListView {
    /// Started tasks only.
    #[default]
    ActiveOnly,
    /// Started tasks followed by finished and cancelled ones.
    All,
}

/// A ranked listing split into active and terminal sections.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskListing {
    /// Reference date used for `days_to_due`.
    pub as_of: NaiveDate,
    /// View the listing was built for.
    pub view: ListView,
    /// Started tasks in rank order.
    pub active: Vec<ScoredTask>,
    /// Finished and cancelled tasks in rank order; empty for
    /// [`ListView::ActiveOnly`].
    pub terminal: Vec<ScoredTask>,
}

impl TaskListing {
    /// Returns `true` when neither section has rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty() && self.terminal.is_empty()
    }
}

/// Builds listings for a reference date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskLister {
    scorer: PriorityScorer,
    view: ListView,
    sort_key: SortKey,
}

impl TaskLister {
    /// Creates an active-only lister sorting on the full key.
    #[must_use]
    pub const fn new(as_of: NaiveDate) -> Self {
        Self {
            scorer: PriorityScorer::new(as_of),
            view: ListView::ActiveOnly,
            sort_key: SortKey::PriorityThenDurationThenStatus,
        }
    }

    /// Selects the view.
    #[must_use]
    pub const fn with_view(mut self, view: ListView) -> Self {
        self.view = view;
        self
    }

    /// Selects the sort key.
    #[must_use]
    pub const fn with_sort_key(mut self, sort_key: SortKey) -> Self {
        self.sort_key = sort_key;
        self
    }

    /// Ranks `tasks` and splits them into sections.
    ///
    /// Both sections keep the global rank order.
    #[must_use]
    pub fn list(&self, tasks: impl IntoIterator<Item = Task>) -> TaskListing {
        let (active, terminal): (Vec<_>, Vec<_>) = self
            .scorer
            .rank(tasks, self.sort_key)
            .into_iter()
            .partition(|scored| scored.task.is_active());
        let terminal = match self.view {
            ListView::ActiveOnly => Vec::new(),
            ListView::All => terminal,
        };
        TaskListing {
            as_of: self.scorer.reference_date(),
            view: self.view,
            active,
            terminal,
        }
    }
}
