//! Running-index assignment.
//!
//! Active tasks are numbered `1, 2, 3, …` and terminal tasks `-1, -2, …`,
//! so the two numbering spaces never collide.

use super::{RunningIndex, ScoredTask, Task};
use std::collections::BTreeMap;
use thiserror::Error;

/// Counts produced by a fresh assignment pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FreshAssignment {
    /// Number of active tasks numbered `1..=active`.
    pub active: usize,
    /// Number of terminal tasks numbered `-1..=-terminal`.
    pub terminal: usize,
}

/// Renumbers every task in stored order.
///
/// Active tasks receive consecutive positive indices starting at `1`;
/// finished and cancelled tasks receive consecutive negative indices
/// starting at `-1`. Both counters follow encounter order.
pub fn assign_fresh(tasks: &mut [Task]) -> FreshAssignment {
    let mut next_active: i64 = 1;
    let mut next_terminal: i64 = -1;
    let mut counts = FreshAssignment::default();
    for task in tasks.iter_mut() {
        if task.is_active() {
            task.set_running_index(RunningIndex::new(next_active));
            next_active += 1;
            counts.active += 1;
        } else {
            task.set_running_index(RunningIndex::new(next_terminal));
            next_terminal -= 1;
            counts.terminal += 1;
        }
    }
    counts
}

/// An active task whose index has no entry in an [`IndexRemap`].
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("active task index {0:?} has no entry in the reindex plan")]
pub struct UnmappedIndexError(pub Option<RunningIndex>);

/// Old-to-new index mapping for active tasks.
///
/// Terminal tasks are never mapped; a sorted reindex renumbers the active
/// space only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexRemap {
    mapping: BTreeMap<RunningIndex, RunningIndex>,
}

impl IndexRemap {
    /// Builds the mapping from a ranked list, numbering active tasks
    /// `1..=N` in rank order.
    ///
    /// Active tasks that carry no running index are left out.
    #[must_use]
    pub fn from_ranked(ranked: &[ScoredTask]) -> Self {
        let mapping = ranked
            .iter()
            .filter(|scored| scored.task.is_active())
            .filter_map(|scored| scored.task.running_index())
            .zip(1_i64..)
            .map(|(old, new)| (old, RunningIndex::new(new)))
            .collect();
        Self { mapping }
    }

    /// Returns the new index for `old`, if mapped.
    #[must_use]
    pub fn get(&self, old: RunningIndex) -> Option<RunningIndex> {
        self.mapping.get(&old).copied()
    }

    /// Returns the number of mapped indices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    /// Returns `true` when nothing is mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }

    /// Applies the mapping to every active task in `tasks`.
    ///
    /// Either every active task is remapped or none is.
    ///
    /// # Errors
    ///
    /// Returns [`UnmappedIndexError`] naming the first active task whose
    /// index is missing from the mapping.
    pub fn apply(&self, tasks: &mut [Task]) -> Result<usize, UnmappedIndexError> {
        let planned = tasks
            .iter()
            .filter(|task| task.is_active())
            .map(|task| {
                task.running_index()
                    .and_then(|old| self.get(old))
                    .ok_or(UnmappedIndexError(task.running_index()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let active = tasks.iter_mut().filter(|task| task.is_active());
        let mut applied = 0;
        for (task, new_index) in active.zip(planned) {
            task.set_running_index(new_index);
            applied += 1;
        }
        Ok(applied)
    }
}
