//! Domain model for todo prioritisation.
//!
//! Tasks, their lifecycle, priority scoring, running-index assignment and
//! partial edits live here, free of any storage concern.

mod edit;
mod error;
mod ids;
mod index;
mod listing;
mod priority;
mod status;
mod task;

pub use edit::{DueDateInput, TaskEdit};
pub use error::{ParseTaskStatusError, TodoDomainError};
pub use ids::{DatabaseName, PersonId, RunningIndex};
pub use index::{FreshAssignment, IndexRemap, UnmappedIndexError, assign_fresh};
pub use listing::{ListView, TaskLister, TaskListing};
pub use priority::{PriorityScorer, ScoredTask, SortKey, compare, priority_score};
pub use status::{Importance, TaskStatus};
pub use task::{Task, UNKNOWN_DURATION_MINUTES, parse_date};
