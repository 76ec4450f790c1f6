//! Sequential, best-effort propagation of task list edits to every replica.
//!
//! Each replica is read, edited against its own copy and written back with
//! an upsert. Replicas are visited in configuration order. There is no
//! rollback: a failure leaves earlier replicas updated and later ones
//! untouched, and every replica's fate is reported separately.

use std::fmt;
use std::sync::Arc;

use log::{info, warn};
use serde_json::{Map, Value};

use crate::todo::{
    domain::{DatabaseName, IndexRemap, PersonId, RunningIndex, Task, assign_fresh},
    ports::{DocumentFilter, DocumentStore},
};

/// Key of the task sequence inside a person document.
pub const TODOS_KEY: &str = "todos";

/// A logical edit to apply to every replica's copy of a task list.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplicaEdit {
    /// Overwrite the task addressed by `running_index` with `task`.
    ReplaceTask {
        /// Index of the task in each replica's own copy.
        running_index: RunningIndex,
        /// Replacement task.
        task: Task,
    },
    /// Renumber every task afresh, then remap the active indices.
    Reindex(IndexRemap),
}

/// Why a replica was left unmodified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The replica holds no document for the person.
    PersonMissing,
    /// The person's task list is empty in this replica.
    EmptyList,
    /// No task in this replica carries the index.
    TaskMissing(RunningIndex),
    /// An active task's fresh index has no entry in the reindex plan.
    UnmappedIndex(Option<RunningIndex>),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PersonMissing => f.write_str("person not present"),
            Self::EmptyList => f.write_str("task list is empty"),
            Self::TaskMissing(index) => write!(f, "no task with running_index {index}"),
            Self::UnmappedIndex(Some(index)) => {
                write!(f, "active task {index} is not covered by the reindex plan")
            }
            Self::UnmappedIndex(None) => f.write_str("an active task has no running_index"),
        }
    }
}

/// Result of visiting one replica.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplicaOutcome {
    /// The edited list was written.
    Updated,
    /// The replica was left unmodified.
    Skipped(SkipReason),
    /// Reading, decoding or writing failed; later replicas were not visited.
    Failed(String),
    /// An earlier replica failed before this one was visited.
    NotAttempted,
}

/// Outcome for a single named replica.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicaReport {
    /// Replica name.
    pub database: DatabaseName,
    /// What happened to it.
    pub outcome: ReplicaOutcome,
}

/// Per-replica outcomes of one synchronisation pass, in visit order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    replicas: Vec<ReplicaReport>,
}

impl SyncReport {
    /// Returns every replica report.
    #[must_use]
    pub fn replicas(&self) -> &[ReplicaReport] {
        &self.replicas
    }

    /// Returns the outcome recorded for `database`.
    #[must_use]
    pub fn outcome_for(&self, database: &DatabaseName) -> Option<&ReplicaOutcome> {
        self.replicas
            .iter()
            .find(|report| &report.database == database)
            .map(|report| &report.outcome)
    }

    /// Returns the replicas that were written.
    pub fn updated(&self) -> impl Iterator<Item = &DatabaseName> {
        self.replicas
            .iter()
            .filter(|report| report.outcome == ReplicaOutcome::Updated)
            .map(|report| &report.database)
    }

    /// Returns `true` when any replica failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.replicas
            .iter()
            .any(|report| matches!(report.outcome, ReplicaOutcome::Failed(_)))
    }

    fn push(&mut self, database: DatabaseName, outcome: ReplicaOutcome) {
        self.replicas.push(ReplicaReport { database, outcome });
    }
}

/// Applies [`ReplicaEdit`]s to an ordered list of replicas.
#[derive(Debug)]
pub struct ReplicaSynchronizer<S>
where
    S: DocumentStore,
{
    store: Arc<S>,
    replicas: Vec<DatabaseName>,
    collection: String,
}

impl<S> ReplicaSynchronizer<S>
where
    S: DocumentStore,
{
    /// Creates a synchroniser writing `collection` in each replica.
    #[must_use]
    pub fn new(store: Arc<S>, replicas: Vec<DatabaseName>, collection: impl Into<String>) -> Self {
        Self {
            store,
            replicas,
            collection: collection.into(),
        }
    }

    /// Returns the replicas in visit order.
    #[must_use]
    pub fn replicas(&self) -> &[DatabaseName] {
        &self.replicas
    }

    /// Applies `edit` to each replica's copy of `person`'s task list.
    ///
    /// Skips never stop the pass; the first failure does.
    pub fn apply(&self, person: &PersonId, edit: &ReplicaEdit) -> SyncReport {
        let filter = DocumentFilter::by_id(person);
        let mut report = SyncReport::default();
        let mut failed = false;
        for database in &self.replicas {
            if failed {
                report.push(database.clone(), ReplicaOutcome::NotAttempted);
                continue;
            }
            let outcome = match self.apply_to_replica(database, &filter, edit) {
                Ok(outcome) => outcome,
                Err(reason) => {
                    failed = true;
                    ReplicaOutcome::Failed(reason)
                }
            };
            log_outcome(database, person, &outcome);
            report.push(database.clone(), outcome);
        }
        report
    }

    fn apply_to_replica(
        &self,
        database: &DatabaseName,
        filter: &DocumentFilter,
        edit: &ReplicaEdit,
    ) -> Result<ReplicaOutcome, String> {
        let Some(document) = self
            .store
            .find_one(database, &self.collection, filter)
            .map_err(|err| err.to_string())?
        else {
            return Ok(ReplicaOutcome::Skipped(SkipReason::PersonMissing));
        };
        let mut tasks = decode_todos(&document)?;
        if tasks.is_empty() {
            return Ok(ReplicaOutcome::Skipped(SkipReason::EmptyList));
        }

        match edit {
            ReplicaEdit::ReplaceTask {
                running_index,
                task,
            } => {
                let Some(slot) = tasks
                    .iter_mut()
                    .find(|candidate| candidate.running_index() == Some(*running_index))
                else {
                    return Ok(ReplicaOutcome::Skipped(SkipReason::TaskMissing(
                        *running_index,
                    )));
                };
                slot.clone_from(task);
            }
            ReplicaEdit::Reindex(remap) => {
                assign_fresh(&mut tasks);
                if let Err(unmapped) = remap.apply(&mut tasks) {
                    return Ok(ReplicaOutcome::Skipped(SkipReason::UnmappedIndex(unmapped.0)));
                }
            }
        }

        self.write_todos(database, filter, &tasks)?;
        Ok(ReplicaOutcome::Updated)
    }

    fn write_todos(
        &self,
        database: &DatabaseName,
        filter: &DocumentFilter,
        tasks: &[Task],
    ) -> Result<(), String> {
        let encoded = serde_json::to_value(tasks).map_err(|err| err.to_string())?;
        let mut patch = Map::new();
        patch.insert(TODOS_KEY.to_owned(), encoded);
        self.store
            .update_one(database, &self.collection, filter, patch, true)
            .map_err(|err| err.to_string())?;
        Ok(())
    }
}

/// Reads the task sequence from a person document; absent means empty.
///
/// # Errors
///
/// Returns the decoder message when `todos` is not a list of tasks.
pub fn decode_todos(document: &Map<String, Value>) -> Result<Vec<Task>, String> {
    document.get(TODOS_KEY).map_or_else(
        || Ok(Vec::new()),
        |value| {
            if value.is_null() {
                return Ok(Vec::new());
            }
            serde_json::from_value(value.clone()).map_err(|err| format!("malformed todos: {err}"))
        },
    )
}

fn log_outcome(database: &DatabaseName, person: &PersonId, outcome: &ReplicaOutcome) {
    match outcome {
        ReplicaOutcome::Updated => {
            info!("event=replica_sync database={database} person={person} status=updated");
        }
        ReplicaOutcome::Skipped(reason) => {
            warn!("event=replica_sync database={database} person={person} status=skipped reason=\"{reason}\"");
        }
        ReplicaOutcome::Failed(reason) => {
            warn!("event=replica_sync database={database} person={person} status=failed reason=\"{reason}\"");
        }
        ReplicaOutcome::NotAttempted => {}
    }
}
