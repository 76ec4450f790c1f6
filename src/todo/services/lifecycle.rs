//! Service layer for listing, reindexing, editing and finishing todos.

use std::sync::Arc;

use chrono::NaiveDate;
use log::{debug, info};
use mockable::Clock;
use thiserror::Error;

use super::synchronizer::{ReplicaEdit, ReplicaSynchronizer, SyncReport, decode_todos};
use crate::todo::{
    domain::{
        DatabaseName, IndexRemap, ListView, PersonId, RunningIndex, SortKey, Task, TaskEdit,
        TaskLister, TaskListing, TodoDomainError, assign_fresh,
    },
    ports::{DocumentFilter, DocumentStore, DocumentStoreError},
};

/// Collection holding person documents unless configured otherwise.
pub const DEFAULT_PEOPLE_COLLECTION: &str = "people";

/// Resolved configuration the service runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoSettings {
    replicas: Vec<DatabaseName>,
    collection: String,
    default_assignee: Option<PersonId>,
}

impl TodoSettings {
    /// Creates settings for the given replicas; the first one is primary.
    #[must_use]
    pub fn new(replicas: impl IntoIterator<Item = DatabaseName>) -> Self {
        Self {
            replicas: replicas.into_iter().collect(),
            collection: DEFAULT_PEOPLE_COLLECTION.to_owned(),
            default_assignee: None,
        }
    }

    /// Overrides the people collection name.
    #[must_use]
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    /// Sets the assignee used when a request names none.
    #[must_use]
    pub fn with_default_assignee(mut self, assignee: PersonId) -> Self {
        self.default_assignee = Some(assignee);
        self
    }

    /// Returns the replicas in write order.
    #[must_use]
    pub fn replicas(&self) -> &[DatabaseName] {
        &self.replicas
    }

    /// Returns the people collection name.
    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Returns the default assignee, if configured.
    #[must_use]
    pub const fn default_assignee(&self) -> Option<&PersonId> {
        self.default_assignee.as_ref()
    }
}

/// Request for a ranked listing, optionally reindexing first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListTasksRequest {
    assignee: Option<PersonId>,
    as_of: Option<NaiveDate>,
    view: ListView,
    sort_key: SortKey,
    reindex: bool,
}

impl ListTasksRequest {
    /// Creates an active-only listing request for the default assignee.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            assignee: None,
            as_of: None,
            view: ListView::ActiveOnly,
            sort_key: SortKey::PriorityThenDurationThenStatus,
            reindex: false,
        }
    }

    /// Lists tasks of `assignee` instead of the default one.
    #[must_use]
    pub fn with_assignee(mut self, assignee: PersonId) -> Self {
        self.assignee = Some(assignee);
        self
    }

    /// Scores against `as_of` instead of today.
    #[must_use]
    pub const fn with_as_of(mut self, as_of: NaiveDate) -> Self {
        self.as_of = Some(as_of);
        self
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

    /// Renumbers the tasks in every replica instead of listing them.
    #[must_use]
    pub const fn with_reindex(mut self, reindex: bool) -> Self {
        self.reindex = reindex;
        self
    }
}

impl Default for ListTasksRequest {
    fn default() -> Self {
        Self::new()
    }
}

/// Request to edit one task.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateTaskRequest {
    assignee: Option<PersonId>,
    running_index: RunningIndex,
    edit: TaskEdit,
}

impl UpdateTaskRequest {
    /// Creates an edit request for the task at `running_index`.
    #[must_use]
    pub const fn new(running_index: RunningIndex, edit: TaskEdit) -> Self {
        Self {
            assignee: None,
            running_index,
            edit,
        }
    }

    /// Targets `assignee` instead of the default one.
    #[must_use]
    pub fn with_assignee(mut self, assignee: PersonId) -> Self {
        self.assignee = Some(assignee);
        self
    }
}

/// Request to mark one task finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishTaskRequest {
    assignee: Option<PersonId>,
    running_index: RunningIndex,
    end_date: Option<NaiveDate>,
}

impl FinishTaskRequest {
    /// Creates a finish request for the task at `running_index`, ending
    /// today.
    #[must_use]
    pub const fn new(running_index: RunningIndex) -> Self {
        Self {
            assignee: None,
            running_index,
            end_date: None,
        }
    }

    /// Targets `assignee` instead of the default one.
    #[must_use]
    pub fn with_assignee(mut self, assignee: PersonId) -> Self {
        self.assignee = Some(assignee);
        self
    }

    /// Records `end_date` instead of today.
    #[must_use]
    pub const fn with_end_date(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }
}

/// Result of a listing request.
#[derive(Debug, Clone, PartialEq)]
pub enum ListOutcome {
    /// A ranked listing was produced.
    Listed {
        /// Person whose tasks were listed.
        person: PersonId,
        /// The listing.
        listing: TaskListing,
    },
    /// Every replica was visited with a reindex plan.
    Reindexed {
        /// Person whose tasks were renumbered.
        person: PersonId,
        /// Per-replica outcomes.
        report: SyncReport,
    },
    /// The person has no tasks.
    NoTasks(PersonId),
}

/// Result of an edit or finish request.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome {
    /// The edited task was propagated.
    Synced {
        /// Person owning the task.
        person: PersonId,
        /// The task as written.
        task: Task,
        /// Per-replica outcomes.
        report: SyncReport,
    },
    /// The person has no tasks.
    NoTasks(PersonId),
}

/// Service-level errors for todo operations. All are raised before any
/// replica is written.
#[derive(Debug, Error)]
pub enum TodoServiceError {
    /// Input validation failed.
    #[error(transparent)]
    Domain(#[from] TodoDomainError),

    /// Reading the primary replica failed.
    #[error(transparent)]
    Store(#[from] DocumentStoreError),

    /// No replica is configured.
    #[error("no databases are configured")]
    NoReplicas,

    /// No assignee was given and no default is configured.
    #[error(
        "no assignee given; set default_user_id in user.json or pass the person id on the command line"
    )]
    MissingAssignee,

    /// The person does not exist in the primary replica.
    #[error("id {person} can't be found in the people collection of {database}")]
    PersonNotFound {
        /// Requested person.
        person: PersonId,
        /// Primary replica searched.
        database: DatabaseName,
    },

    /// No task carries the requested index.
    #[error("no task with running_index {running_index} for {person}; please enter a valid index")]
    InvalidIndex {
        /// Person whose list was searched.
        person: PersonId,
        /// Requested index.
        running_index: RunningIndex,
    },

    /// The stored task list could not be decoded.
    #[error("todos of {person} in {database} are malformed: {reason}")]
    MalformedTodos {
        /// Person whose list failed to decode.
        person: PersonId,
        /// Replica read.
        database: DatabaseName,
        /// Decoder message.
        reason: String,
    },
}

/// Result type for todo service operations.
pub type TodoServiceResult<T> = Result<T, TodoServiceError>;

/// Todo orchestration service.
pub struct TodoService<S, C>
where
    S: DocumentStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
    settings: TodoSettings,
    synchronizer: ReplicaSynchronizer<S>,
}

impl<S, C> TodoService<S, C>
where
    S: DocumentStore,
    C: Clock + Send + Sync,
{
    /// Creates a service over `store` with the given settings.
    #[must_use]
    pub fn new(store: Arc<S>, clock: Arc<C>, settings: TodoSettings) -> Self {
        let synchronizer = ReplicaSynchronizer::new(
            Arc::clone(&store),
            settings.replicas().to_vec(),
            settings.collection(),
        );
        Self {
            store,
            clock,
            settings,
            synchronizer,
        }
    }

    /// Returns the settings.
    #[must_use]
    pub const fn settings(&self) -> &TodoSettings {
        &self.settings
    }

    /// Returns today's date according to the service clock.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.clock.local().date_naive()
    }

    /// Lists or reindexes one person's tasks.
    ///
    /// # Errors
    ///
    /// Returns [`TodoServiceError`] when the assignee cannot be resolved or
    /// the primary replica cannot be read.
    pub fn list(&self, request: ListTasksRequest) -> TodoServiceResult<ListOutcome> {
        let person = self.resolve_assignee(request.assignee)?;
        let tasks = self.load_tasks(&person)?;
        if tasks.is_empty() {
            return Ok(ListOutcome::NoTasks(person));
        }
        let as_of = request.as_of.unwrap_or_else(|| self.today());
        let lister = TaskLister::new(as_of)
            .with_view(request.view)
            .with_sort_key(request.sort_key);

        if request.reindex {
            let mut renumbered = tasks;
            let counts = assign_fresh(&mut renumbered);
            let ranked = lister.with_view(ListView::All).list(renumbered);
            let remap = IndexRemap::from_ranked(&ranked.active);
            info!(
                "event=reindex_planned person={person} active={} terminal={}",
                counts.active, counts.terminal
            );
            let report = self.synchronizer.apply(&person, &ReplicaEdit::Reindex(remap));
            return Ok(ListOutcome::Reindexed { person, report });
        }

        let listing = lister.list(tasks);
        Ok(ListOutcome::Listed { person, listing })
    }

    /// Edits one task and writes it to every replica.
    ///
    /// # Errors
    ///
    /// Returns [`TodoServiceError`] when the assignee, person or index cannot
    /// be resolved, or an edited field is invalid. No replica is written in
    /// those cases.
    pub fn update(&self, request: UpdateTaskRequest) -> TodoServiceResult<MutationOutcome> {
        let person = self.resolve_assignee(request.assignee)?;
        let tasks = self.load_tasks(&person)?;
        if tasks.is_empty() {
            return Ok(MutationOutcome::NoTasks(person));
        }
        let current = find_task(&tasks, &person, request.running_index)?;
        let edited = request.edit.apply_to(current)?;
        Ok(self.propagate(person, request.running_index, edited))
    }

    /// Marks one active task finished and writes it to every replica.
    ///
    /// # Errors
    ///
    /// Returns [`TodoServiceError`] when the assignee, person or index cannot
    /// be resolved, or the task is not active. No replica is written in
    /// those cases.
    pub fn finish(&self, request: FinishTaskRequest) -> TodoServiceResult<MutationOutcome> {
        let person = self.resolve_assignee(request.assignee)?;
        let tasks = self.load_tasks(&person)?;
        if tasks.is_empty() {
            return Ok(MutationOutcome::NoTasks(person));
        }
        let mut finished = find_task(&tasks, &person, request.running_index)?.clone();
        let end_date = request.end_date.unwrap_or_else(|| self.today());
        finished.mark_finished(end_date)?;
        Ok(self.propagate(person, request.running_index, finished))
    }

    fn propagate(&self, person: PersonId, running_index: RunningIndex, task: Task) -> MutationOutcome {
        let edit = ReplicaEdit::ReplaceTask {
            running_index,
            task: task.clone(),
        };
        let report = self.synchronizer.apply(&person, &edit);
        MutationOutcome::Synced {
            person,
            task,
            report,
        }
    }

    fn resolve_assignee(&self, requested: Option<PersonId>) -> TodoServiceResult<PersonId> {
        requested
            .or_else(|| self.settings.default_assignee().cloned())
            .ok_or(TodoServiceError::MissingAssignee)
    }

    fn load_tasks(&self, person: &PersonId) -> TodoServiceResult<Vec<Task>> {
        let primary = self
            .settings
            .replicas()
            .first()
            .ok_or(TodoServiceError::NoReplicas)?;
        let document = self
            .store
            .find_one(primary, self.settings.collection(), &DocumentFilter::by_id(person))?
            .ok_or_else(|| TodoServiceError::PersonNotFound {
                person: person.clone(),
                database: primary.clone(),
            })?;
        let tasks = decode_todos(&document).map_err(|reason| TodoServiceError::MalformedTodos {
            person: person.clone(),
            database: primary.clone(),
            reason,
        })?;
        debug!(
            "event=person_loaded person={person} database={primary} tasks={}",
            tasks.len()
        );
        Ok(tasks)
    }
}

fn find_task<'a>(
    tasks: &'a [Task],
    person: &PersonId,
    running_index: RunningIndex,
) -> TodoServiceResult<&'a Task> {
    tasks
        .iter()
        .find(|task| task.running_index() == Some(running_index))
        .ok_or_else(|| TodoServiceError::InvalidIndex {
            person: person.clone(),
            running_index,
        })
}
