//! Application services for todo orchestration.

mod lifecycle;
mod synchronizer;

pub use lifecycle::{
    DEFAULT_PEOPLE_COLLECTION, FinishTaskRequest, ListOutcome, ListTasksRequest, MutationOutcome,
    TodoService, TodoServiceError, TodoServiceResult, TodoSettings, UpdateTaskRequest,
};
pub use synchronizer::{
    ReplicaEdit, ReplicaOutcome, ReplicaReport, ReplicaSynchronizer, SkipReason, SyncReport,
    TODOS_KEY, decode_todos,
};
