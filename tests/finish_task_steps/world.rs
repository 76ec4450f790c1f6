//! Shared world state for finish-task BDD scenarios.

use std::sync::Arc;

use grouptodo::todo::{
    adapters::memory::InMemoryDocumentStore,
    domain::{DatabaseName, Task},
    services::{MutationOutcome, TodoService, TodoServiceError},
};
use rstest::fixture;

use crate::test_helpers::FixedClock;

/// Service type used by the BDD world.
pub type TestTodoService = TodoService<InMemoryDocumentStore, FixedClock>;

/// Scenario world for finish-task behaviour tests.
#[derive(Default)]
pub struct FinishTaskWorld {
    pub store: Arc<InMemoryDocumentStore>,
    pub replicas: Vec<DatabaseName>,
    pub service: Option<TestTodoService>,
    pub snapshot: Vec<Vec<Task>>,
    pub last_result: Option<Result<MutationOutcome, TodoServiceError>>,
}

impl FinishTaskWorld {
    /// Returns the service built by the setup step.
    pub fn service(&self) -> Result<&TestTodoService, eyre::Report> {
        self.service
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing service in scenario world"))
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> FinishTaskWorld {
    FinishTaskWorld::default()
}
