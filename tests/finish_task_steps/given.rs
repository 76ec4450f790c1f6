//! Given steps for finish-task BDD scenarios.

use std::sync::Arc;

use eyre::WrapErr;
use grouptodo::todo::{
    adapters::memory::InMemoryDocumentStore,
    domain::RunningIndex,
    ports::{DocumentFilter, DocumentStore},
    services::{TODOS_KEY, TodoService, TodoSettings},
};
use rstest_bdd_macros::given;
use serde_json::Map;

use super::world::FinishTaskWorld;
use crate::test_helpers::{
    FixedClock, PEOPLE, date, db, person, person_document, seeded_tasks, tasks_of,
};

#[given(r#"replicas "{primary}" and "{mirror}" hold the seeded todos for "{assignee}""#)]
fn replicas_hold_seeded_todos(
    world: &mut FinishTaskWorld,
    primary: String,
    mirror: String,
    assignee: String,
) -> Result<(), eyre::Report> {
    let replicas = vec![db(&primary)?, db(&mirror)?];
    let store = Arc::new(InMemoryDocumentStore::with_databases(replicas.clone()));
    let tasks = seeded_tasks()?;
    for database in &replicas {
        store
            .insert(database, PEOPLE, person_document(&assignee, &tasks)?)
            .wrap_err("seed person document")?;
    }
    let settings = TodoSettings::new(replicas.clone()).with_collection(PEOPLE);
    world.service = Some(TodoService::new(
        Arc::clone(&store),
        Arc::new(FixedClock(date(2024, 3, 4)?)),
        settings,
    ));
    world.snapshot = replicas.iter().map(|_| tasks.clone()).collect();
    world.store = store;
    world.replicas = replicas;
    Ok(())
}

#[given(r#"replica "{name}" does not hold task {index:i64}"#)]
fn replica_lacks_task(
    world: &mut FinishTaskWorld,
    name: String,
    index: i64,
) -> Result<(), eyre::Report> {
    let database = db(&name)?;
    let filter = DocumentFilter::by_id(&person("ada")?);
    let document = world
        .store
        .find_one(&database, PEOPLE, &filter)?
        .ok_or_else(|| eyre::eyre!("replica {name} has no person document"))?;
    let remaining: Vec<_> = tasks_of(&document)?
        .into_iter()
        .filter(|task| task.running_index() != Some(RunningIndex::new(index)))
        .collect();

    let mut patch = Map::new();
    patch.insert(TODOS_KEY.to_owned(), serde_json::to_value(&remaining)?);
    world
        .store
        .update_one(&database, PEOPLE, &filter, patch, false)
        .wrap_err("drop task from replica")?;
    Ok(())
}
