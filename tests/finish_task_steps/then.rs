//! Then steps for finish-task BDD scenarios.

use grouptodo::todo::{
    domain::{RunningIndex, TaskStatus, TodoDomainError},
    services::{
        ListOutcome, ListTasksRequest, MutationOutcome, ReplicaOutcome, TodoServiceError,
    },
};
use rstest_bdd_macros::then;

use super::world::FinishTaskWorld;
use crate::test_helpers::{PEOPLE, date, db, person, tasks_of};

fn replica_tasks(
    world: &FinishTaskWorld,
    index: usize,
) -> Result<Vec<grouptodo::todo::domain::Task>, eyre::Report> {
    let database = world
        .replicas
        .get(index)
        .ok_or_else(|| eyre::eyre!("missing replica {index}"))?;
    let documents = world.store.documents(database, PEOPLE)?;
    let document = documents
        .first()
        .ok_or_else(|| eyre::eyre!("missing person document in {database}"))?;
    tasks_of(document)
}

#[then("task {index:i64} is finished in every replica")]
fn task_finished_everywhere(world: &FinishTaskWorld, index: i64) -> Result<(), eyre::Report> {
    for position in 0..world.replicas.len() {
        let tasks = replica_tasks(world, position)?;
        let task = tasks
            .iter()
            .find(|task| task.running_index() == Some(RunningIndex::new(index)))
            .ok_or_else(|| eyre::eyre!("task {index} missing from replica {position}"))?;
        if task.status() != TaskStatus::Finished {
            return Err(eyre::eyre!(
                "expected finished, found {} in replica {position}",
                task.status()
            ));
        }
        if task.end_date() != Some(date(2024, 3, 4)?) {
            return Err(eyre::eyre!("unexpected end date {:?}", task.end_date()));
        }
    }
    Ok(())
}

#[then(r#"the default listing for "{assignee}" no longer shows "{description}""#)]
fn listing_omits(
    world: &FinishTaskWorld,
    assignee: String,
    description: String,
) -> Result<(), eyre::Report> {
    let outcome = world
        .service()?
        .list(ListTasksRequest::new().with_assignee(person(&assignee)?))?;
    let ListOutcome::Listed { listing, .. } = outcome else {
        return Err(eyre::eyre!("expected a listing, got {outcome:?}"));
    };
    if listing
        .active
        .iter()
        .any(|row| row.task.description() == description)
    {
        return Err(eyre::eyre!("{description} is still listed"));
    }
    Ok(())
}

#[then(r#"replica "{name}" reports "{expected}""#)]
fn replica_reports(
    world: &FinishTaskWorld,
    name: String,
    expected: String,
) -> Result<(), eyre::Report> {
    let Some(Ok(MutationOutcome::Synced { report, .. })) = &world.last_result else {
        return Err(eyre::eyre!(
            "expected a synced outcome, got {:?}",
            world.last_result
        ));
    };
    let outcome = report
        .outcome_for(&db(&name)?)
        .ok_or_else(|| eyre::eyre!("no outcome for {name}"))?;
    let matched = match expected.as_str() {
        "updated" => *outcome == ReplicaOutcome::Updated,
        "skipped" => matches!(outcome, ReplicaOutcome::Skipped(_)),
        "failed" => matches!(outcome, ReplicaOutcome::Failed(_)),
        other => return Err(eyre::eyre!("unknown outcome label {other}")),
    };
    if !matched {
        return Err(eyre::eyre!("expected {expected} for {name}, got {outcome:?}"));
    }
    Ok(())
}

#[then("the finish fails with an invalid status transition error")]
fn finish_fails_with_invalid_transition(world: &FinishTaskWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing finish result"))?;
    if !matches!(
        result,
        Err(TodoServiceError::Domain(
            TodoDomainError::InvalidStatusTransition { .. }
        ))
    ) {
        return Err(eyre::eyre!(
            "expected InvalidStatusTransition error, got {result:?}"
        ));
    }
    Ok(())
}

#[then("no replica was modified")]
fn no_replica_modified(world: &FinishTaskWorld) -> Result<(), eyre::Report> {
    for (position, expected) in world.snapshot.iter().enumerate() {
        if &replica_tasks(world, position)? != expected {
            return Err(eyre::eyre!("replica {position} changed"));
        }
    }
    Ok(())
}
