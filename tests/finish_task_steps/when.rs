//! When steps for finish-task BDD scenarios.

use grouptodo::todo::{
    domain::{RunningIndex, parse_date},
    services::FinishTaskRequest,
};
use rstest_bdd_macros::when;

use super::world::FinishTaskWorld;
use crate::test_helpers::person;

#[when(r#""{assignee}" finishes task {index:i64} on "{end_date}""#)]
fn finish_task(
    world: &mut FinishTaskWorld,
    assignee: String,
    index: i64,
    end_date: String,
) -> Result<(), eyre::Report> {
    let request = FinishTaskRequest::new(RunningIndex::new(index))
        .with_assignee(person(&assignee)?)
        .with_end_date(parse_date(&end_date)?);
    let result = world.service()?.finish(request);
    world.last_result = Some(result);
    Ok(())
}
