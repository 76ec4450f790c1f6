//! Shared fixtures for integration tests.

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use eyre::OptionExt;
use grouptodo::todo::{
    domain::{DatabaseName, Importance, PersonId, RunningIndex, Task, TaskStatus},
    ports::Document,
    services::decode_todos,
};
use mockable::Clock;
use serde_json::{Value, json};

/// Collection holding person documents in every fixture.
pub const PEOPLE: &str = "people";

/// Clock pinned to noon on a fixed date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        let noon = self.0.and_hms_opt(12, 0, 0).unwrap_or_default();
        Utc.from_utc_datetime(&noon)
    }
}

/// Builds a calendar date, failing the test on invalid input.
pub fn date(year: i32, month: u32, day: u32) -> eyre::Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or_eyre("invalid calendar date")
}

/// Builds a database name.
pub fn db(name: &str) -> eyre::Result<DatabaseName> {
    Ok(DatabaseName::new(name)?)
}

/// Builds a person id.
pub fn person(id: &str) -> eyre::Result<PersonId> {
    Ok(PersonId::new(id)?)
}

/// Task list used by most scenarios, scored against 2024-03-04.
///
/// Ranked order is `review draft` (2) then `write abstract` (1); task -1 is
/// finished.
pub fn seeded_tasks() -> eyre::Result<Vec<Task>> {
    Ok(vec![
        Task::new("write abstract")?
            .with_running_index(RunningIndex::new(1))
            .with_begin_date(date(2024, 3, 1)?)
            .with_due_date(date(2024, 3, 10)?)
            .with_duration(30.0)
            .with_notes(vec!["draft in overleaf".to_owned()]),
        Task::new("review draft")?
            .with_running_index(RunningIndex::new(2))
            .with_importance(Importance::HIGH)
            .with_due_date(date(2024, 3, 5)?),
        Task::new("submit form")?
            .with_running_index(RunningIndex::new(-1))
            .with_status(TaskStatus::Finished),
    ])
}

/// Builds a person document holding `tasks`.
pub fn person_document(id: &str, tasks: &[Task]) -> eyre::Result<Document> {
    match json!({ "_id": id, "name": "Ada Lovelace", "todos": tasks }) {
        Value::Object(document) => Ok(document),
        other => Err(eyre::eyre!("expected an object, got {other}")),
    }
}

/// Decodes the task list from a person document.
pub fn tasks_of(document: &Document) -> eyre::Result<Vec<Task>> {
    decode_todos(document).map_err(|reason| eyre::eyre!(reason))
}

