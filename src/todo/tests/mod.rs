//! Unit tests for the todo module.

#![expect(
    clippy::expect_used,
    reason = "Test helpers use expect for fixture setup"
)]

mod edit_tests;
mod priority_tests;

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use mockable::Clock;
use serde_json::{Map, Value, json};

use crate::todo::domain::{DatabaseName, Importance, RunningIndex, Task, TaskStatus};

/// Clock pinned to noon on a fixed date.
#[derive(Debug, Clone, Copy)]
pub(super) struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        let noon = self.0.and_hms_opt(12, 0, 0).unwrap_or_default();
        Local
            .from_local_datetime(&noon)
            .earliest()
            .unwrap_or_else(|| Utc.from_utc_datetime(&noon).with_timezone(&Local))
    }

    fn utc(&self) -> DateTime<Utc> {
        let noon = self.0.and_hms_opt(12, 0, 0).unwrap_or_default();
        Utc.from_utc_datetime(&noon)
    }
}

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid calendar date")
}

pub(super) fn db(name: &str) -> DatabaseName {
    DatabaseName::new(name).expect("valid database name")
}

pub(super) fn started(description: &str, index: i64) -> Task {
    Task::new(description)
        .expect("valid description")
        .with_running_index(RunningIndex::new(index))
}

pub(super) fn terminal(description: &str, status: TaskStatus, index: i64) -> Task {
    started(description, index).with_status(status)
}

pub(super) fn scheduled(description: &str, importance: Importance, due: NaiveDate) -> Task {
    Task::new(description)
        .expect("valid description")
        .with_importance(importance)
        .with_due_date(due)
}

pub(super) fn person_document(id: &str, tasks: &[Task]) -> Map<String, Value> {
    let value = json!({
        "_id": id,
        "name": "Ada Lovelace",
        "todos": tasks,
    });
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
