//! Unit tests for partial task edits and the finish transition.

use super::{date, started, terminal};
use crate::todo::domain::{
    DueDateInput, Importance, ParseTaskStatusError, RunningIndex, Task, TaskEdit, TaskStatus,
    TodoDomainError,
};
use eyre::ensure;
use rstest::{fixture, rstest};
use serde_json::json;

#[fixture]
fn task() -> Task {
    started("Draft the grant report", 3)
        .with_begin_date(date(2024, 1, 1))
        .with_due_date(date(2024, 1, 15))
        .with_notes(vec!["collect numbers".to_owned()])
}

#[rstest]
#[case("5", DueDateInput::OffsetDays(5))]
#[case(" -2 ", DueDateInput::OffsetDays(-2))]
#[case("2024-02-01", DueDateInput::Absolute(date(2024, 2, 1)))]
fn due_date_input_prefers_offsets(#[case] raw: &str, #[case] expected: DueDateInput) {
    assert_eq!(DueDateInput::parse(raw), Ok(expected));
}

#[rstest]
fn due_date_input_rejects_garbage() {
    assert_eq!(
        DueDateInput::parse("next week"),
        Err(TodoDomainError::InvalidDate("next week".to_owned()))
    );
}

#[rstest]
#[case("5", date(2024, 1, 6))]
#[case("2024-02-01", date(2024, 2, 1))]
fn due_date_edit_resolves_against_begin_date(
    task: Task,
    #[case] raw: &str,
    #[case] expected: chrono::NaiveDate,
) -> eyre::Result<()> {
    let edited = TaskEdit::new().with_due_date(raw).apply_to(&task)?;
    ensure!(edited.due_date() == Some(expected));
    Ok(())
}

#[rstest]
fn relative_due_date_needs_begin_date() {
    let task = started("no begin", 4);
    let result = TaskEdit::new().with_due_date("3").apply_to(&task);
    assert_eq!(
        result,
        Err(TodoDomainError::MissingBeginDate(RunningIndex::new(4)))
    );
}

#[rstest]
fn every_field_is_applied(task: Task) -> eyre::Result<()> {
    let edit = TaskEdit::new()
        .with_description("Submit the grant report")
        .with_estimated_duration(45.0)
        .with_importance(0)
        .with_status("cancelled")
        .with_notes(vec!["dropped".to_owned(), "superseded".to_owned()])
        .with_begin_date("2024-01-02")
        .with_end_date("2024-01-20");

    let edited = edit.apply_to(&task)?;

    ensure!(edited.description() == "Submit the grant report");
    ensure!(edited.duration() == Some(45.0));
    ensure!(edited.importance() == Importance::LOW);
    ensure!(edited.status() == TaskStatus::Cancelled);
    ensure!(edited.notes() == ["dropped".to_owned(), "superseded".to_owned()]);
    ensure!(edited.begin_date() == Some(date(2024, 1, 2)));
    ensure!(edited.end_date() == Some(date(2024, 1, 20)));
    ensure!(edited.due_date() == task.due_date());
    ensure!(edited.running_index() == task.running_index());
    Ok(())
}

#[rstest]
fn invalid_importance_is_rejected_and_nothing_changes(task: Task) {
    let edit = TaskEdit::new()
        .with_description("should not land")
        .with_importance(5);

    let result = edit.apply_to(&task);

    assert_eq!(result, Err(TodoDomainError::InvalidImportance(5)));
    assert_eq!(task.description(), "Draft the grant report");
}

#[rstest]
fn invalid_status_is_rejected(task: Task) {
    let result = TaskEdit::new().with_status("paused").apply_to(&task);
    assert_eq!(
        result,
        Err(TodoDomainError::InvalidStatus(ParseTaskStatusError(
            "paused".to_owned()
        )))
    );
}

#[rstest]
#[case(TaskStatus::Finished, "started", false)]
#[case(TaskStatus::Cancelled, "finished", false)]
#[case(TaskStatus::Finished, "cancelled", false)]
#[case(TaskStatus::Cancelled, "started", false)]
#[case(TaskStatus::Finished, "finished", true)]
fn terminal_tasks_do_not_reopen(
    #[case] current: TaskStatus,
    #[case] requested: &str,
    #[case] allowed: bool,
) {
    let task = terminal("closed", current, -1);
    let result = TaskEdit::new().with_status(requested).apply_to(&task);
    assert_eq!(result.is_ok(), allowed);
}

#[rstest]
#[case(-1.0)]
#[case(f64::NAN)]
fn negative_or_nan_duration_is_rejected(task: Task, #[case] minutes: f64) {
    let result = TaskEdit::new()
        .with_estimated_duration(minutes)
        .apply_to(&task);
    assert!(matches!(result, Err(TodoDomainError::InvalidDuration(_))));
}

#[rstest]
fn blank_description_is_rejected(task: Task) {
    let result = TaskEdit::new().with_description("   ").apply_to(&task);
    assert_eq!(result, Err(TodoDomainError::EmptyDescription));
}

#[rstest]
fn status_edit_to_finished_leaves_end_date_unset(task: Task) -> eyre::Result<()> {
    let edited = TaskEdit::new().with_status("finished").apply_to(&task)?;
    ensure!(edited.status() == TaskStatus::Finished);
    ensure!(edited.end_date().is_none());
    Ok(())
}

#[rstest]
fn mark_finished_sets_status_and_end_date(mut task: Task) -> eyre::Result<()> {
    task.mark_finished(date(2024, 1, 10))?;
    ensure!(task.status() == TaskStatus::Finished);
    ensure!(task.end_date() == Some(date(2024, 1, 10)));
    Ok(())
}

#[rstest]
fn mark_finished_rejects_terminal_tasks() {
    let mut task = terminal("gone", TaskStatus::Cancelled, -2);
    let result = task.mark_finished(date(2024, 1, 10));
    assert_eq!(
        result,
        Err(TodoDomainError::InvalidStatusTransition {
            running_index: RunningIndex::new(-2),
            from: TaskStatus::Cancelled,
            to: TaskStatus::Finished,
        })
    );
    assert_eq!(task.status(), TaskStatus::Cancelled);
}

#[rstest]
fn empty_edit_is_detected() {
    assert!(TaskEdit::new().is_empty());
    assert!(!TaskEdit::new().with_importance(1).is_empty());
}

#[rstest]
fn whole_minute_durations_stay_integers_across_edits() -> eyre::Result<()> {
    let stored: Task = serde_json::from_value(json!({
        "description": "Review the draft",
        "duration": 30,
        "running_index": 2,
    }))?;

    let edited = TaskEdit::new().with_importance(2).apply_to(&stored)?;
    let written = serde_json::to_value(&edited)?;

    ensure!(written.get("duration") == Some(&json!(30)));
    ensure!(written.get("duration").is_some_and(serde_json::Value::is_u64));
    ensure!(edited.duration() == Some(30.0));
    Ok(())
}

#[rstest]
#[case(45.0, json!(45))]
#[case(12.5, json!(12.5))]
fn duration_edits_store_whole_minutes_as_integers(
    task: Task,
    #[case] minutes: f64,
    #[case] expected: serde_json::Value,
) -> eyre::Result<()> {
    let edited = TaskEdit::new()
        .with_estimated_duration(minutes)
        .apply_to(&task)?;
    let written = serde_json::to_value(&edited)?;
    ensure!(written.get("duration") == Some(&expected));
    Ok(())
}

#[rstest]
fn unmodelled_keys_survive_an_edit() -> eyre::Result<()> {
    let stored: Task = serde_json::from_value(json!({
        "description": "Book the venue",
        "running_index": 1,
        "tag": "grant",
        "links": ["https://example.org/venue"],
    }))?;

    let edited = TaskEdit::new().with_description("Book the hall").apply_to(&stored)?;

    ensure!(edited.extra().get("tag") == Some(&json!("grant")));
    ensure!(edited.extra().len() == 2);
    let written = serde_json::to_value(&edited)?;
    ensure!(written.get("links") == Some(&json!(["https://example.org/venue"])));
    ensure!(written.get("description") == Some(&json!("Book the hall")));
    Ok(())
}
