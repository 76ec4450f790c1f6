//! Unit tests for priority scoring and the listing sort key.

use super::{date, scheduled, started};
use crate::todo::domain::{
    Importance, PriorityScorer, SortKey, TaskStatus, priority_score,
};
use rstest::rstest;

#[rstest]
#[case(Importance::LOW)]
#[case(Importance::NORMAL)]
#[case(Importance::HIGH)]
fn score_is_symmetric_and_bounded(#[case] importance: Importance) {
    let base = f64::from(importance.value());
    for days in 1_i64..=30 {
        let ahead = priority_score(importance, Some(days));
        let behind = priority_score(importance, Some(-days));
        assert!((ahead - behind).abs() < f64::EPSILON, "asymmetric at {days}");
        assert!(ahead > base, "score at {days} should exceed importance");
        assert!(ahead < base + 0.5, "score at {days} should stay below importance + 0.5");
    }
}

#[rstest]
fn score_decreases_with_distance_from_due_date() {
    let near = priority_score(Importance::NORMAL, Some(1));
    let far = priority_score(Importance::NORMAL, Some(5));
    assert!(near > far);
}

#[rstest]
fn importance_dominates_imminence() {
    let today = date(2024, 3, 10);
    let scorer = PriorityScorer::new(today);
    let ranked = scorer.rank(
        [
            scheduled("due today", Importance::LOW, today),
            scheduled("important tomorrow", Importance::HIGH, date(2024, 3, 11)),
        ],
        SortKey::PriorityThenDurationThenStatus,
    );

    let descriptions: Vec<&str> = ranked
        .iter()
        .map(|scored| scored.task.description())
        .collect();
    assert_eq!(descriptions, vec!["important tomorrow", "due today"]);
    let first = ranked.first().expect("two ranked tasks");
    assert!((first.order - 2.268_941).abs() < 1e-6);
    assert_eq!(first.days_to_due, Some(1));
}

#[rstest]
fn shorter_duration_breaks_ties() {
    let today = date(2024, 3, 10);
    let ranked = PriorityScorer::new(today).rank(
        [
            scheduled("unknown effort", Importance::NORMAL, today),
            scheduled("long", Importance::NORMAL, today).with_duration(90.0),
            scheduled("quick", Importance::NORMAL, today).with_duration(5.0),
        ],
        SortKey::PriorityThenDuration,
    );

    let descriptions: Vec<&str> = ranked
        .iter()
        .map(|scored| scored.task.description())
        .collect();
    assert_eq!(descriptions, vec!["quick", "long", "unknown effort"]);
}

#[rstest]
#[case(TaskStatus::Finished)]
#[case(TaskStatus::Cancelled)]
fn started_sorts_before_terminal_on_full_tie(#[case] status: TaskStatus) {
    let today = date(2024, 3, 10);
    let done = scheduled("done", Importance::NORMAL, today).with_status(status);
    let open = scheduled("open", Importance::NORMAL, today);

    let ranked = PriorityScorer::new(today).rank(
        [done, open],
        SortKey::PriorityThenDurationThenStatus,
    );

    assert_eq!(
        ranked.first().map(|scored| scored.task.status()),
        Some(TaskStatus::Started)
    );
}

#[rstest]
fn equal_keys_keep_encounter_order() {
    let today = date(2024, 3, 10);
    let ranked = PriorityScorer::new(today).rank(
        [started("first", 1), started("second", 2), started("third", 3)],
        SortKey::PriorityThenDurationThenStatus,
    );

    let descriptions: Vec<&str> = ranked
        .iter()
        .map(|scored| scored.task.description())
        .collect();
    assert_eq!(descriptions, vec!["first", "second", "third"]);
}

#[rstest]
fn reference_date_changes_the_answer() {
    let task = scheduled("report", Importance::NORMAL, date(2024, 3, 20));
    let early = PriorityScorer::new(date(2024, 3, 1)).score(task.clone());
    let late = PriorityScorer::new(date(2024, 3, 20)).score(task);

    assert_eq!(early.days_to_due, Some(19));
    assert_eq!(late.days_to_due, Some(0));
    assert!(late.order > early.order);
}
