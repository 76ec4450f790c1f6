//! Text rendering of listings and per-replica confirmations.

use minijinja::{Environment, context};
use thiserror::Error;

use crate::todo::{
    domain::{PersonId, ScoredTask, Task, TaskListing},
    services::{ReplicaOutcome, SyncReport},
};

const RULE_WIDTH: usize = 70;
const INDEX_WIDTH: usize = 4;
const DESCRIPTION_WIDTH: usize = 40;

const LISTING_TEMPLATE: &str = "\
If the indices are far from being in numerical order, please reorder them by running grouptodo update --reindex
Please choose from one of the following to update:
(index) action (days to due date|importance|expected duration (mins))
{{ rule }}
{% for row in active %}{{ row }}
{% endfor %}{% if show_terminal %}finished/cancelled:
{% for row in terminal %}{{ row }}
{% endfor %}{% endif %}{{ rule }}";

const UPDATED_TEMPLATE: &str = "The task with running_index {{ index }} in {{ database }} for {{ person }} has been updated.";
const FINISHED_TEMPLATE: &str =
    "The task \"{{ description }}\" in {{ database }} for {{ person }} has been marked as finished.";
const REINDEXED_TEMPLATE: &str = "Indices in {{ database }} for {{ person }} have been updated.";
const SKIPPED_TEMPLATE: &str = "Skipped {{ database }} for {{ person }}: {{ reason }}.";
const FAILED_TEMPLATE: &str = "Failed to update {{ database }} for {{ person }}: {{ reason }}.";
const NOT_ATTEMPTED_TEMPLATE: &str = "{{ database }} was not attempted after an earlier failure.";
const NO_TASKS_TEMPLATE: &str = "{{ person }} doesn't have todos in people collection.";

/// Template rendering failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("failed to render {template}: {reason}")]
pub struct RenderError {
    /// Template label.
    pub template: &'static str,
    /// Engine message.
    pub reason: String,
}

/// Which mutation a sync report confirms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Confirmation<'a> {
    /// A field-level edit of `task`.
    Updated(&'a Task),
    /// `task` was marked finished.
    Finished(&'a Task),
    /// The running indices were rebuilt.
    Reindexed,
}

/// Renders a ranked listing as a fixed-width table.
///
/// # Errors
///
/// Returns [`RenderError`] when the template fails to render.
pub fn render_listing(listing: &TaskListing, show_terminal: bool) -> Result<String, RenderError> {
    let active: Vec<String> = listing.active.iter().flat_map(format_rows).collect();
    let terminal: Vec<String> = listing.terminal.iter().flat_map(format_rows).collect();
    render(
        "listing",
        LISTING_TEMPLATE,
        context! {
            rule => "-".repeat(RULE_WIDTH),
            active => active,
            terminal => terminal,
            show_terminal => show_terminal,
        },
    )
}

/// Renders one line per replica describing what happened to it.
///
/// # Errors
///
/// Returns [`RenderError`] when a template fails to render.
pub fn render_sync_report(
    person: &PersonId,
    report: &SyncReport,
    confirmation: Confirmation<'_>,
) -> Result<String, RenderError> {
    let lines = report
        .replicas()
        .iter()
        .map(|replica| {
            let database = replica.database.as_str();
            let person_id = person.as_str();
            match &replica.outcome {
                ReplicaOutcome::Updated => match confirmation {
                    Confirmation::Updated(task) => render(
                        "updated",
                        UPDATED_TEMPLATE,
                        context! {
                            index => task.running_index().map(|index| index.value()),
                            database,
                            person => person_id,
                        },
                    ),
                    Confirmation::Finished(task) => render(
                        "finished",
                        FINISHED_TEMPLATE,
                        context! { description => task.description(), database, person => person_id },
                    ),
                    Confirmation::Reindexed => render(
                        "reindexed",
                        REINDEXED_TEMPLATE,
                        context! { database, person => person_id },
                    ),
                },
                ReplicaOutcome::Skipped(reason) => render(
                    "skipped",
                    SKIPPED_TEMPLATE,
                    context! { database, person => person_id, reason => reason.to_string() },
                ),
                ReplicaOutcome::Failed(reason) => render(
                    "failed",
                    FAILED_TEMPLATE,
                    context! { database, person => person_id, reason },
                ),
                ReplicaOutcome::NotAttempted => render(
                    "not_attempted",
                    NOT_ATTEMPTED_TEMPLATE,
                    context! { database },
                ),
            }
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(lines.join("\n"))
}

/// Renders the notice for a person without tasks.
///
/// # Errors
///
/// Returns [`RenderError`] when the template fails to render.
pub fn render_no_tasks(person: &PersonId) -> Result<String, RenderError> {
    render(
        "no_tasks",
        NO_TASKS_TEMPLATE,
        context! { person => person.as_str() },
    )
}

fn render(
    label: &'static str,
    template: &str,
    context: minijinja::Value,
) -> Result<String, RenderError> {
    Environment::new()
        .render_str(template, context)
        .map_err(|error| RenderError {
            template: label,
            reason: error.to_string(),
        })
}

fn format_rows(scored: &ScoredTask) -> Vec<String> {
    let task = &scored.task;
    let index = task
        .running_index()
        .map_or_else(|| "?".to_owned(), |index| index.to_string());
    let days = scored
        .days_to_due
        .map_or_else(|| "-".to_owned(), |days| days.to_string());
    let duration = task
        .duration()
        .map_or_else(|| "-".to_owned(), |minutes| format!("{minutes}"));
    let mut rows = vec![format!(
        "{index:>index_width$}. {description:<description_width$} ({days}|{importance}|{duration})",
        description = task.description(),
        importance = task.importance(),
        index_width = INDEX_WIDTH,
        description_width = DESCRIPTION_WIDTH,
    )];
    rows.extend(
        task.notes()
            .iter()
            .map(|note| format!("{:>width$} - {note}", "", width = INDEX_WIDTH + 1)),
    );
    rows
}
