//! Command-line surface.
//!
//! Parses arguments, loads configuration, builds the service over the
//! filesystem store and renders outcomes to the given writer.

pub mod render;

use std::io::{self, Write};
use std::sync::Arc;

use camino::Utf8PathBuf;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use mockable::{Clock, DefaultClock};
use thiserror::Error;

use crate::config::{AppConfig, ConfigError, DEFAULT_RC_FILE, default_user_config_path};
use crate::logging::init_logging;
use crate::todo::{
    domain::{ListView, PersonId, RunningIndex, SortKey, TaskEdit, TodoDomainError, parse_date},
    ports::DocumentStore,
    services::{
        FinishTaskRequest, ListOutcome, ListTasksRequest, MutationOutcome, SyncReport,
        TodoService, TodoServiceError, UpdateTaskRequest,
    },
};
use render::{Confirmation, RenderError, render_listing, render_no_tasks, render_sync_report};

/// Top-level arguments.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run-control file listing the database replicas.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_RC_FILE)]
    pub config: Utf8PathBuf,

    /// Per-user file holding default_user_id.
    #[arg(long, value_name = "PATH")]
    pub user_config: Option<Utf8PathBuf>,

    /// Log level (off, error, warn, info, debug, trace).
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Operation to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Todo operations.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List tasks, reindex them, or update the task at --index.
    #[command(alias = "u-todo")]
    Update(UpdateArgs),
    /// List active tasks or mark the task at --index as finished.
    #[command(alias = "f-todo")]
    Finish(FinishArgs),
}

/// Options shared by every operation.
#[derive(Debug, Clone, Default, Args)]
pub struct TargetArgs {
    /// ID of the member to whom the task is assigned. Defaults to
    /// default_user_id from user.json.
    #[arg(short = 'a', long)]
    pub assigned_to: Option<String>,

    /// Date (YYYY-MM-DD) to count days to the deadline from. Defaults to
    /// today.
    #[arg(short = 'c', long)]
    pub certain_date: Option<String>,
}

/// Arguments of `update`.
#[derive(Debug, Clone, Default, Args)]
pub struct UpdateArgs {
    /// Running index of the task to update.
    #[arg(short = 'i', long, allow_negative_numbers = true)]
    pub index: Option<i64>,

    /// List finished and cancelled tasks too.
    #[arg(long)]
    pub all: bool,

    /// Reorder and renumber the running indices in every database.
    #[arg(short = 'r', long)]
    pub reindex: bool,

    /// New description.
    #[arg(short = 'd', long)]
    pub description: Option<String>,

    /// New due date: YYYY-MM-DD, or an integer number of days after the
    /// begin date.
    #[arg(long, allow_hyphen_values = true)]
    pub due_date: Option<String>,

    /// New estimated duration in minutes.
    #[arg(short = 'e', long)]
    pub estimated_duration: Option<f64>,

    /// New importance, one of 0, 1, 2.
    #[arg(long)]
    pub importance: Option<i64>,

    /// New status, one of started, finished, cancelled.
    #[arg(short = 's', long)]
    pub status: Option<String>,

    /// Replacement notes; each note is one argument.
    #[arg(short = 'n', long, num_args = 1..)]
    pub notes: Option<Vec<String>>,

    /// New begin date (YYYY-MM-DD).
    #[arg(short = 'b', long)]
    pub begin_date: Option<String>,

    /// New end date (YYYY-MM-DD).
    #[arg(long)]
    pub end_date: Option<String>,

    /// Assignee and reference date.
    #[command(flatten)]
    pub target: TargetArgs,
}

impl UpdateArgs {
    /// Collects the field edits into a partial edit.
    #[must_use]
    pub fn edit(&self) -> TaskEdit {
        let mut edit = TaskEdit::new();
        if let Some(description) = &self.description {
            edit = edit.with_description(description.clone());
        }
        if let Some(due_date) = &self.due_date {
            edit = edit.with_due_date(due_date.clone());
        }
        if let Some(minutes) = self.estimated_duration {
            edit = edit.with_estimated_duration(minutes);
        }
        if let Some(importance) = self.importance {
            edit = edit.with_importance(importance);
        }
        if let Some(status) = &self.status {
            edit = edit.with_status(status.clone());
        }
        if let Some(notes) = &self.notes {
            edit = edit.with_notes(notes.iter().cloned());
        }
        if let Some(begin_date) = &self.begin_date {
            edit = edit.with_begin_date(begin_date.clone());
        }
        if let Some(end_date) = &self.end_date {
            edit = edit.with_end_date(end_date.clone());
        }
        edit
    }
}

/// Arguments of `finish`.
#[derive(Debug, Clone, Default, Args)]
pub struct FinishArgs {
    /// Running index of the task to mark as finished.
    #[arg(short = 'i', long, allow_negative_numbers = true)]
    pub index: Option<i64>,

    /// End date (YYYY-MM-DD). Defaults to today.
    #[arg(short = 'e', long)]
    pub end_date: Option<String>,

    /// Assignee and reference date.
    #[command(flatten)]
    pub target: TargetArgs,
}

/// Errors surfaced by the command line.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A todo operation failed before writing.
    #[error(transparent)]
    Service(#[from] TodoServiceError),

    /// A command-line value failed validation.
    #[error(transparent)]
    Domain(#[from] TodoDomainError),

    /// Output could not be rendered.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Output could not be written.
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),

    /// The logger could not start.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

/// How a successful invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Everything requested was done.
    Complete,
    /// At least one replica failed during synchronisation.
    ReplicaFailures,
}

/// Loads configuration and runs `cli`, writing results to `out`.
///
/// # Errors
///
/// Returns [`CliError`] when configuration, logging, validation or output
/// fails.
pub fn run(cli: Cli, out: &mut impl Write) -> Result<RunStatus, CliError> {
    let user_config = cli.user_config.or_else(default_user_config_path);
    let config = AppConfig::load(&cli.config, user_config.as_deref())?;
    let level = cli.log_level.as_deref().unwrap_or_else(|| config.log_level());
    init_logging(level).map_err(CliError::Logging)?;

    let service = TodoService::new(
        Arc::new(config.document_store()),
        Arc::new(DefaultClock),
        config.settings(),
    );
    execute(&service, cli.command, out)
}

/// Runs one command against an already built service.
///
/// # Errors
///
/// Returns [`CliError`] when validation, the service or output fails.
pub fn execute<S, C>(
    service: &TodoService<S, C>,
    command: Command,
    out: &mut impl Write,
) -> Result<RunStatus, CliError>
where
    S: DocumentStore,
    C: Clock + Send + Sync,
{
    match command {
        Command::Update(args) => execute_update(service, &args, out),
        Command::Finish(args) => execute_finish(service, &args, out),
    }
}

fn execute_update<S, C>(
    service: &TodoService<S, C>,
    args: &UpdateArgs,
    out: &mut impl Write,
) -> Result<RunStatus, CliError>
where
    S: DocumentStore,
    C: Clock + Send + Sync,
{
    let assignee = parse_assignee(&args.target)?;
    let Some(index) = args.index else {
        let view = if args.all { ListView::All } else { ListView::ActiveOnly };
        let request = list_request(&args.target, assignee)?
            .with_view(view)
            .with_reindex(args.reindex);
        return write_list_outcome(service.list(request)?, args.all, out);
    };

    let mut request = UpdateTaskRequest::new(RunningIndex::new(index), args.edit());
    if let Some(person) = assignee {
        request = request.with_assignee(person);
    }
    let outcome = service.update(request)?;
    write_mutation_outcome(&outcome, Mutation::Updated, out)
}

fn execute_finish<S, C>(
    service: &TodoService<S, C>,
    args: &FinishArgs,
    out: &mut impl Write,
) -> Result<RunStatus, CliError>
where
    S: DocumentStore,
    C: Clock + Send + Sync,
{
    let assignee = parse_assignee(&args.target)?;
    let Some(index) = args.index else {
        let request = list_request(&args.target, assignee)?
            .with_sort_key(SortKey::PriorityThenDuration);
        return write_list_outcome(service.list(request)?, false, out);
    };

    let mut request = FinishTaskRequest::new(RunningIndex::new(index));
    if let Some(person) = assignee {
        request = request.with_assignee(person);
    }
    if let Some(end_date) = args.end_date.as_deref() {
        request = request.with_end_date(parse_date(end_date)?);
    }
    let outcome = service.finish(request)?;
    write_mutation_outcome(&outcome, Mutation::Finished, out)
}

fn parse_assignee(target: &TargetArgs) -> Result<Option<PersonId>, CliError> {
    Ok(target
        .assigned_to
        .as_deref()
        .map(PersonId::new)
        .transpose()?)
}

fn list_request(
    target: &TargetArgs,
    assignee: Option<PersonId>,
) -> Result<ListTasksRequest, CliError> {
    let mut request = ListTasksRequest::new();
    if let Some(person) = assignee {
        request = request.with_assignee(person);
    }
    if let Some(raw) = target.certain_date.as_deref() {
        let as_of: NaiveDate = parse_date(raw)?;
        request = request.with_as_of(as_of);
    }
    Ok(request)
}

fn write_list_outcome(
    outcome: ListOutcome,
    show_terminal: bool,
    out: &mut impl Write,
) -> Result<RunStatus, CliError> {
    match outcome {
        ListOutcome::Listed { listing, .. } => {
            writeln!(out, "{}", render_listing(&listing, show_terminal)?)?;
            Ok(RunStatus::Complete)
        }
        ListOutcome::Reindexed { person, report } => {
            write_report(&person, &report, Confirmation::Reindexed, out)
        }
        ListOutcome::NoTasks(person) => {
            writeln!(out, "{}", render_no_tasks(&person)?)?;
            Ok(RunStatus::Complete)
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Mutation {
    Updated,
    Finished,
}

fn write_mutation_outcome(
    outcome: &MutationOutcome,
    mutation: Mutation,
    out: &mut impl Write,
) -> Result<RunStatus, CliError> {
    match outcome {
        MutationOutcome::Synced {
            person,
            task,
            report,
        } => {
            let confirmation = match mutation {
                Mutation::Updated => Confirmation::Updated(task),
                Mutation::Finished => Confirmation::Finished(task),
            };
            write_report(person, report, confirmation, out)
        }
        MutationOutcome::NoTasks(person) => {
            writeln!(out, "{}", render_no_tasks(person)?)?;
            Ok(RunStatus::Complete)
        }
    }
}

fn write_report(
    person: &PersonId,
    report: &SyncReport,
    confirmation: Confirmation<'_>,
    out: &mut impl Write,
) -> Result<RunStatus, CliError> {
    writeln!(out, "{}", render_sync_report(person, report, confirmation)?)?;
    if report.has_failures() {
        Ok(RunStatus::ReplicaFailures)
    } else {
        Ok(RunStatus::Complete)
    }
}
