//! Per-worker program.
//!
//! Every worker decides its mode from the program argument alone:
//! - **Pattern mode** (argument contains `*`): resolve `prefix<id>suffix`
//!   and run it with the script interpreter if the file exists
//! - **List mode**: the coordinator loads the command file and sends one
//!   command to each worker; everyone then runs their own non-empty command
//!
//! # Components
//!
//! - [`RunMode`] / [`ScriptPattern`]: mode selection and script path resolution
//! - [`CommandExecutor`]: runs a command through the shell and aborts the
//!   group on failure
//!
//! # Failure
//!
//! A non-zero exit or a signal kills the whole group: the failing worker
//! calls [`GroupAbort::abort`](crate::group::GroupAbort::abort) with the
//! observed exit code (or `-1`) and the supervisor stops everyone else.

pub mod executor;
pub mod mode;

pub use executor::{CommandExecutor, ExecutionResult, Invocation, JobStatus};
pub use mode::{RunMode, ScriptPattern};

use std::sync::Arc;

use crate::config::RunConfig;
use crate::error::Result;
use crate::group::{Communicator, GroupAbort, GroupOutcome, WorkerGroup};
use crate::scheduler::{distribute, receive, Assignment, CommandLoader};

/// Exit code used when the coordinator cannot read the command file.
pub const LOAD_FAILURE_EXIT_CODE: i32 = 1;

/// Run `arg` on a fresh group sized by `config` and wait for the outcome
pub async fn run_group(config: RunConfig, arg: &str) -> Result<GroupOutcome> {
    let group = WorkerGroup::new(config.group_size, config.max_command_len)?;
    Ok(run_on(group, Arc::new(config), RunMode::from_arg(arg)).await)
}

/// Run `mode` on an existing group
pub async fn run_on(group: WorkerGroup, config: Arc<RunConfig>, mode: RunMode) -> GroupOutcome {
    tracing::debug!(workers = group.size(), mode = ?mode, "Starting worker group");
    group
        .run(move |comm| run_worker(comm, mode.clone(), config.clone()))
        .await
}

/// Everything one worker does between group start and exit
pub async fn run_worker(
    mut comm: Communicator,
    mode: RunMode,
    config: Arc<RunConfig>,
) -> Result<()> {
    let executor = CommandExecutor::new(config.shell.clone());
    let worker_id = comm.rank();
    let abort = comm.abort_handle().clone();

    match mode {
        RunMode::Pattern(pattern) => {
            let script = pattern.resolve(worker_id);
            if tokio::fs::try_exists(&script).await.unwrap_or(false) {
                executor
                    .run_or_abort(worker_id, &Invocation::Script(script), &abort)
                    .await;
            } else {
                tracing::info!(worker_id, path = %script.display(), "Script not found, skipping");
            }
        }
        RunMode::List(path) => {
            let assignment = if comm.is_coordinator() {
                let loader = CommandLoader::new(comm.size(), config.max_command_len);
                match loader.load(&path).await {
                    Ok(list) => distribute(&comm, list).await?,
                    Err(e) => {
                        tracing::error!(worker_id, error = %e, "Failed to load command file");
                        comm.abort(LOAD_FAILURE_EXIT_CODE);
                        return Ok(());
                    }
                }
            } else {
                receive(&mut comm).await?
            };

            run_assignment(&executor, &abort, assignment).await;
        }
    }

    Ok(())
}

async fn run_assignment(executor: &CommandExecutor, abort: &GroupAbort, assignment: Assignment) {
    if assignment.is_idle() {
        tracing::debug!(worker_id = assignment.worker_id, "No command assigned");
        return;
    }
    executor
        .run_or_abort(
            assignment.worker_id,
            &Invocation::Command(assignment.command),
            abort,
        )
        .await;
}
