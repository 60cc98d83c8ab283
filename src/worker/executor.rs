use std::os::unix::process::ExitStatusExt;
use std::path::PathBuf;
use std::process::ExitStatus;

use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use tokio::process::Command;

use crate::config::ShellConfig;
use crate::group::GroupAbort;

/// Exit code reported when the OS gives none (signal termination, spawn failure).
pub const UNKNOWN_EXIT_CODE: i32 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Completed,
    Failed,
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

/// What a worker was asked to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// A command-file line, run through the shell
    Command(String),
    /// A pattern-mode script, run by the script interpreter
    Script(PathBuf),
}

/// Result of running one invocation
#[derive(Debug)]
pub struct ExecutionResult {
    pub worker_id: usize,
    /// Command line as shown in logs
    pub command: String,
    pub status: JobStatus,
    pub exit_code: Option<i32>,
    /// Terminating signal, if the process was killed by one
    pub signal: Option<i32>,
    pub error: Option<String>,
}

impl ExecutionResult {
    pub fn is_success(&self) -> bool {
        self.status == JobStatus::Completed
    }

    /// Exit code to abort the group with
    pub fn observed_exit_code(&self) -> i32 {
        self.exit_code.unwrap_or(UNKNOWN_EXIT_CODE)
    }
}

/// Runs a worker's command and turns failures into a group abort.
#[derive(Debug, Clone, Default)]
pub struct CommandExecutor {
    config: ShellConfig,
}

impl CommandExecutor {
    pub fn new(config: ShellConfig) -> Self {
        Self { config }
    }

    /// The command line as the user would type it
    pub fn display(&self, invocation: &Invocation) -> String {
        match invocation {
            Invocation::Command(command) => command.clone(),
            Invocation::Script(path) => {
                format!("{} {}", self.config.script_interpreter, path.display())
            }
        }
    }

    fn command(&self, invocation: &Invocation) -> Command {
        let mut cmd = match invocation {
            Invocation::Command(command) => {
                let mut cmd = Command::new(&self.config.shell);
                cmd.arg("-c").arg(command);
                cmd
            }
            Invocation::Script(path) => {
                let mut cmd = Command::new(&self.config.script_interpreter);
                cmd.arg(path);
                cmd
            }
        };
        // Stdio is inherited so job output goes straight to the terminal.
        // Each command leads its own process group so an abort can take down
        // everything the shell forked, not just the shell.
        cmd.process_group(0).kill_on_drop(true);
        cmd
    }

    async fn wait(&self, invocation: &Invocation) -> Result<ExitStatus, std::io::Error> {
        let mut child = self.command(invocation).spawn()?;
        let mut guard = ProcessGroupGuard::new(child.id());
        let status = child.wait().await?;
        guard.disarm();
        Ok(status)
    }

    /// Run `invocation` to completion and report how it ended
    pub async fn execute(&self, worker_id: usize, invocation: &Invocation) -> ExecutionResult {
        let command = self.display(invocation);
        tracing::info!(worker_id, command = %command, "Executing");

        let result = self.wait(invocation).await;
        Self::process_status(worker_id, command, result)
    }

    /// Run `invocation`; on failure log it and abort the whole group with the
    /// observed exit code.
    ///
    /// Returns `None` without running anything if the group is already
    /// aborted, or if it is aborted while the command runs (the command's
    /// whole process group is killed).
    pub async fn run_or_abort(
        &self,
        worker_id: usize,
        invocation: &Invocation,
        abort: &GroupAbort,
    ) -> Option<ExecutionResult> {
        if abort.is_aborted() {
            tracing::debug!(worker_id, "Group aborted, not starting command");
            return None;
        }

        let result = tokio::select! {
            result = self.execute(worker_id, invocation) => result,
            _ = abort.cancelled() => {
                tracing::debug!(worker_id, "Group aborted, command killed");
                return None;
            }
        };

        if !result.is_success() {
            let exit_code = result.observed_exit_code();
            tracing::error!(
                worker_id,
                command = %result.command,
                exit_code,
                signal = ?result.signal,
                error = ?result.error,
                "Command failed"
            );
            abort.abort(exit_code);
        }

        Some(result)
    }

    fn process_status(
        worker_id: usize,
        command: String,
        result: Result<ExitStatus, std::io::Error>,
    ) -> ExecutionResult {
        match result {
            Ok(status) => {
                let exit_code = status.code();
                let signal = status.signal();
                let (job_status, error) = if status.success() {
                    (JobStatus::Completed, None)
                } else {
                    (
                        JobStatus::Failed,
                        Some(match (exit_code, signal) {
                            (Some(code), _) => format!("Exit code: {}", code),
                            (None, Some(sig)) => format!("Killed by signal {}", sig),
                            (None, None) => "Abnormal termination".to_string(),
                        }),
                    )
                };

                tracing::debug!(
                    worker_id,
                    status = %job_status,
                    exit_code = ?exit_code,
                    "Command finished"
                );

                ExecutionResult {
                    worker_id,
                    command,
                    status: job_status,
                    exit_code,
                    signal,
                    error,
                }
            }
            Err(e) => ExecutionResult {
                worker_id,
                command,
                status: JobStatus::Failed,
                exit_code: None,
                signal: None,
                error: Some(e.to_string()),
            },
        }
    }
}

/// SIGKILLs a running command's process group when dropped.
///
/// Dropping happens when the waiting future is cancelled, either by the
/// abort branch of [`CommandExecutor::run_or_abort`] or by the supervisor
/// aborting the worker task.
struct ProcessGroupGuard {
    pgid: Option<Pid>,
}

impl ProcessGroupGuard {
    fn new(pid: Option<u32>) -> Self {
        Self {
            pgid: pid.map(|pid| Pid::from_raw(pid as i32)),
        }
    }

    /// The command exited on its own; leave its group alone
    fn disarm(&mut self) {
        self.pgid = None;
    }
}

impl Drop for ProcessGroupGuard {
    fn drop(&mut self) {
        if let Some(pgid) = self.pgid.take() {
            if let Err(e) = killpg(pgid, Signal::SIGKILL) {
                tracing::debug!(pgid = pgid.as_raw(), error = %e, "Process group already gone");
            }
        }
    }
}
