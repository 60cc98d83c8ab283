use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use rank_run::config::{
    default_group_size, RunConfig, DEFAULT_MAX_COMMAND_LEN, DEFAULT_SCRIPT_INTERPRETER,
    DEFAULT_SHELL,
};
use rank_run::group::WorkerGroup;
use rank_run::shutdown::install_shutdown_handler;
use rank_run::worker::{run_on, RunMode};

/// Exit status for usage errors.
const USAGE_EXIT_CODE: u8 = 1;

#[derive(Parser, Debug)]
#[command(name = "rank-run")]
#[command(version)]
#[command(about = "Run serial commands or per-worker scripts in parallel, one per worker")]
struct Args {
    /// Command file (one command per line), or a script pattern with one '*'
    /// that is replaced by the worker id (e.g. 'wgrib_*.sh')
    #[arg(value_name = "CMDFILE | SCRIPT_PATTERN")]
    target: String,

    /// Number of workers (defaults to the number of available CPUs)
    #[arg(long, short = 'n')]
    workers: Option<usize>,

    /// Shell used to run command-file lines
    #[arg(long, default_value = DEFAULT_SHELL)]
    shell: String,

    /// Interpreter used to run pattern-mode scripts
    #[arg(long, default_value = DEFAULT_SCRIPT_INTERPRETER)]
    interpreter: String,

    /// Longest accepted command in bytes; longer ones are truncated
    #[arg(long, default_value_t = DEFAULT_MAX_COMMAND_LEN)]
    max_command_len: usize,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(USAGE_EXIT_CODE)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    // Logs go to stderr so command output on stdout stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = RunConfig::new(args.workers.unwrap_or_else(default_group_size))
        .with_max_command_len(args.max_command_len)
        .with_shell(args.shell)
        .with_script_interpreter(args.interpreter);

    let group = match WorkerGroup::new(config.group_size, config.max_command_len) {
        Ok(group) => group,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(USAGE_EXIT_CODE);
        }
    };
    install_shutdown_handler(group.abort_handle());

    let outcome = run_on(group, Arc::new(config), RunMode::from_arg(&args.target)).await;
    if !outcome.is_success() {
        tracing::error!(exit_code = outcome.exit_code, "Worker group aborted");
    }
    ExitCode::from(outcome.process_exit_code())
}
