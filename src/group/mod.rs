//! Worker group runtime.
//!
//! A fixed number of workers run as tokio tasks inside one process:
//! - **Numbering**: workers are identified by `0..size`, worker 0 coordinates
//! - **Messaging**: each worker owns one inbox; [`Communicator::send`] is a
//!   point-to-point handoff of a single string
//! - **Abort**: any worker can call [`GroupAbort::abort`]; the supervisor in
//!   [`WorkerGroup::run`] then tears down every sibling task
//!
//! Each command runs in its own process group, which is killed when the
//! worker waiting on it is aborted, so nothing it forked outlives the abort.

pub mod abort;
pub mod comm;

pub use abort::GroupAbort;
pub use comm::{Communicator, COORDINATOR};

use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::error::{RankRunError, Result};

/// Exit code recorded when a worker task errors out or panics.
pub const WORKER_FAILURE_EXIT_CODE: i32 = 1;

/// Final state of a group run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupOutcome {
    pub exit_code: i32,
}

impl GroupOutcome {
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }

    /// Exit status as the OS reports it (`-1` becomes `255`)
    pub fn process_exit_code(&self) -> u8 {
        self.exit_code as u8
    }
}

#[derive(Debug)]
pub struct WorkerGroup {
    communicators: Vec<Communicator>,
    abort: GroupAbort,
}

impl WorkerGroup {
    pub fn new(size: usize, max_message_len: usize) -> Result<Self> {
        if size == 0 {
            return Err(RankRunError::InvalidGroupSize(size));
        }
        if max_message_len == 0 {
            return Err(RankRunError::InvalidMaxCommandLen(max_message_len));
        }

        let abort = GroupAbort::new();
        let (senders, inboxes): (Vec<_>, Vec<_>) =
            (0..size).map(|_| mpsc::channel::<String>(1)).unzip();
        let peers = Arc::new(senders);

        let communicators = inboxes
            .into_iter()
            .enumerate()
            .map(|(rank, inbox)| {
                Communicator::new(rank, peers.clone(), inbox, abort.clone(), max_message_len)
            })
            .collect();

        Ok(Self {
            communicators,
            abort,
        })
    }

    pub fn size(&self) -> usize {
        self.communicators.len()
    }

    pub fn abort_handle(&self) -> GroupAbort {
        self.abort.clone()
    }

    /// Run `worker` once per group member and wait for all of them.
    ///
    /// The first abort stops every remaining task and its exit code becomes
    /// the outcome. A worker that returns an error or panics aborts the group
    /// with [`WORKER_FAILURE_EXIT_CODE`].
    pub async fn run<F, Fut>(self, worker: F) -> GroupOutcome
    where
        F: Fn(Communicator) -> Fut,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let abort = self.abort;
        let mut tasks = JoinSet::new();
        for comm in self.communicators {
            let rank = comm.rank();
            let fut = worker(comm);
            tasks.spawn(async move { (rank, fut.await) });
        }

        loop {
            tokio::select! {
                biased;

                _ = abort.cancelled() => {
                    tasks.abort_all();
                    while tasks.join_next().await.is_some() {}
                    break;
                }

                joined = tasks.join_next() => match joined {
                    None => break,
                    Some(Ok((_, Ok(())))) => {}
                    Some(Ok((rank, Err(e)))) => {
                        tracing::error!(worker_id = rank, error = %e, "Worker failed");
                        abort.abort(WORKER_FAILURE_EXIT_CODE);
                    }
                    Some(Err(e)) if e.is_panic() => {
                        tracing::error!(error = %e, "Worker panicked");
                        abort.abort(WORKER_FAILURE_EXIT_CODE);
                    }
                    Some(Err(_)) => {}
                },
            }
        }

        GroupOutcome {
            exit_code: abort.exit_code().unwrap_or(0),
        }
    }
}
