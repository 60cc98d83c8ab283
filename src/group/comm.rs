use std::sync::Arc;

use tokio::sync::mpsc;

use crate::error::{RankRunError, Result};
use crate::group::GroupAbort;
use crate::scheduler::command::truncate_command;

/// Identifier of the worker that loads and hands out the command list.
pub const COORDINATOR: usize = 0;

/// One worker's view of the group: its identity, the mailboxes of every
/// peer, its own inbox and the shared abort signal.
#[derive(Debug)]
pub struct Communicator {
    rank: usize,
    peers: Arc<Vec<mpsc::Sender<String>>>,
    inbox: mpsc::Receiver<String>,
    abort: GroupAbort,
    max_message_len: usize,
}

impl Communicator {
    pub(crate) fn new(
        rank: usize,
        peers: Arc<Vec<mpsc::Sender<String>>>,
        inbox: mpsc::Receiver<String>,
        abort: GroupAbort,
        max_message_len: usize,
    ) -> Self {
        Self {
            rank,
            peers,
            inbox,
            abort,
            max_message_len,
        }
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn size(&self) -> usize {
        self.peers.len()
    }

    pub fn is_coordinator(&self) -> bool {
        self.rank == COORDINATOR
    }

    pub fn abort_handle(&self) -> &GroupAbort {
        &self.abort
    }

    /// Abort every worker in the group with `exit_code`
    pub fn abort(&self, exit_code: i32) {
        self.abort.abort(exit_code);
    }

    /// Send one message to worker `dest`.
    ///
    /// Messages over the length limit are truncated before they leave.
    pub async fn send(&self, dest: usize, mut message: String) -> Result<()> {
        let peer = self.peers.get(dest).ok_or(RankRunError::InvalidWorker {
            worker: dest,
            size: self.size(),
        })?;

        if truncate_command(&mut message, self.max_message_len) {
            tracing::warn!(
                worker_id = self.rank,
                dest,
                max_len = self.max_message_len,
                "Message truncated"
            );
        }

        peer.send(message)
            .await
            .map_err(|_| RankRunError::ChannelClosed(dest))
    }

    /// Block until the next message for this worker arrives
    pub async fn recv(&mut self) -> Result<String> {
        self.inbox
            .recv()
            .await
            .ok_or(RankRunError::ChannelClosed(self.rank))
    }
}
