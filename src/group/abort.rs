use std::sync::{Arc, OnceLock};

use tokio_util::sync::CancellationToken;

/// Group-wide abort signal shared by every worker.
///
/// The first call to [`GroupAbort::abort`] records its exit code and cancels
/// the token; later calls only re-cancel and never replace the code.
#[derive(Debug, Clone, Default)]
pub struct GroupAbort {
    token: CancellationToken,
    exit_code: Arc<OnceLock<i32>>,
}

impl GroupAbort {
    pub fn new() -> Self {
        Self::default()
    }

    /// Terminate the whole group with `exit_code`
    pub fn abort(&self, exit_code: i32) {
        if self.exit_code.set(exit_code).is_ok() {
            tracing::debug!(exit_code, "Group abort requested");
        }
        self.token.cancel();
    }

    pub fn is_aborted(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the group has been aborted
    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }

    /// Exit code of the first abort, if any
    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code.get().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_abort_is_idle() {
        let abort = GroupAbort::new();
        assert!(!abort.is_aborted());
        assert_eq!(abort.exit_code(), None);
    }

    #[test]
    fn first_abort_code_wins() {
        let abort = GroupAbort::new();
        abort.abort(2);
        abort.abort(7);
        assert!(abort.is_aborted());
        assert_eq!(abort.exit_code(), Some(2));
    }

    #[test]
    fn clones_share_state() {
        let abort = GroupAbort::new();
        let peer = abort.clone();
        peer.abort(-1);
        assert!(abort.is_aborted());
        assert_eq!(abort.exit_code(), Some(-1));
    }

    #[tokio::test]
    async fn cancelled_resolves_after_abort() {
        let abort = GroupAbort::new();
        let waiter = abort.clone();
        let handle = tokio::spawn(async move { waiter.cancelled().await });
        abort.abort(3);
        handle.await.unwrap();
    }
}
