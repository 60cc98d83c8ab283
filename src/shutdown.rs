use tokio::signal::unix::{signal, SignalKind};

use crate::group::GroupAbort;

/// Install a handler that aborts the group on SIGTERM or SIGINT.
///
/// The abort code follows the shell convention of `128 + signal number`,
/// so an interrupted run exits 130 and a terminated one 143.
pub fn install_shutdown_handler(abort: GroupAbort) {
    tokio::spawn(async move {
        let (mut sigterm, mut sigint) = match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(term), Ok(int)) => (term, int),
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!(error = %e, "Failed to install signal handlers");
                return;
            }
        };

        let signo = tokio::select! {
            _ = sigterm.recv() => {
                tracing::info!("Received SIGTERM, aborting worker group");
                SignalKind::terminate().as_raw_value()
            }
            _ = sigint.recv() => {
                tracing::info!("Received SIGINT, aborting worker group");
                SignalKind::interrupt().as_raw_value()
            }
            _ = abort.cancelled() => return,
        };

        abort.abort(128 + signo);
    });
}
