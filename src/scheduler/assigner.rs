use crate::error::Result;
use crate::group::{Communicator, COORDINATOR};
use crate::scheduler::loader::CommandList;

/// The single command a worker is responsible for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub worker_id: usize,
    /// Empty when there is nothing for this worker to do
    pub command: String,
}

impl Assignment {
    pub fn new(worker_id: usize, command: String) -> Self {
        Self { worker_id, command }
    }

    pub fn is_idle(&self) -> bool {
        self.command.is_empty()
    }
}

/// Map commands onto workers by position.
///
/// Always yields exactly `group_size` assignments; workers past the end of
/// the list get an empty command and commands past `group_size` are dropped.
pub fn assign(list: CommandList, group_size: usize) -> Vec<Assignment> {
    let mut commands = list.into_commands().into_iter();
    (0..group_size)
        .map(|worker_id| Assignment::new(worker_id, commands.next().unwrap_or_default()))
        .collect()
}

/// Hand every worker its assignment and return the coordinator's own.
///
/// One message goes to each non-coordinator worker even when its command is
/// empty, so nobody is left waiting in [`receive`].
pub async fn distribute(comm: &Communicator, list: CommandList) -> Result<Assignment> {
    debug_assert!(comm.is_coordinator());

    let mut assignments = assign(list, comm.size()).into_iter();
    let own = assignments
        .next()
        .unwrap_or_else(|| Assignment::new(COORDINATOR, String::new()));

    for assignment in assignments {
        tracing::debug!(
            worker_id = assignment.worker_id,
            idle = assignment.is_idle(),
            "Sending assignment"
        );
        comm.send(assignment.worker_id, assignment.command).await?;
    }

    Ok(own)
}

/// Wait for this worker's assignment from the coordinator
pub async fn receive(comm: &mut Communicator) -> Result<Assignment> {
    let command = comm.recv().await?;
    Ok(Assignment::new(comm.rank(), command))
}
