use std::path::Path;

use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::error::{RankRunError, Result};
use crate::scheduler::command::{normalize, truncate_command};

/// Ordered commands read by the coordinator, capped at the group size.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandList {
    commands: Vec<String>,
    ignored: usize,
}

impl CommandList {
    pub fn new(commands: Vec<String>) -> Self {
        Self {
            commands,
            ignored: 0,
        }
    }

    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Eligible commands dropped because the group had no worker left for them
    pub fn ignored(&self) -> usize {
        self.ignored
    }

    pub fn into_commands(self) -> Vec<String> {
        self.commands
    }
}

/// Reads a command file into a [`CommandList`]
#[derive(Debug, Clone)]
pub struct CommandLoader {
    group_size: usize,
    max_command_len: usize,
}

impl CommandLoader {
    pub fn new(group_size: usize, max_command_len: usize) -> Self {
        Self {
            group_size,
            max_command_len,
        }
    }

    pub async fn load(&self, path: impl AsRef<Path>) -> Result<CommandList> {
        let path = path.as_ref();
        let file = File::open(path)
            .await
            .map_err(|source| RankRunError::CommandFile {
                path: path.to_path_buf(),
                source,
            })?;

        let list = self.read(BufReader::new(file)).await?;
        tracing::info!(
            path = %path.display(),
            commands = list.len(),
            "Command file loaded"
        );
        Ok(list)
    }

    /// Read commands line by line. Blank and comment lines are skipped,
    /// invalid UTF-8 is replaced rather than rejected.
    pub async fn read<R>(&self, reader: R) -> Result<CommandList>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut list = CommandList::default();
        let mut lines = reader.split(b'\n');

        while let Some(raw) = lines.next_segment().await? {
            let Some(mut command) = normalize(&String::from_utf8_lossy(&raw)).into_command()
            else {
                continue;
            };

            if list.commands.len() >= self.group_size {
                list.ignored += 1;
                continue;
            }

            let original_len = command.len();
            if truncate_command(&mut command, self.max_command_len) {
                tracing::warn!(
                    worker_id = list.commands.len(),
                    original_len,
                    max_len = self.max_command_len,
                    "Command truncated"
                );
            }
            list.commands.push(command);
        }

        if list.ignored > 0 {
            tracing::warn!(
                num_commands = list.commands.len() + list.ignored,
                num_workers = self.group_size,
                "More commands than workers, extra commands ignored"
            );
        }

        Ok(list)
    }
}
