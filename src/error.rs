use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RankRunError {
    #[error("Cannot open command file '{}': {source}", path.display())]
    CommandFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid group size: {0} (need at least one worker)")]
    InvalidGroupSize(usize),

    #[error("Invalid maximum command length: {0} (need at least one byte)")]
    InvalidMaxCommandLen(usize),

    #[error("Worker {worker} is outside the group (size {size})")]
    InvalidWorker { worker: usize, size: usize },

    #[error("Channel to worker {0} closed")]
    ChannelClosed(usize),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RankRunError>;
