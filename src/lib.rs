pub mod config;
pub mod error;
pub mod group;
pub mod scheduler;
pub mod shutdown;
pub mod worker;

pub use config::RunConfig;
pub use error::{RankRunError, Result};
pub use group::{GroupAbort, GroupOutcome, WorkerGroup};
pub use worker::run_group;
