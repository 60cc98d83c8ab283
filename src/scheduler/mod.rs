pub mod assigner;
pub mod command;
pub mod loader;

pub use assigner::{assign, distribute, receive, Assignment};
pub use command::{normalize, trim_line, NormalizedLine};
pub use loader::{CommandList, CommandLoader};
