use std::path::PathBuf;

/// Marks where the worker id goes in a script pattern.
pub const WILDCARD: char = '*';

/// Filename pattern split around its first wildcard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptPattern {
    prefix: String,
    suffix: String,
}

impl ScriptPattern {
    /// Returns `None` when `pattern` has no wildcard
    pub fn parse(pattern: &str) -> Option<Self> {
        let (prefix, suffix) = pattern.split_once(WILDCARD)?;
        Some(Self {
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
        })
    }

    /// Script path for `worker_id`: the id in plain decimal replaces the wildcard
    pub fn resolve(&self, worker_id: usize) -> PathBuf {
        PathBuf::from(format!("{}{}{}", self.prefix, worker_id, self.suffix))
    }
}

/// How a worker finds its work, decided from the program argument alone
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    /// Every worker runs its own script, if it exists
    Pattern(ScriptPattern),
    /// The coordinator reads this command file and hands out one line per worker
    List(PathBuf),
}

impl RunMode {
    pub fn from_arg(arg: &str) -> Self {
        match ScriptPattern::parse(arg) {
            Some(pattern) => RunMode::Pattern(pattern),
            None => RunMode::List(PathBuf::from(arg)),
        }
    }
}
