/// Longest command (in bytes) a worker will accept. Longer lines are truncated.
pub const DEFAULT_MAX_COMMAND_LEN: usize = 4999;

/// Shell used to run command-list entries, the same one `system(3)` uses.
pub const DEFAULT_SHELL: &str = "sh";

/// Interpreter placed in front of per-worker scripts in pattern mode.
pub const DEFAULT_SCRIPT_INTERPRETER: &str = "bash";

/// How commands are launched on a worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    /// Program invoked as `<shell> -c <command>`
    pub shell: String,
    /// Program invoked as `<interpreter> <script>`
    pub script_interpreter: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            shell: DEFAULT_SHELL.to_string(),
            script_interpreter: DEFAULT_SCRIPT_INTERPRETER.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Number of workers in the group (the `-np` of a parallel launch)
    pub group_size: usize,
    pub max_command_len: usize,
    pub shell: ShellConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            group_size: default_group_size(),
            max_command_len: DEFAULT_MAX_COMMAND_LEN,
            shell: ShellConfig::default(),
        }
    }
}

impl RunConfig {
    pub fn new(group_size: usize) -> Self {
        Self {
            group_size,
            ..Default::default()
        }
    }

    pub fn with_max_command_len(mut self, max_command_len: usize) -> Self {
        self.max_command_len = max_command_len;
        self
    }

    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell.shell = shell.into();
        self
    }

    pub fn with_script_interpreter(mut self, interpreter: impl Into<String>) -> Self {
        self.shell.script_interpreter = interpreter.into();
        self
    }
}

/// One worker per available CPU, falling back to a single worker.
pub fn default_group_size() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
