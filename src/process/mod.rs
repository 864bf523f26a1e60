//! External tool execution
//!
//! Every call to `git`, `make` and `pros` goes through an [`Executor`]. The
//! production [`ShellExecutor`] records each child in the
//! [`ProcessRegistry`] for exactly as long as it runs.

mod kill;
pub mod registry;
mod shell;

use std::path::{Path, PathBuf};

pub use registry::{ProcessGuard, ProcessRegistry, RunningProcess};
pub use shell::ShellExecutor;

/// Exit code reported when a program could not be started or was killed
pub const NO_EXIT_CODE: i32 = -1;

/// Where a subprocess's output goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Stream to the console, capture nothing
    Inherit,
    /// Capture silently
    Capture,
    /// Stream to the console and capture
    Tee,
}

/// A single external program call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Working directory of the child
    pub dir: PathBuf,
    /// Program name, resolved through PATH
    pub program: String,
    /// Arguments
    pub args: Vec<String>,
    /// Output handling
    pub mode: OutputMode,
}

impl Invocation {
    /// Build an invocation that streams its output to the console
    pub fn new<I, S>(dir: impl AsRef<Path>, program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            dir: dir.as_ref().to_path_buf(),
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            mode: OutputMode::Inherit,
        }
    }

    /// Change the output mode
    #[must_use]
    pub fn mode(mut self, mode: OutputMode) -> Self {
        self.mode = mode;
        self
    }

    /// `program arg1 arg2 ...`, for logs
    #[must_use]
    pub fn command_line(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, shell_words::join(&self.args))
        }
    }
}

/// Result of a finished subprocess
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Captured standard output (empty in `Inherit` mode)
    pub stdout: String,
    /// Captured standard error (empty in `Inherit` mode)
    pub stderr: String,
    /// Exit code, or [`NO_EXIT_CODE`]
    pub code: i32,
}

impl CommandOutput {
    /// Output of a program that exited with `code` and printed nothing
    #[must_use]
    pub fn exited(code: i32) -> Self {
        Self {
            code,
            ..Self::default()
        }
    }

    /// Output of a program that could not be started
    #[must_use]
    pub fn not_started() -> Self {
        Self::exited(NO_EXIT_CODE)
    }

    /// True when the exit code is zero
    #[must_use]
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

/// Runs external programs
///
/// Implementations never fail: spawn errors surface as an exit code of
/// [`NO_EXIT_CODE`], so callers only ever branch on the exit code.
pub trait Executor: Send + Sync {
    /// Run `invocation` to completion
    fn run(&self, invocation: Invocation) -> impl std::future::Future<Output = CommandOutput> + Send;
}
