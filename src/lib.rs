//! # cmapi-cli
//!
//! A command-line assistant for a VEX robotics team. One long-running REPL
//! standardizes the project lifecycle around `git`, the PROS toolchain, and
//! Bitbucket: initialize, build, upload, back up, pull, link, clone, and
//! create projects from the team template.
//!
//! ## Architecture
//!
//! - [`input`]: background console reader with non-blocking and blocking reads
//! - [`process`]: external tool execution and the running-process registry
//! - [`config`]: startup environment checks and the settings file
//! - [`project`]: the lifecycle workflows
//! - [`commands`]: REPL line parsing and dispatch
//! - [`repl`]: the foreground loop
//! - [`console`]: coloured output
//! - [`error`]: error types and their user-facing codes
//!
//! ## Input failure
//!
//! The console is read on its own task so the foreground can flush stray
//! input before each prompt. When standard input closes, the reader runs a
//! callback once; the binary uses it to kill every tracked subprocess and
//! exit:
//!
//! ```no_run
//! use cmapi_cli::{InputReader, ProcessRegistry};
//!
//! # async fn example() {
//! let registry = ProcessRegistry::new();
//! let tracked = registry.clone();
//! let mut reader = InputReader::stdin(move |err| {
//!     log::debug!("stdin closed: {err}");
//!     tracked.kill_all();
//!     std::process::exit(0);
//! });
//!
//! while let Ok(line) = reader.blocking_read().await {
//!     log::info!("read {line}");
//! }
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Fallible operations return [`Result<T, AssistError>`](Result). Every
//! [`AssistError`] has a numeric [`code`](AssistError::code) printed next to
//! its message.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod commands;
pub mod config;
pub mod console;
pub mod error;
pub mod input;
pub mod process;
pub mod project;
pub mod repl;

// Re-export commonly used types for external API
pub use commands::{Assistant, Command, parse_command_line};
pub use config::{Environment, Secrets, UserInfo};
pub use error::{AssistError, ReadError, Result, StreamError};
pub use input::{InputReader, ReaderState};
pub use process::{
    CommandOutput, Executor, Invocation, OutputMode, ProcessRegistry, ShellExecutor,
};
pub use project::{BitbucketClient, Label, RepositoryHost, Workflows};

/// Version of the assistant
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
