//! REPL commands
//!
//! # Module Structure
//!
//! - `parser` - line splitting and clap-based parsing into [`Command`]
//! - `dispatch` - [`Assistant`], which runs a parsed command
//! - `help` - usage text

mod dispatch;
mod help;
mod parser;

pub use dispatch::Assistant;
pub use help::USAGE;
pub use parser::{Command, DEFAULT_KERNEL, parse_command_line};
