//! Foreground read-dispatch loop

use crate::commands::{Assistant, parse_command_line};
use crate::console;
use crate::error::{AssistError, ReadError};
use crate::input::InputReader;
use crate::process::Executor;
use crate::project::RepositoryHost;

/// Command run when the very first line is empty
pub const DEFAULT_COMMAND: &str = "normal";

/// Remembers the last dispatched command line
#[derive(Debug, Clone)]
pub struct History {
    last: String,
}

impl Default for History {
    fn default() -> Self {
        Self {
            last: DEFAULT_COMMAND.to_string(),
        }
    }
}

impl History {
    /// Start with [`DEFAULT_COMMAND`] as the last command
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Line to run for `raw`: the trimmed input, or the last command if blank
    ///
    /// The second value is true when the last command was substituted.
    #[must_use]
    pub fn resolve(&self, raw: &str) -> (String, bool) {
        let line = raw.trim();
        if line.is_empty() {
            (self.last.clone(), true)
        } else {
            (line.to_string(), false)
        }
    }

    /// Record `line` as the last dispatched command
    pub fn record(&mut self, line: impl Into<String>) {
        self.last = line.into();
    }

    /// Last dispatched command
    #[must_use]
    pub fn last(&self) -> &str {
        &self.last
    }
}

/// Discard every line typed while nothing was reading
///
/// Keystrokes made during a long build would otherwise be run as commands
/// once the prompt returns. Returns the number of lines dropped.
pub fn flush_pending(reader: &mut InputReader) -> usize {
    let mut dropped = 0;
    loop {
        match reader.non_blocking_read() {
            Ok(line) => {
                log::debug!("Discarding stray input: {line:?}");
                dropped += 1;
            }
            Err(ReadError::NoData | ReadError::Stream(_)) => return dropped,
        }
    }
}

/// Run the REPL until the input stream fails
pub async fn run<E, H>(assistant: &mut Assistant<E, H>, reader: &mut InputReader)
where
    E: Executor,
    H: RepositoryHost,
{
    console::notice("Press enter to execute 'normal' command or previous command again (if any).");
    console::notice("Use 'help' to see all commands.");

    let mut history = History::new();

    loop {
        flush_pending(reader);
        console::prompt();

        let raw = match reader.blocking_read().await {
            Ok(raw) => raw,
            Err(e) => {
                log::debug!("Leaving REPL: {e}");
                break;
            }
        };

        let (line, repeated) = history.resolve(&raw);
        if repeated {
            console::notice(format!("Execute last command: {line}"));
        }

        let command = match parse_command_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                if let AssistError::ParseCommandLine(detail) = &e {
                    log::warn!("{}", detail.trim_end());
                }
                console::fail(&e);
                continue;
            }
        };

        history.record(line);
        if let Err(e) = assistant.execute(command).await {
            console::fail(&e);
        }
    }
}
