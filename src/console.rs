//! Coloured console output
//!
//! All user-facing text is printed in bright yellow so it stands out from the
//! output of the external tools interleaved with it.

use std::fmt::Display;
use std::io::{self, Write};

use crossterm::style::{ResetColor, Stylize};

use crate::error::AssistError;

/// Print a line in yellow
pub fn notice(message: impl Display) {
    println!("{}", message.to_string().yellow());
}

/// Print a success message in yellow
pub fn success(message: impl Display) {
    notice(message);
}

/// Print an error as `Error <code>: <message>`
pub fn fail(error: &AssistError) {
    log::debug!("Reporting error {}: {:?}", error.code(), error);
    notice(format!("Error {}: {}", error.code(), error));
}

/// Print `key: value` with the key in yellow
pub fn key_value(key: &str, value: &str) {
    println!("{}{}", format!("{key}: ").yellow(), value);
}

/// Print the REPL prompt without a trailing newline
pub fn prompt() {
    let mut stdout = io::stdout();
    let _ = write!(stdout, "{}", "\n> ".yellow());
    let _ = stdout.flush();
}

/// Restore the default terminal colours
pub fn reset_color() {
    let _ = crossterm::execute!(io::stdout(), ResetColor);
}

/// Audible cue after a successful build or upload
pub fn beep_success() {
    bell(1);
}

/// Audible cue after a failed build or upload
pub fn beep_failure() {
    bell(2);
}

fn bell(times: usize) {
    let mut stdout = io::stdout();
    let _ = stdout.write_all("\x07".repeat(times).as_bytes());
    let _ = stdout.flush();
}
