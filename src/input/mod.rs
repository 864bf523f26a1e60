//! Interactive input reader
//!
//! Reads console lines on a dedicated background task so the foreground loop
//! can poll for stray input without blocking, and block for the next command
//! without spinning.
//!
//! # Module Structure
//!
//! - `reader` - `InputReader` with the non-blocking and blocking read API
//! - `background` - the perpetual line-reading task

mod background;
mod reader;

pub use reader::{ErrorCallback, InputReader, ReaderState};
