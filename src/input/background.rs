//! Background task that feeds the input reader
//!
//! The task is the only producer of lines and the only writer of the reader
//! state. It stops permanently after the first end-of-stream or I/O error.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::StreamError;

use super::reader::{ErrorCallback, ReaderState};

/// Shared state handed to the line reading task
pub(super) struct LineReaderContext {
    pub lines: mpsc::UnboundedSender<String>,
    pub state: Arc<Mutex<ReaderState>>,
    pub on_error: ErrorCallback,
}

/// Spawn the task that reads `input` line by line
///
/// Completed lines go to the channel in the order they were read. On failure
/// the callback runs first, then the state flips to `Closed`, then the sender
/// is dropped; a consumer that sees the channel disconnect has therefore
/// already been preceded by the callback.
pub(super) fn spawn_line_reader<R>(mut input: R, ctx: LineReaderContext) -> JoinHandle<()>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let LineReaderContext {
            lines,
            state,
            on_error,
        } = ctx;
        let mut buffer = Vec::new();

        let error = loop {
            *state.lock() = ReaderState::Reading;
            buffer.clear();

            match input.read_until(b'\n', &mut buffer).await {
                Ok(0) => break StreamError::closed(),
                Ok(_) => {
                    let line = decode_line(&buffer);
                    *state.lock() = ReaderState::Idle;
                    if lines.send(line).is_err() {
                        // Reader dropped, nobody left to deliver to
                        log::debug!("Input reader dropped, stopping background read");
                        return;
                    }
                }
                Err(e) => break StreamError::from(e),
            }
        };

        log::debug!("Input stream ended: {error}");
        on_error(&error);
        *state.lock() = ReaderState::Closed(error);
        drop(lines);
    })
}

/// Strip the line terminator and decode lossily
fn decode_line(raw: &[u8]) -> String {
    let mut end = raw.len();
    if end > 0 && raw[end - 1] == b'\n' {
        end -= 1;
        if end > 0 && raw[end - 1] == b'\r' {
            end -= 1;
        }
    }
    String::from_utf8_lossy(&raw[..end]).into_owned()
}
