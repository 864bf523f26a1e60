//! Non-blocking console line reader

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::io::{AsyncBufRead, BufReader};
use tokio::sync::mpsc::{self, error::TryRecvError};
use tokio::task::JoinHandle;

use crate::error::{ReadError, StreamError};

use super::background::{LineReaderContext, spawn_line_reader};

/// Handler run once when the input stream fails
pub type ErrorCallback = Box<dyn FnOnce(&StreamError) + Send + 'static>;

/// Lifecycle of the background read loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReaderState {
    /// Between reads
    Idle,
    /// Waiting on the input stream
    Reading,
    /// Stream ended or failed; never leaves this state
    Closed(StreamError),
}

/// Line reader backed by one background task
///
/// Lines are delivered in the order they were read, each exactly once. After
/// the stream fails, every read returns the recorded [`StreamError`].
///
/// # Ordering on failure
///
/// The error callback runs on the background task as soon as the stream
/// fails, which can be before the foreground has drained the buffer. Lines
/// read before the failure are still returned, in order, after the callback
/// has run; the error is reported only once they are all consumed. No line
/// read after the failure exists, since the task stops reading.
pub struct InputReader {
    lines: mpsc::UnboundedReceiver<String>,
    state: Arc<Mutex<ReaderState>>,
    task: Option<JoinHandle<()>>,
}

impl InputReader {
    /// Start reading the process's standard input
    ///
    /// `on_error` runs exactly once, on the background task, the first time
    /// standard input reaches its end or fails.
    pub fn stdin<F>(on_error: F) -> Self
    where
        F: FnOnce(&StreamError) + Send + 'static,
    {
        Self::spawn(BufReader::new(tokio::io::stdin()), on_error)
    }

    /// Start reading an arbitrary buffered source
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<R, F>(input: R, on_error: F) -> Self
    where
        R: AsyncBufRead + Unpin + Send + 'static,
        F: FnOnce(&StreamError) + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let state = Arc::new(Mutex::new(ReaderState::Idle));

        let task = spawn_line_reader(
            input,
            LineReaderContext {
                lines: tx,
                state: Arc::clone(&state),
                on_error: Box::new(on_error),
            },
        );

        Self {
            lines: rx,
            state,
            task: Some(task),
        }
    }

    /// Take the next buffered line without waiting
    ///
    /// # Errors
    /// [`ReadError::NoData`] when nothing is pending, or the recorded
    /// [`ReadError::Stream`] once the stream has failed and every buffered
    /// line has been delivered.
    pub fn non_blocking_read(&mut self) -> Result<String, ReadError> {
        match self.lines.try_recv() {
            Ok(line) => Ok(line),
            Err(TryRecvError::Empty) => Err(ReadError::NoData),
            Err(TryRecvError::Disconnected) => Err(self.closed_error()),
        }
    }

    /// Wait for the next line
    ///
    /// Suspends on the channel until the background task delivers a line or
    /// shuts down.
    ///
    /// # Errors
    /// The recorded [`ReadError::Stream`] once the stream has failed.
    pub async fn blocking_read(&mut self) -> Result<String, ReadError> {
        match self.lines.recv().await {
            Some(line) => Ok(line),
            None => Err(self.closed_error()),
        }
    }

    /// Current state of the background read loop
    #[must_use]
    pub fn state(&self) -> ReaderState {
        self.state.lock().clone()
    }

    fn closed_error(&self) -> ReadError {
        match &*self.state.lock() {
            ReaderState::Closed(error) => ReadError::Stream(error.clone()),
            // Task went away without recording why (panicked callback)
            _ => ReadError::Stream(StreamError::closed()),
        }
    }
}

impl std::fmt::Debug for InputReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputReader")
            .field("state", &*self.state.lock())
            .finish_non_exhaustive()
    }
}

impl Drop for InputReader {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
