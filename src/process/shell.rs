//! Executor backed by real operating system processes

use std::io::Write;
use std::process::Stdio;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;

use crate::console;

use super::registry::ProcessRegistry;
use super::{CommandOutput, Executor, Invocation, NO_EXIT_CODE, OutputMode};

/// Spawns programs with `tokio::process` and tracks them while they run
#[derive(Debug, Clone, Default)]
pub struct ShellExecutor {
    registry: ProcessRegistry,
}

impl ShellExecutor {
    /// Create an executor that records children in `registry`
    #[must_use]
    pub fn new(registry: ProcessRegistry) -> Self {
        Self { registry }
    }

    /// Registry shared with this executor
    #[must_use]
    pub fn registry(&self) -> &ProcessRegistry {
        &self.registry
    }

    async fn run_impl(&self, invocation: Invocation) -> CommandOutput {
        log::debug!(
            "Running `{}` in {}",
            invocation.command_line(),
            invocation.dir.display()
        );

        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .current_dir(&invocation.dir)
            // The console belongs to the input reader
            .stdin(Stdio::null());

        match invocation.mode {
            OutputMode::Inherit => {
                cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
            }
            OutputMode::Capture | OutputMode::Tee => {
                cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
            }
        }

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                log::warn!("Failed to start `{}`: {}", invocation.program, e);
                return CommandOutput::not_started();
            }
        };

        // A child that already exited has no pid and needs no tracking
        let guard = child
            .id()
            .map(|pid| self.registry.track(pid, invocation.program.clone()));

        let echo = invocation.mode == OutputMode::Tee;
        let stdout_task = child
            .stdout
            .take()
            .map(|out| spawn_collector(out, echo.then(|| Box::new(std::io::stdout()) as Sink)));
        let stderr_task = child
            .stderr
            .take()
            .map(|err| spawn_collector(err, echo.then(|| Box::new(std::io::stderr()) as Sink)));

        let code = match child.wait().await {
            Ok(status) => status.code().unwrap_or(NO_EXIT_CODE),
            Err(e) => {
                log::warn!("Failed to wait for `{}`: {}", invocation.program, e);
                NO_EXIT_CODE
            }
        };

        // Reaped: the pid may be reused while grandchildren still hold the pipes
        drop(guard);

        let stdout = join_collector(stdout_task).await;
        let stderr = join_collector(stderr_task).await;

        if invocation.mode == OutputMode::Inherit {
            // Some tools leave the terminal colour changed
            console::reset_color();
        }

        log::debug!("`{}` exited with {}", invocation.program, code);
        CommandOutput {
            stdout,
            stderr,
            code,
        }
    }
}

impl Executor for ShellExecutor {
    async fn run(&self, invocation: Invocation) -> CommandOutput {
        self.run_impl(invocation).await
    }
}

type Sink = Box<dyn Write + Send>;

/// Drain a child pipe, optionally echoing each chunk to the console
fn spawn_collector<R>(mut pipe: R, mut echo: Option<Sink>) -> JoinHandle<Vec<u8>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut collected = Vec::new();
        let mut buffer = vec![0u8; 4096];

        loop {
            match pipe.read(&mut buffer).await {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    if let Some(sink) = echo.as_mut() {
                        let _ = sink.write_all(&buffer[..n]);
                        let _ = sink.flush();
                    }
                    collected.extend_from_slice(&buffer[..n]);
                }
            }
        }

        collected
    })
}

async fn join_collector(task: Option<JoinHandle<Vec<u8>>>) -> String {
    match task {
        Some(task) => match task.await {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                log::warn!("Output collector failed: {e}");
                String::new()
            }
        },
        None => String::new(),
    }
}
