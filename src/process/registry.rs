//! Running-process registry
//!
//! Bookkeeping of every external tool this process has started and not yet
//! seen exit, so a fatal input failure can kill them all.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use super::kill::kill_pid;

/// One tracked subprocess
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunningProcess {
    /// Registry-local identifier, unique for the registry's lifetime
    pub id: u64,
    /// Operating system process id
    pub pid: u32,
    /// Program name, for diagnostics
    pub program: String,
}

/// Ordered set of live subprocesses
///
/// Cheap to clone; clones share the same entries. Entries are appended by
/// [`ProcessRegistry::track`] and removed when the returned guard drops.
#[derive(Debug, Clone, Default)]
pub struct ProcessRegistry {
    entries: Arc<Mutex<Vec<RunningProcess>>>,
    next_id: Arc<AtomicU64>,
}

impl ProcessRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a started subprocess
    ///
    /// The entry lives exactly as long as the returned guard.
    #[must_use = "the entry is removed as soon as the guard is dropped"]
    pub fn track(&self, pid: u32, program: impl Into<String>) -> ProcessGuard {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let program = program.into();
        log::debug!("Tracking process {pid} ({program})");

        self.entries.lock().push(RunningProcess { id, pid, program });

        ProcessGuard {
            registry: self.clone(),
            id,
        }
    }

    /// Copy of the current entries in start order
    #[must_use]
    pub fn snapshot(&self) -> Vec<RunningProcess> {
        self.entries.lock().clone()
    }

    /// Number of live entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// True when nothing is running
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Kill every tracked subprocess
    ///
    /// Best effort: failures are logged, and nothing waits for the processes
    /// to actually die. Entries stay until their guards drop. Returns the
    /// number of kill signals that were delivered.
    pub fn kill_all(&self) -> usize {
        let targets = self.snapshot();
        let mut killed = 0;

        for process in &targets {
            match kill_pid(process.pid) {
                Ok(()) => {
                    log::debug!("Killed process {} ({})", process.pid, process.program);
                    killed += 1;
                }
                Err(e) => {
                    log::warn!(
                        "Failed to kill process {} ({}): {}",
                        process.pid,
                        process.program,
                        e
                    );
                }
            }
        }

        killed
    }

    fn remove(&self, id: u64) {
        let mut entries = self.entries.lock();
        if let Some(index) = entries.iter().position(|p| p.id == id) {
            let process = entries.remove(index);
            log::debug!("Process {} ({}) finished", process.pid, process.program);
        }
    }
}

/// Keeps a registry entry alive; removes it on drop
#[derive(Debug)]
pub struct ProcessGuard {
    registry: ProcessRegistry,
    id: u64,
}

impl Drop for ProcessGuard {
    fn drop(&mut self) {
        self.registry.remove(self.id);
    }
}
