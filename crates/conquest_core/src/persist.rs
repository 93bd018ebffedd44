//! # War Snapshot Persistence
//!
//! Crash-safe save/restore of attack and occupation state.
//!
//! ## Guarantees
//!
//! 1. **Atomic replace**: a snapshot is written to a temp file and renamed
//!    over the target, so a crash mid-write never leaves a torn document.
//! 2. **Last snapshot wins**: the writer works from a single-slot mailbox;
//!    if the authoritative thread submits faster than the disk can keep
//!    up, intermediate snapshots are simply skipped.
//! 3. **Copy then hand off**: the authoritative thread copies its state
//!    into a [`WarSnapshot`] before submitting; the writer thread never
//!    sees live engine state.
//! 4. **Failures retry**: a failed write logs an error and re-arms the
//!    dirty flag, so the next debounce cycle tries again. Nothing in this
//!    module panics the process.
//!
//! ## Flow
//!
//! ```text
//! mutation ──▶ dirty flag ──▶ SaveScheduler (poll) ──▶ EngineTask::Flush
//!                                                          │
//!                 authoritative thread copies state ◀──────┘
//!                       │ submit(WarSnapshot)
//!                       ▼
//!                SnapshotStore mailbox ──▶ writer thread ──▶ temp + rename
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{unbounded, Sender};
use parking_lot::Mutex;
use tracing::{debug, error};

use conquest_shared::WarSnapshot;

use crate::error::{PersistenceError, PersistenceResult};
use crate::scheduler::EngineTask;

/// Writes a snapshot to `path` with atomic replacement.
///
/// # Errors
///
/// [`PersistenceError::Io`] if the temp write or rename fails.
pub fn write_snapshot(path: &Path, snapshot: &WarSnapshot) -> PersistenceResult<()> {
    let bytes = serde_json::to_vec(snapshot)
        .map_err(|e| PersistenceError::Malformed(e.to_string()))?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    std::fs::write(&tmp, bytes)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// Reads a snapshot from `path`. A missing file is a cold start, not an
/// error.
///
/// # Errors
///
/// [`PersistenceError::Io`] for read failures other than not-found,
/// [`PersistenceError::Malformed`] if the document does not parse.
pub fn read_snapshot(path: &Path) -> PersistenceResult<Option<WarSnapshot>> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let snapshot = serde_json::from_slice(&bytes)
        .map_err(|e| PersistenceError::Malformed(e.to_string()))?;
    Ok(Some(snapshot))
}

/// Asynchronous snapshot writer: a single-slot mailbox drained by a
/// dedicated I/O thread.
pub struct SnapshotStore {
    path: PathBuf,
    mailbox: Arc<Mutex<Option<WarSnapshot>>>,
    wake: Sender<()>,
    worker: Option<JoinHandle<()>>,
}

impl SnapshotStore {
    /// Spawns the writer thread. `dirty` is re-armed whenever a write
    /// fails so the debounce loop retries.
    #[must_use]
    pub fn spawn(path: PathBuf, dirty: Arc<AtomicBool>) -> Self {
        let mailbox: Arc<Mutex<Option<WarSnapshot>>> = Arc::new(Mutex::new(None));
        let (wake, wake_rx) = unbounded::<()>();

        let worker_mailbox = Arc::clone(&mailbox);
        let worker_path = path.clone();
        let worker = std::thread::spawn(move || {
            while wake_rx.recv().is_ok() {
                let pending = worker_mailbox.lock().take();
                if let Some(snapshot) = pending {
                    match write_snapshot(&worker_path, &snapshot) {
                        Ok(()) => debug!(path = %worker_path.display(), "war snapshot written"),
                        Err(e) => {
                            error!(
                                path = %worker_path.display(),
                                error = %e,
                                "war snapshot write failed, will retry"
                            );
                            dirty.store(true, Ordering::Release);
                        }
                    }
                }
            }
        });

        Self {
            path,
            mailbox,
            wake,
            worker: Some(worker),
        }
    }

    /// Submits a snapshot for asynchronous writing, replacing any snapshot
    /// still waiting in the mailbox.
    pub fn submit(&self, snapshot: WarSnapshot) {
        *self.mailbox.lock() = Some(snapshot);
        let _ = self.wake.send(());
    }

    /// Writes a snapshot synchronously on the calling thread, bypassing
    /// the mailbox. Used on disable/shutdown.
    ///
    /// # Errors
    ///
    /// Propagates [`write_snapshot`] failures.
    pub fn write_now(&self, snapshot: &WarSnapshot) -> PersistenceResult<()> {
        write_snapshot(&self.path, snapshot)
    }

    /// Stops the writer thread after it drains the mailbox.
    pub fn shutdown(self) {
        let Self { wake, worker, .. } = self;
        drop(wake);
        if let Some(handle) = worker {
            let _ = handle.join();
        }
    }
}

/// Debounce loop: polls the dirty flag at a fixed period and requests a
/// flush from the authoritative thread when it is set.
pub struct SaveScheduler {
    stop: Sender<()>,
    worker: Option<JoinHandle<()>>,
}

impl SaveScheduler {
    /// Spawns the debounce thread.
    #[must_use]
    pub fn spawn(period: Duration, dirty: Arc<AtomicBool>, tasks: Sender<EngineTask>) -> Self {
        let (stop, stop_rx) = unbounded::<()>();
        let worker = std::thread::spawn(move || loop {
            match stop_rx.recv_timeout(period) {
                // period elapsed without a stop signal: debounce check
                Err(crossbeam_channel::RecvTimeoutError::Timeout) => {
                    if dirty.swap(false, Ordering::AcqRel)
                        && tasks.send(EngineTask::Flush).is_err()
                    {
                        break;
                    }
                }
                Ok(()) | Err(crossbeam_channel::RecvTimeoutError::Disconnected) => break,
            }
        });
        Self {
            stop,
            worker: Some(worker),
        }
    }

    /// Stops the debounce thread without waiting out the current period.
    pub fn shutdown(self) {
        let Self { stop, worker } = self;
        drop(stop);
        if let Some(handle) = worker {
            let _ = handle.join();
        }
    }
}
