//! Background collection of exited worker children
//!
//! A [`Reaper`] owns at most one background thread that periodically drains
//! the exit statuses of terminated children so they never linger as zombies.
//! The worker loop alternates a non-blocking collection pass with a timed
//! sleep; cancellation is cooperative and lands at the sleep boundary, so a
//! stopping worker always finishes its current pass.
//!
//! The reaper is an explicitly owned value, constructed once and passed to
//! whoever needs to start or stop it. Dropping it stops the worker.

use crate::config::DEFAULT_CLEANUP_INTERVAL_SECS;
use crate::process;
use crate::{CoreError, Result};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, warn};

/// A running background worker and the channel used to cancel it
#[derive(Debug)]
struct Worker {
    cancel_tx: Sender<()>,
    handle: JoinHandle<()>,
    interval: Duration,
}

impl Worker {
    /// Wake the worker at its sleep boundary and wait for it to finish.
    fn cancel(self) {
        // A worker that already exited has dropped its receiver; the failed
        // send is harmless.
        let _ = self.cancel_tx.send(());
        if self.handle.join().is_err() {
            warn!("reaper worker terminated by panic");
        }
    }
}

/// Owner of the background zombie-collection worker
///
/// Invariant: the slot holds either nothing or a handle to a live worker, and
/// at most one worker is active at any time. Replace-on-start and
/// clear-on-stop are serialized on the slot, so concurrent calls cannot race
/// into two live workers or a dangling handle.
#[derive(Debug, Default)]
pub struct Reaper {
    worker: Mutex<Option<Worker>>,
}

impl Reaper {
    /// Create a reaper with no active worker
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) the background collection worker
    ///
    /// The worker drains all already-terminated children, sleeps for
    /// `interval_secs`, and repeats until cancelled. If a worker is already
    /// running it is replaced: the new worker is spawned first, and the old
    /// one is cancelled only after the spawn succeeded, so a failed start
    /// leaves the previous worker running.
    ///
    /// ## Errors
    ///
    /// - [`CoreError::ValidationError`] if `interval_secs` is 0
    /// - [`CoreError::ReaperStart`] if the worker thread cannot be spawned
    pub fn keep_clean(&self, interval_secs: u64) -> Result<()> {
        if interval_secs == 0 {
            return Err(CoreError::ValidationError(
                "cleanupIntervalSecs: must be > 0".to_string(),
            ));
        }
        let interval = Duration::from_secs(interval_secs);
        let (cancel_tx, cancel_rx) = mpsc::channel();

        let handle = thread::Builder::new()
            .name("kelpie-reaper".to_string())
            .spawn(move || collection_loop(interval, &cancel_rx))
            .map_err(|e| {
                CoreError::ReaperStart(format!("failed to spawn reaper worker: {}", e))
            })?;

        let previous = self.slot().replace(Worker {
            cancel_tx,
            handle,
            interval,
        });
        if let Some(worker) = previous {
            debug!("replacing running reaper worker");
            worker.cancel();
        }
        info!("reaper worker running with {}s interval", interval_secs);
        Ok(())
    }

    /// Start the worker with the default 5 second interval
    pub fn keep_clean_default(&self) -> Result<()> {
        self.keep_clean(DEFAULT_CLEANUP_INTERVAL_SECS)
    }

    /// Cancel the current worker, if any
    ///
    /// Idempotent: calling this with no active worker is a harmless no-op.
    pub fn stop_cleanup(&self) {
        let worker = self.slot().take();
        match worker {
            Some(worker) => {
                worker.cancel();
                info!("reaper worker stopped");
            }
            None => debug!("stop_cleanup called with no active reaper"),
        }
    }

    /// Whether a background worker is currently active
    pub fn is_running(&self) -> bool {
        self.slot().is_some()
    }

    /// The interval of the active worker, if one is running
    pub fn interval(&self) -> Option<Duration> {
        self.slot().as_ref().map(|w| w.interval)
    }

    fn slot(&self) -> MutexGuard<'_, Option<Worker>> {
        self.worker.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for Reaper {
    fn drop(&mut self) {
        self.stop_cleanup();
    }
}

fn collection_loop(interval: Duration, cancel_rx: &Receiver<()>) {
    debug!("reaper worker started (interval {:?})", interval);
    loop {
        let reaped = process::reap_pending();
        if reaped > 0 {
            debug!("reaper collected {} exited children", reaped);
        }
        match cancel_rx.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => continue,
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    debug!("reaper worker exiting");
}
