//! Unix fork/wait primitives for throwaway worker children
//!
//! A worker child is created with `fork(2)`, runs a single unit of work, and
//! leaves through `_exit(2)` without unwinding or running exit handlers. Its
//! exit status is always 0; the outcome of the work is never reported back
//! through the process table. Terminated children are collected either
//! explicitly with [`wait_child`] or in bulk with the non-blocking
//! [`reap_pending`] drain used by the background reaper.

// Allow unsafe code for this module since process duplication requires
// libc::_exit() and nix::unistd::fork() calls
#![allow(unsafe_code)]

use crate::{CoreError, Result};
use nix::errno::Errno;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::{fork, ForkResult, Pid};
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, error, warn};

/// Duplicate the current process and run `work` in the child
///
/// In the child branch the work unit is invoked exactly once and the child
/// then terminates immediately through `_exit(0)`, skipping destructors and
/// exit handlers. A panic inside `work` is caught and logged but still
/// produces exit status 0: worker children are disposable and their failures
/// are child-local.
///
/// In the parent branch the child's PID is returned without waiting. The
/// caller is responsible for eventual collection, typically by running a
/// [`crate::reaper::Reaper`].
///
/// ## Errors
///
/// Fails with [`CoreError::ProcessFork`] when `fork(2)` itself fails (for
/// example under `EAGAIN` resource limits); no child exists in that case.
///
/// ## Safety
///
/// The fork itself is wrapped here. The child runs only the provided closure
/// and leaves via `_exit`, so no destructors or locks from the parent image
/// are re-entered after the work unit completes.
pub fn fork_and_run<F>(work: F) -> Result<Pid>
where
    F: FnOnce(),
{
    // Safety: the child branch never returns into caller code; it executes
    // `work` and terminates via _exit without touching parent-owned state.
    match unsafe { fork() } {
        Ok(ForkResult::Child) => {
            if let Err(panic) = catch_unwind(AssertUnwindSafe(work)) {
                error!(
                    "worker child {} failed: {}",
                    std::process::id(),
                    panic_message(&panic)
                );
            }
            // Status stays 0 even when the work unit failed.
            unsafe { libc::_exit(0) }
        }
        Ok(ForkResult::Parent { child }) => {
            debug!("forked worker child {}", child);
            Ok(child)
        }
        Err(errno) => Err(CoreError::ProcessFork(format!("fork(2) failed: {}", errno))),
    }
}

/// Collect every already-terminated child without blocking
///
/// Drains `waitpid(-1, WNOHANG)` until no further exit status is immediately
/// available, so children that are still running are never waited on.
/// Returns the number of children collected. Having no children at all is
/// not an error; the drain simply collects nothing.
pub fn reap_pending() -> usize {
    let mut reaped = 0;
    loop {
        match waitpid(None, Some(WaitPidFlag::WNOHANG)) {
            // No child has exited since the last pass
            Ok(WaitStatus::StillAlive) => break,
            Ok(status) => {
                if let Some(pid) = status.pid() {
                    debug!("collected child {} ({:?})", pid, status);
                }
                reaped += 1;
            }
            // This process has no children left to collect
            Err(Errno::ECHILD) => break,
            Err(Errno::EINTR) => continue,
            Err(e) => {
                warn!("waitpid drain failed: {}", e);
                break;
            }
        }
    }
    reaped
}

/// Block until the given child terminates and return its wait status
///
/// Collects the child's exit status directly, bypassing the background
/// reaper. A given child's status can be collected exactly once, by
/// whichever caller gets to it first.
pub fn wait_child(pid: Pid) -> Result<WaitStatus> {
    loop {
        match waitpid(pid, None) {
            Ok(status) => return Ok(status),
            Err(Errno::EINTR) => continue,
            Err(e) => {
                return Err(CoreError::ProcessWait(format!(
                    "waitpid({}) failed: {}",
                    pid, e
                )))
            }
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s
    } else {
        "unknown panic payload"
    }
}
