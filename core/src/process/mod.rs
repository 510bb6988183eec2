//! Process primitives for disposable per-request workers
//!
//! This module provides the low-level process operations the server and
//! reaper are built on: duplicating the current process to run a unit of
//! work in a throwaway child, and collecting the exit statuses of children
//! that have already terminated.
//!
//! ## Platform Support
//!
//! - **Unix**: full support via `fork(2)` and `waitpid(2)`
//! - Other platforms: not supported; the module is compiled out so callers
//!   fail at build time instead of silently falling through

#[cfg(unix)]
pub mod unix;

#[cfg(unix)]
pub use unix::*;
