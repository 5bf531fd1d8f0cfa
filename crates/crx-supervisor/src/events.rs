//! Inbound events from the host bundler lifecycle.
//!
//! Hook invocations arrive on the host's schedule; each becomes one event on
//! the supervisor's queue and is applied atomically relative to supervisor
//! state. Events from a single source are applied in arrival order.

use crate::asset::Asset;
use crate::supervisor::LedgerReport;
use std::path::PathBuf;
use tokio::sync::oneshot;

/// Kind of filesystem change reported by the host watcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// File was created.
    Created,
    /// File content was modified.
    Updated,
    /// File was removed.
    Deleted,
}

/// One event on the supervisor's queue.
#[derive(Debug)]
pub enum SupervisorEvent {
    /// Host reported its project root; moves `Idle` → `Collecting`.
    Root(PathBuf),
    /// One asset discovered during input resolution. Idempotent per id.
    AddFile(Asset),
    /// Pipeline kickoff. Meaningful once; a later `Start` is a no-op.
    Start,
    /// Filesystem change reported by the host watcher.
    Change(PathBuf, ChangeKind),
    /// Request a report of ledger and cache contents (tests, adapter).
    Inspect(oneshot::Sender<LedgerReport>),
}
