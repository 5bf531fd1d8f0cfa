//! Error types for the build supervisor.
//!
//! Two taxonomies exist at this boundary:
//! - [`SupervisorError`] - failures of the supervisor itself and its ledger
//!   contract (unknown asset ids, a failed build session).
//! - [`PipelineError`] - the runner boundary: a per-asset error is reported
//!   through the episode handle and never becomes a `PipelineError`; only a
//!   runner-level fatal error does.

use crate::asset::AssetId;
use thiserror::Error;

/// Result alias for supervisor operations.
pub type Result<T> = std::result::Result<T, SupervisorError>;

/// Errors from the supervisor and its owned state.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// An event referenced an asset id the ledger does not know.
    ///
    /// This indicates a collaborator contract violation, not a user-facing
    /// build problem; callers inside the supervisor log it and continue.
    #[error("unknown asset id: {0}")]
    UnknownAsset(AssetId),

    /// The pipeline runner aborted the episode; the session is over.
    #[error("build session failed: {0}")]
    SessionFailed(String),

    /// The supervisor task is gone (event channel closed).
    ///
    /// Only happens when the supervisor task panicked or the handle outlived
    /// the runtime; treated as a session failure by callers.
    #[error("supervisor is no longer running")]
    Closed,
}

/// Fatal error from a pipeline runner episode.
///
/// Per-asset failures do not use this type - they are streamed through the
/// episode handle and the batch continues. Returning `Err(PipelineError)`
/// from [`PipelineRunner::run`](crate::runner::PipelineRunner::run) aborts
/// the whole episode and moves the supervisor to `Failed`.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The runner could not complete the batch.
    #[error("pipeline aborted: {0}")]
    Aborted(String),

    /// I/O failure that takes down the whole episode.
    #[error("pipeline i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// Convenience constructor for a fatal abort with a message.
    pub fn aborted(message: impl Into<String>) -> Self {
        Self::Aborted(message.into())
    }
}
