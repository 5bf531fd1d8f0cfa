//! Pipeline runner and host boundaries.
//!
//! The supervisor drives two external collaborators through traits:
//!
//! - [`PipelineRunner`] - the asset-processing pipeline. It receives an
//!   immutable [`AssetSnapshot`] and an [`EpisodeHandle`], streams per-asset
//!   results back as they complete, and its return value is the single
//!   terminal signal for the episode (batch complete or fatal abort).
//! - [`HostSink`] - the host bundler's output surface: emit a produced file,
//!   register a watch path, report a diagnostic against one asset.
//!
//! Neither collaborator ever touches the ledger or cache directly; results
//! travel exclusively over the episode channel, which is what keeps the
//! supervisor a deterministic state machine.

use crate::asset::AssetId;
use crate::error::PipelineError;
use crate::ledger::AssetSnapshot;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

/// Output of processing one asset.
#[derive(Debug, Clone)]
pub struct ProcessedFile {
    /// The asset this output belongs to.
    pub id: AssetId,
    /// Target name in the output graph; defaults to the asset's own name.
    pub file_name: Option<String>,
    /// Processed content.
    pub content: Vec<u8>,
    /// Dependency paths observed while processing, recorded for watch
    /// invalidation.
    pub deps: Vec<PathBuf>,
    /// Plugin-attached metadata (e.g. parsed manifest permissions).
    pub metadata: Option<serde_json::Value>,
}

/// A file handed to the host's output graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedFile {
    /// Target name in the output graph.
    pub name: String,
    /// Source path this file was produced from, if any.
    pub original_file_name: Option<String>,
    /// File content.
    pub source: Vec<u8>,
}

/// Host bundler output surface.
///
/// Implementations adapt these calls onto the host's own plugin context
/// (emitFile / addWatchFile / error in a Rollup-shaped host).
pub trait HostSink: Send + Sync {
    /// Emit a produced file into the host's output graph.
    fn emit_file(&self, file: EmittedFile);

    /// Register a path with the host's filesystem watcher.
    fn add_watch_file(&self, path: &Path);

    /// Report a diagnostic tied to a specific asset.
    fn report_error(&self, id: &AssetId, message: &str);
}

/// Incremental results of an episode, as received by the supervisor.
#[derive(Debug)]
pub(crate) enum EpisodeEvent {
    /// One asset finished successfully.
    FileDone(ProcessedFile),
    /// One asset failed; the batch continues.
    FileError { id: AssetId, message: String },
    /// The whole batch completed (synthesized from the runner's `Ok`).
    Completed,
    /// The runner aborted (synthesized from the runner's `Err`).
    Fatal(String),
}

/// Per-episode reporting handle given to the runner.
///
/// Cheap to clone; the runner may hand clones to concurrent workers. Results
/// are applied by the supervisor as soon as they arrive - no ordering is
/// required of the runner.
#[derive(Debug, Clone)]
pub struct EpisodeHandle {
    tx: mpsc::UnboundedSender<EpisodeEvent>,
}

impl EpisodeHandle {
    pub(crate) fn new(tx: mpsc::UnboundedSender<EpisodeEvent>) -> Self {
        Self { tx }
    }

    /// Report one asset as successfully processed.
    pub fn file_done(&self, file: ProcessedFile) {
        // A closed channel means the supervisor is gone; nothing useful to
        // do with the result then.
        let _ = self.tx.send(EpisodeEvent::FileDone(file));
    }

    /// Report one asset as failed without aborting the batch.
    pub fn file_error(&self, id: AssetId, message: impl Into<String>) {
        let _ = self.tx.send(EpisodeEvent::FileError {
            id,
            message: message.into(),
        });
    }
}

/// The asset-processing pipeline, invoked once per `Running` episode.
///
/// The supervisor guarantees at most one live episode. Per-asset failures
/// should be reported through the handle; returning `Err` is reserved for
/// failures that invalidate the whole episode.
#[async_trait]
pub trait PipelineRunner: Send + Sync {
    /// Process the snapshot, streaming results through `episode`.
    async fn run(
        &self,
        snapshot: AssetSnapshot,
        episode: EpisodeHandle,
    ) -> Result<(), PipelineError>;
}
