//! Test helpers, available with the `test-utils` feature.
//!
//! [`ScriptedRunner`] plays back a fixed outcome per asset id, so protocol
//! tests can exercise success, per-asset failure, fatal aborts, and runner
//! contract violations without any real file processing. [`RecordingSink`]
//! captures the side effects the supervisor forwards to the host.

use crate::asset::AssetId;
use crate::error::PipelineError;
use crate::ledger::AssetSnapshot;
use crate::runner::{EmittedFile, EpisodeHandle, HostSink, PipelineRunner, ProcessedFile};
use async_trait::async_trait;
use parking_lot::Mutex;
use rustc_hash::FxHashMap as HashMap;
use std::path::{Path, PathBuf};

/// What the scripted runner should do with one asset.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Report success with the given content and dependency paths.
    Done {
        content: Vec<u8>,
        deps: Vec<PathBuf>,
    },
    /// Report a per-asset error; the batch continues.
    Error(String),
    /// Report nothing for this asset (simulates a runner contract
    /// violation: the asset is left queued at completion).
    Skip,
}

impl Outcome {
    /// Success with content and no dependencies.
    pub fn done(content: impl Into<Vec<u8>>) -> Self {
        Outcome::Done {
            content: content.into(),
            deps: Vec::new(),
        }
    }

    /// Success with content and dependency paths.
    pub fn done_with_deps(
        content: impl Into<Vec<u8>>,
        deps: impl IntoIterator<Item = impl Into<PathBuf>>,
    ) -> Self {
        Outcome::Done {
            content: content.into(),
            deps: deps.into_iter().map(Into::into).collect(),
        }
    }
}

/// Pipeline runner that plays back scripted outcomes.
///
/// Assets with no scripted outcome succeed with empty content. Set `fatal`
/// to abort the whole episode after the scripted per-asset results.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    outcomes: HashMap<AssetId, Outcome>,
    fatal: Option<String>,
    /// Snapshots received across episodes, for invocation-count assertions.
    invocations: Mutex<Vec<AssetSnapshot>>,
}

impl ScriptedRunner {
    /// Runner where every asset succeeds with empty content.
    pub fn new() -> Self {
        Self::default()
    }

    /// Script an outcome for one asset id.
    pub fn outcome(mut self, id: impl Into<AssetId>, outcome: Outcome) -> Self {
        self.outcomes.insert(id.into(), outcome);
        self
    }

    /// Abort the episode with a fatal error after per-asset results.
    pub fn fatal(mut self, message: impl Into<String>) -> Self {
        self.fatal = Some(message.into());
        self
    }

    /// Number of episodes this runner has been invoked for.
    pub fn invocation_count(&self) -> usize {
        self.invocations.lock().len()
    }

    /// Snapshot handed to episode `index`.
    pub fn snapshot_for(&self, index: usize) -> Option<AssetSnapshot> {
        self.invocations.lock().get(index).cloned()
    }
}

#[async_trait]
impl PipelineRunner for ScriptedRunner {
    async fn run(
        &self,
        snapshot: AssetSnapshot,
        episode: EpisodeHandle,
    ) -> Result<(), PipelineError> {
        self.invocations.lock().push(snapshot.clone());

        for asset in &snapshot {
            match self.outcomes.get(&asset.id) {
                Some(Outcome::Done { content, deps }) => episode.file_done(ProcessedFile {
                    id: asset.id.clone(),
                    file_name: asset.file_name.clone(),
                    content: content.clone(),
                    deps: deps.clone(),
                    metadata: None,
                }),
                Some(Outcome::Error(message)) => {
                    episode.file_error(asset.id.clone(), message.clone());
                }
                Some(Outcome::Skip) => {}
                None => episode.file_done(ProcessedFile {
                    id: asset.id.clone(),
                    file_name: asset.file_name.clone(),
                    content: Vec::new(),
                    deps: Vec::new(),
                    metadata: None,
                }),
            }
        }

        match &self.fatal {
            Some(message) => Err(PipelineError::aborted(message.clone())),
            None => Ok(()),
        }
    }
}

/// Host sink that records every side effect for later assertions.
#[derive(Debug, Default)]
pub struct RecordingSink {
    emitted: Mutex<Vec<EmittedFile>>,
    watched: Mutex<Vec<PathBuf>>,
    errors: Mutex<Vec<(AssetId, String)>>,
}

impl RecordingSink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Files emitted so far.
    pub fn emitted(&self) -> Vec<EmittedFile> {
        self.emitted.lock().clone()
    }

    /// Watch paths registered so far.
    pub fn watched(&self) -> Vec<PathBuf> {
        self.watched.lock().clone()
    }

    /// Diagnostics reported so far, as (asset id, message).
    pub fn errors(&self) -> Vec<(AssetId, String)> {
        self.errors.lock().clone()
    }
}

impl HostSink for RecordingSink {
    fn emit_file(&self, file: EmittedFile) {
        self.emitted.lock().push(file);
    }

    fn add_watch_file(&self, path: &Path) {
        self.watched.lock().push(path.to_path_buf());
    }

    fn report_error(&self, id: &AssetId, message: &str) {
        self.errors.lock().push((id.clone(), message.to_string()));
    }
}
