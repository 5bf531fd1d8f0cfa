//! Build supervisor: the state machine driving pipeline episodes.
//!
//! The supervisor is a single spawned task that owns the asset ledger and
//! processed cache outright. Host lifecycle hooks and the pipeline runner
//! only ever talk to it through channels, so every state transition is
//! serialized and atomic relative to supervisor state - there is no shared
//! mutable memory between the supervisor and its collaborators.
//!
//! States: `Idle` → `Collecting` → `Running` → `Watch`, with `Failed` as the
//! terminal escape hatch for a runner-level abort. `Watch` is the steady
//! state of a host session: invalidations are applied there, and the next
//! host-triggered rebuild (not the supervisor) decides when to reprocess.

use crate::asset::{Asset, AssetId};
use crate::cache::ProcessedCache;
use crate::error::{Result, SupervisorError};
use crate::events::{ChangeKind, SupervisorEvent};
use crate::invalidate::invalidate;
use crate::ledger::AssetLedger;
use crate::runner::{EmittedFile, EpisodeEvent, EpisodeHandle, HostSink, PipelineRunner};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};

/// Observable supervisor state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SupervisorState {
    /// Waiting for the host to report its project root.
    Idle,
    /// Accumulating discovered assets from the host's input resolution.
    Collecting,
    /// A pipeline episode is in flight. The only state with a live runner.
    Running,
    /// Steady state: awaiting filesystem change events.
    Watch,
    /// Runner-level abort; terminal for this session.
    Failed(String),
}

impl SupervisorState {
    /// Whether this state ends the host's build wait, one way or the other.
    pub fn is_settled(&self) -> bool {
        matches!(self, SupervisorState::Watch | SupervisorState::Failed(_))
    }
}

/// Point-in-time report of ledger and cache contents.
///
/// Produced on request through [`SupervisorHandle::inspect`]; used by the
/// host adapter and by tests to observe outcomes without sharing state.
#[derive(Debug, Clone)]
pub struct LedgerReport {
    /// All known assets, in arrival order.
    pub assets: Vec<Asset>,
    /// Ids that currently hold a cache entry.
    pub cached: Vec<AssetId>,
}

impl LedgerReport {
    /// Look up one asset by id.
    pub fn asset(&self, id: &AssetId) -> Option<&Asset> {
        self.assets.iter().find(|a| &a.id == id)
    }

    /// Whether an id currently holds a cache entry.
    pub fn is_cached(&self, id: &AssetId) -> bool {
        self.cached.contains(id)
    }
}

/// Handle for sending events to a running supervisor and awaiting its state.
///
/// Cloneable; every clone feeds the same event queue.
#[derive(Debug, Clone)]
pub struct SupervisorHandle {
    events: mpsc::UnboundedSender<SupervisorEvent>,
    state: watch::Receiver<SupervisorState>,
}

impl SupervisorHandle {
    /// Send a raw event.
    ///
    /// # Errors
    ///
    /// Returns [`SupervisorError::Closed`] if the supervisor task is gone.
    pub fn send(&self, event: SupervisorEvent) -> Result<()> {
        self.events
            .send(event)
            .map_err(|_| SupervisorError::Closed)
    }

    /// Report the project root (host `config` hook).
    pub fn root(&self, path: impl Into<PathBuf>) -> Result<()> {
        self.send(SupervisorEvent::Root(path.into()))
    }

    /// Report one discovered asset (host input resolution).
    pub fn add_file(&self, asset: Asset) -> Result<()> {
        self.send(SupervisorEvent::AddFile(asset))
    }

    /// Kick off the pipeline (host build-start hook).
    pub fn start(&self) -> Result<()> {
        self.send(SupervisorEvent::Start)
    }

    /// Report a filesystem change (host watcher).
    pub fn change(&self, path: impl Into<PathBuf>, kind: ChangeKind) -> Result<()> {
        self.send(SupervisorEvent::Change(path.into(), kind))
    }

    /// Current state.
    pub fn state(&self) -> SupervisorState {
        self.state.borrow().clone()
    }

    /// Suspend until the supervisor settles into `Watch`.
    ///
    /// This is what keeps the host's build open: it resolves only once every
    /// discovered asset is `Processed` or `Errored`.
    ///
    /// # Errors
    ///
    /// Returns [`SupervisorError::SessionFailed`] if the session ended in
    /// `Failed`, or [`SupervisorError::Closed`] if the task is gone.
    pub async fn wait_for_watch(&self) -> Result<()> {
        let mut state = self.state.clone();
        let settled = state
            .wait_for(SupervisorState::is_settled)
            .await
            .map_err(|_| SupervisorError::Closed)?
            .clone();

        match settled {
            SupervisorState::Failed(message) => Err(SupervisorError::SessionFailed(message)),
            _ => Ok(()),
        }
    }

    /// Request a point-in-time report of ledger and cache contents.
    ///
    /// # Errors
    ///
    /// Returns [`SupervisorError::Closed`] if the supervisor task is gone.
    pub async fn inspect(&self) -> Result<LedgerReport> {
        let (tx, rx) = oneshot::channel();
        self.send(SupervisorEvent::Inspect(tx))?;
        rx.await.map_err(|_| SupervisorError::Closed)
    }
}

/// Spawn a supervisor task.
///
/// `runner` is invoked once per `Running` episode with an immutable asset
/// snapshot; `sink` receives the side effects (emitted files, watch
/// registrations, diagnostics). The task lives until every handle clone is
/// dropped.
pub fn spawn(runner: Arc<dyn PipelineRunner>, sink: Arc<dyn HostSink>) -> SupervisorHandle {
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (state_tx, state_rx) = watch::channel(SupervisorState::Idle);

    let supervisor = Supervisor {
        ledger: AssetLedger::new(),
        cache: ProcessedCache::new(),
        root: None,
        runner,
        sink,
        events: event_rx,
        state: state_tx,
        episode: None,
    };
    tokio::spawn(supervisor.run());

    SupervisorHandle {
        events: event_tx,
        state: state_rx,
    }
}

/// Something for the event loop to apply.
enum Input {
    Host(SupervisorEvent),
    Episode(EpisodeEvent),
    Shutdown,
}

struct Supervisor {
    ledger: AssetLedger,
    cache: ProcessedCache,
    root: Option<PathBuf>,
    runner: Arc<dyn PipelineRunner>,
    sink: Arc<dyn HostSink>,
    events: mpsc::UnboundedReceiver<SupervisorEvent>,
    state: watch::Sender<SupervisorState>,
    /// Feedback channel of the in-flight episode; `Some` only in `Running`.
    episode: Option<mpsc::UnboundedReceiver<EpisodeEvent>>,
}

impl Supervisor {
    async fn run(mut self) {
        loop {
            match self.next_input().await {
                Input::Host(event) => self.on_event(event),
                Input::Episode(event) => self.on_episode_event(event),
                Input::Shutdown => break,
            }
        }
        debug!("supervisor handle dropped, task exiting");
    }

    /// Wait for the next event from either source.
    ///
    /// Events from each source arrive in order; interleaving between sources
    /// is arbitrary but each event is applied to completion before the next.
    async fn next_input(&mut self) -> Input {
        match self.episode.as_mut() {
            Some(episode) => tokio::select! {
                event = episode.recv() => match event {
                    Some(event) => Input::Episode(event),
                    // The episode task died without its terminal signal
                    // (a panicking runner drops the channel). Surface it
                    // as a fatal abort so the session settles.
                    None => Input::Episode(EpisodeEvent::Fatal(
                        "pipeline episode ended without a terminal signal".to_string(),
                    )),
                },
                maybe = self.events.recv() => {
                    maybe.map(Input::Host).unwrap_or(Input::Shutdown)
                }
            },
            None => match self.events.recv().await {
                Some(event) => Input::Host(event),
                None => Input::Shutdown,
            },
        }
    }

    fn current(&self) -> SupervisorState {
        self.state.borrow().clone()
    }

    fn transition(&mut self, next: SupervisorState) {
        info!(from = ?self.current(), to = ?next, "supervisor transition");
        let _ = self.state.send(next);
    }

    fn on_event(&mut self, event: SupervisorEvent) {
        match event {
            SupervisorEvent::Root(path) => self.on_root(path),
            SupervisorEvent::AddFile(asset) => self.on_add_file(asset),
            SupervisorEvent::Start => self.on_start(),
            SupervisorEvent::Change(path, kind) => self.on_change(path, kind),
            SupervisorEvent::Inspect(reply) => {
                let _ = reply.send(LedgerReport {
                    assets: self.ledger.iter().cloned().collect(),
                    cached: self.cache.ids(),
                });
            }
        }
    }

    fn on_root(&mut self, path: PathBuf) {
        match self.current() {
            SupervisorState::Idle => {
                debug!(root = %path.display(), "project root received");
                self.root = Some(path);
                self.transition(SupervisorState::Collecting);
            }
            state => debug!(?state, "ROOT outside idle ignored"),
        }
    }

    fn on_add_file(&mut self, asset: Asset) {
        match self.current() {
            SupervisorState::Collecting | SupervisorState::Running | SupervisorState::Watch => {
                debug!(asset = %asset.id, file_type = ?asset.file_type, "asset discovered");
                self.ledger.add_or_update(asset);
            }
            state => debug!(?state, asset = %asset.id, "ADD_FILE ignored in this state"),
        }
    }

    fn on_start(&mut self) {
        match self.current() {
            SupervisorState::Collecting => self.start_episode(),
            // The host may invoke its build hook more than once per session;
            // a second START must not spawn a second episode.
            state => debug!(?state, "START outside collecting is a no-op"),
        }
    }

    fn start_episode(&mut self) {
        self.ledger.queue_all();
        let snapshot = self.ledger.snapshot();
        info!(assets = snapshot.len(), "starting pipeline episode");

        let (tx, rx) = mpsc::unbounded_channel();
        let handle = EpisodeHandle::new(tx.clone());
        let runner = Arc::clone(&self.runner);

        // The runner's return value becomes the episode's single terminal
        // signal; file events sent earlier are already in the channel ahead
        // of it.
        tokio::spawn(async move {
            let terminal = match runner.run(snapshot, handle).await {
                Ok(()) => EpisodeEvent::Completed,
                Err(err) => EpisodeEvent::Fatal(err.to_string()),
            };
            let _ = tx.send(terminal);
        });

        self.episode = Some(rx);
        self.transition(SupervisorState::Running);
    }

    fn on_change(&mut self, path: PathBuf, kind: ChangeKind) {
        match self.current() {
            SupervisorState::Watch => {
                debug!(path = %path.display(), ?kind, "watch change");
                let invalidated = invalidate(&mut self.ledger, &mut self.cache, &path);
                if !invalidated.is_empty() {
                    info!(
                        count = invalidated.len(),
                        path = %path.display(),
                        "invalidated assets await the next host rebuild"
                    );
                }
            }
            state => debug!(?state, path = %path.display(), "CHANGE outside watch ignored"),
        }
    }

    fn on_episode_event(&mut self, event: EpisodeEvent) {
        match event {
            EpisodeEvent::FileDone(file) => self.on_file_done(file),
            EpisodeEvent::FileError { id, message } => self.on_file_error(id, message),
            EpisodeEvent::Completed => self.on_completed(),
            EpisodeEvent::Fatal(message) => self.on_fatal(message),
        }
    }

    fn on_file_done(&mut self, file: crate::runner::ProcessedFile) {
        let Some(asset) = self.ledger.get(&file.id).cloned() else {
            warn!(asset = %file.id, "runner reported FILE_DONE for unknown asset, skipped");
            return;
        };

        let name = file
            .file_name
            .clone()
            .or_else(|| asset.file_name.clone())
            .unwrap_or_else(|| {
                file.id
                    .as_path()
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| file.id.to_string())
            });

        self.cache.insert(&file);
        // Cannot fail: the id was just found above.
        let _ = self.ledger.mark_processed(&file.id);

        self.sink.emit_file(EmittedFile {
            name,
            original_file_name: Some(file.id.to_string()),
            source: file.content,
        });
        self.sink.add_watch_file(file.id.as_path());
        debug!(asset = %file.id, "asset processed and emitted");
    }

    fn on_file_error(&mut self, id: AssetId, message: String) {
        if self.ledger.mark_errored(&id).is_err() {
            warn!(asset = %id, "runner reported ERROR for unknown asset, skipped");
            return;
        }
        self.sink.report_error(&id, &message);
        debug!(asset = %id, %message, "asset errored, batch continues");
    }

    fn on_completed(&mut self) {
        // The runner owes a resolution for every queued asset. Anything left
        // queued here is a contract violation on its side; resolve it
        // internally so the watch state starts from a consistent ledger.
        let leftovers: Vec<AssetId> = self.ledger.queued().map(|a| a.id.clone()).collect();
        for id in leftovers {
            warn!(asset = %id, "asset left queued at batch completion, marking errored");
            let _ = self.ledger.mark_errored(&id);
        }

        self.episode = None;
        self.transition(SupervisorState::Watch);
    }

    fn on_fatal(&mut self, message: String) {
        warn!(%message, "pipeline episode aborted");
        self.episode = None;
        self.transition(SupervisorState::Failed(message));
    }
}
