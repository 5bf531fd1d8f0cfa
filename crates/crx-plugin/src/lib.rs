//! # crx-plugin
//!
//! Host bundler lifecycle adapter for the crx build supervisor.
//!
//! A Rollup-shaped host drives its plugins through synchronous hooks on its
//! own schedule: `config`, `options`, `buildStart`, `resolveId`/`load`, and
//! `watchChange`. This crate translates each hook into supervisor events and
//! owns the two pieces of plugin-side behavior the supervisor stays out of:
//! routing configured entries into the asset pipeline, and serving the stub
//! virtual entry the host needs when every real entry was routed away.
//!
//! ```no_run
//! use crx_plugin::{BundleInput, ExtensionPlugin};
//! use crx_supervisor::{ChangeKind, HostSink, PipelineRunner};
//! use std::sync::Arc;
//!
//! # async fn example(runner: Arc<dyn PipelineRunner>, sink: Arc<dyn HostSink>) -> crx_supervisor::Result<()> {
//! let plugin = ExtensionPlugin::new(runner, sink);
//!
//! // Host lifecycle, hook for hook:
//! plugin.config("/project")?;
//! let input = plugin.options(BundleInput::Single("/project/src/manifest.json".into()))?;
//! plugin.build_start().await?; // suspends until every asset resolved
//!
//! // Steady state:
//! plugin.watch_change("/project/src/manifest.json", ChangeKind::Updated)?;
//! # let _ = input;
//! # Ok(())
//! # }
//! ```

mod input;
mod stub;

pub use input::{BundleInput, RoutedInput, route_input};
pub use stub::{STUB_ID, is_stub, stub_source};

use crx_supervisor::{
    ChangeKind, HostSink, PipelineRunner, Result, SupervisorHandle, spawn,
};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Plugin name reported to the host.
pub const PLUGIN_NAME: &str = "crx";

/// The extension-bundle plugin: one instance per host build session.
///
/// Spawns its supervisor at construction and forwards lifecycle hooks as
/// events. All state lives behind the supervisor; the plugin itself is
/// cheap to clone into host callbacks.
#[derive(Debug, Clone)]
pub struct ExtensionPlugin {
    supervisor: SupervisorHandle,
}

impl ExtensionPlugin {
    /// Create a plugin wired to an asset-processing pipeline and a host
    /// output sink.
    pub fn new(runner: Arc<dyn PipelineRunner>, sink: Arc<dyn HostSink>) -> Self {
        Self {
            supervisor: spawn(runner, sink),
        }
    }

    /// Handle the host's `config` hook: report the project root.
    pub fn config(&self, root: impl AsRef<Path>) -> Result<()> {
        self.supervisor.root(root.as_ref())
    }

    /// Handle the host's `options` hook: route manifest and HTML entries
    /// into the asset pipeline and return the rewritten input.
    ///
    /// Entries the pipeline does not own pass through unchanged; when none
    /// remain the returned input names only [`STUB_ID`].
    pub fn options(&self, input: BundleInput) -> Result<BundleInput> {
        let routed = route_input(input);
        for asset in routed.assets {
            self.supervisor.add_file(asset)?;
        }
        Ok(routed.remaining)
    }

    /// Handle the host's `buildStart` hook.
    ///
    /// Kicks off the pipeline and suspends until the supervisor settles: the
    /// host's build must not finish before every discovered asset is
    /// processed or errored. A repeated invocation in the same session is
    /// safe - the kickoff is a no-op and the wait resolves immediately.
    pub async fn build_start(&self) -> Result<()> {
        self.supervisor.start()?;
        self.supervisor.wait_for_watch().await
    }

    /// Handle the host's `resolveId` hook: claim only the stub entry.
    pub fn resolve_id(&self, id: &str) -> Option<String> {
        is_stub(id).then(|| id.to_string())
    }

    /// Handle the host's `load` hook: serve only the stub entry.
    pub fn load(&self, id: &str) -> Option<String> {
        if is_stub(id) {
            debug!("serving stub entry module");
            Some(stub_source())
        } else {
            None
        }
    }

    /// Handle the host's `watchChange` hook: forward the change for
    /// invalidation.
    pub fn watch_change(&self, path: impl AsRef<Path>, kind: ChangeKind) -> Result<()> {
        self.supervisor.change(path.as_ref(), kind)
    }

    /// The underlying supervisor handle, for observation and tests.
    pub fn supervisor(&self) -> &SupervisorHandle {
        &self.supervisor
    }
}
