//! Rules file watcher for hot reload.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::RedirectConfig;

/// A watcher that monitors the rules file for changes.
///
/// A zero-byte file is taken as the truncate step of an editor save and
/// skipped, so the current rule set stays published. To clear every rule
/// through a reload, leave at least one line in the file (a `#` comment is
/// enough); invalid files are likewise logged and skipped.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<RedirectConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and a receiver for validated rule sets.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<RedirectConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let watcher = Self {
            path: path.to_path_buf(),
            update_tx,
        };
        (watcher, update_rx)
    }

    /// Start watching. The returned handle must be kept alive.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let Self { path, update_tx } = self;
        let watched = path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if triggers_reload(&event.kind) => reload(&path, &update_tx),
                Ok(_) => {}
                Err(e) => tracing::error!(error = ?e, "Rules watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&watched, RecursiveMode::NonRecursive)?;
        tracing::info!(path = ?watched, "Rules watcher started");
        Ok(watcher)
    }
}

/// Content changes and re-creation trigger a reload; access and metadata do not.
pub fn triggers_reload(kind: &EventKind) -> bool {
    kind.is_modify() || kind.is_create()
}

fn reload(path: &Path, tx: &mpsc::UnboundedSender<RedirectConfig>) {
    // Editors truncate before writing; an empty file is a transient state.
    if std::fs::metadata(path).is_ok_and(|m| m.len() == 0) {
        tracing::debug!(path = ?path, "Rules file empty, waiting for content");
        return;
    }

    match load_config(path) {
        Ok(config) => {
            tracing::info!(rules = config.rules.len(), "Rules file changed, reloading");
            if tx.send(config).is_err() {
                tracing::debug!("Reload receiver dropped");
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to reload rules, keeping current rule set");
        }
    }
}
