//! Atomically published redirect table.

use std::sync::Arc;

use arc_swap::ArcSwap;
use tokio::sync::{broadcast, mpsc};

use crate::config::RedirectConfig;
use crate::error::ResolveError;
use crate::routing::MatchResolver;
use crate::rules::RedirectIndex;

/// Shared handle to the currently published rule set.
///
/// Lookups load the current resolver without locking; a reload builds a
/// complete replacement and swaps the pointer in one store.
#[derive(Debug)]
pub struct RedirectTable {
    current: ArcSwap<MatchResolver>,
}

impl RedirectTable {
    pub fn new(index: RedirectIndex) -> Self {
        Self {
            current: ArcSwap::from_pointee(MatchResolver::new(Arc::new(index))),
        }
    }

    pub fn from_config(config: &RedirectConfig) -> Self {
        Self::new(config.build_index())
    }

    /// Replace the published index.
    pub fn publish(&self, index: RedirectIndex) {
        let rules = index.len();
        let duplicates = index.duplicate_count();
        self.current
            .store(Arc::new(MatchResolver::new(Arc::new(index))));
        tracing::info!(rules, duplicates, "Redirect table published");
    }

    /// Build an index from `config` and publish it.
    pub fn apply_config(&self, config: &RedirectConfig) {
        self.publish(config.build_index());
    }

    /// Snapshot of the resolver in effect right now.
    pub fn current(&self) -> Arc<MatchResolver> {
        self.current.load_full()
    }

    /// Resolve a raw URL against the published table.
    pub fn resolve(&self, raw: &str) -> Result<Option<String>, ResolveError> {
        self.current.load().resolve(Some(raw))
    }

    /// Apply config updates until the channel closes or shutdown fires.
    pub async fn run_updates(
        self: Arc<Self>,
        mut updates: mpsc::UnboundedReceiver<RedirectConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        loop {
            tokio::select! {
                update = updates.recv() => match update {
                    Some(config) => self.apply_config(&config),
                    None => break,
                },
                _ = shutdown.recv() => {
                    tracing::debug!("Reload loop stopping");
                    break;
                }
            }
        }
    }
}
