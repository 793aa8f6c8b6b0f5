/*!
 * Configuration source consumed by the orchestration engine.
 *
 * Configuration is never mutated in place: every change publishes a whole new
 * immutable snapshot, and subscribers receive the snapshots in order.
 */

use std::sync::Arc;

use crate::app_config::Config;
use crate::store::{Store, Subscription};

/// Current configuration plus an ordered stream of replacements
#[derive(Clone)]
pub struct ConfigStore {
    store: Store<Arc<Config>>,
}

impl ConfigStore {
    /// Create a store with an initial snapshot
    pub fn new(config: Config) -> Self {
        Self {
            store: Store::new(Arc::new(config)),
        }
    }

    /// The current snapshot
    pub fn snapshot(&self) -> Arc<Config> {
        self.store.snapshot()
    }

    /// Publish a new snapshot
    pub fn replace(&self, config: Config) {
        self.store.set(Arc::new(config));
    }

    /// Derive a new snapshot from the current one and publish it
    pub fn modify(&self, f: impl FnOnce(&mut Config)) -> Arc<Config> {
        self.store.update(|current| {
            let mut next = Config::clone(current);
            f(&mut next);
            Arc::new(next)
        })
    }

    /// Subscribe to future snapshots
    pub fn subscribe(&self) -> Subscription<Arc<Config>> {
        self.store.subscribe()
    }
}
