use parking_lot::RwLock;
use quantum_telemetry::{log_height_event, STATE_VERSIONS_PRUNED};
use shared_types::Height;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::{StateError, StateVersion};
use crate::ports::VersionStore;

#[derive(Default)]
struct Versions {
    by_height: BTreeMap<Height, Arc<StateVersion>>,
    latest: Height,
}

/// In-memory implementation of VersionStore.
///
/// Each version sits behind an `Arc`; a commit publishes it with a single map
/// insert under the write lock, so readers never observe a partial version.
pub struct InMemoryVersionStore {
    versions: RwLock<Versions>,
}

impl InMemoryVersionStore {
    pub fn new() -> Self {
        Self {
            versions: RwLock::new(Versions::default()),
        }
    }

    /// Number of versions currently held.
    pub fn len(&self) -> usize {
        self.versions.read().by_height.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryVersionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl VersionStore for InMemoryVersionStore {
    fn commit(&self, version: StateVersion) -> Result<Arc<StateVersion>, StateError> {
        let mut versions = self.versions.write();
        if version.height <= versions.latest {
            return Err(StateError::HeightOrder {
                height: version.height,
                last: versions.latest,
            });
        }

        let height = version.height;
        let version = Arc::new(version);
        versions.by_height.insert(height, Arc::clone(&version));
        versions.latest = height;
        Ok(version)
    }

    fn load_at_height(&self, height: Height) -> Result<Arc<StateVersion>, StateError> {
        self.versions
            .read()
            .by_height
            .get(&height)
            .cloned()
            .ok_or(StateError::HeightNotFound { height })
    }

    fn latest_height(&self) -> Result<Height, StateError> {
        Ok(self.versions.read().latest)
    }

    fn prune(&self, retain_from: Height) -> Result<u64, StateError> {
        let mut versions = self.versions.write();
        let cutoff = retain_from.min(versions.latest);
        let before = versions.by_height.len();
        let kept = versions.by_height.split_off(&cutoff);
        versions.by_height = kept;
        let pruned = (before - versions.by_height.len()) as u64;

        if pruned > 0 {
            STATE_VERSIONS_PRUNED.inc_by(pruned as f64);
            log_height_event!(debug, "state-management", "Pruned state versions", cutoff, pruned = pruned);
        }
        Ok(pruned)
    }
}
