use shared_types::Height;
use std::sync::Arc;

use crate::domain::{StateError, StateVersion};

/// Height-indexed store of immutable state versions.
///
/// Implementations must let readers run concurrently with each other and
/// must publish a commit atomically: a reader sees either the whole version
/// or none of it.
pub trait VersionStore: Send + Sync {
    /// Persist `version`. Fails with `HeightOrder` unless its height is above
    /// the last committed one.
    fn commit(&self, version: StateVersion) -> Result<Arc<StateVersion>, StateError>;

    /// Version committed at `height`, or `HeightNotFound`.
    fn load_at_height(&self, height: Height) -> Result<Arc<StateVersion>, StateError>;

    /// Last committed height; 0 when nothing has been committed.
    fn latest_height(&self) -> Result<Height, StateError>;

    /// Drop versions below `retain_from` and return how many were removed.
    /// The latest version is always kept.
    fn prune(&self, retain_from: Height) -> Result<u64, StateError>;

    fn load_latest(&self) -> Result<Option<Arc<StateVersion>>, StateError> {
        match self.latest_height()? {
            0 => Ok(None),
            height => self.load_at_height(height).map(Some),
        }
    }
}
