//! # Domain Entities for State Management
//!
//! A `StateVersion` is everything the chain knows at one committed height.
//! Versions are immutable once committed; stores hand them out behind `Arc`
//! so concurrent readers share one allocation.

use chrono::{DateTime, Utc};
use shared_types::{AppState, ConsensusParams, Hash, Height, Validator, ValidatorSet};

/// Immutable state at one height.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateVersion {
    pub height: Height,
    pub chain_id: String,
    /// Time of the block that produced this version (genesis time at height 0).
    pub time: DateTime<Utc>,
    pub app_state: AppState,
    pub consensus_params: ConsensusParams,
    pub validators: ValidatorSet,
}

impl StateVersion {
    /// Digest of the application state, reported as the app hash.
    pub fn app_hash(&self) -> Hash {
        self.app_state.digest()
    }
}

/// Input to `ApplicationStateMachine::init_chain`.
#[derive(Debug, Clone)]
pub struct InitChainRequest {
    pub chain_id: String,
    pub time: DateTime<Utc>,
    pub app_state: AppState,
    pub consensus_params: ConsensusParams,
    /// When empty, the validators reported by the modules' genesis are used.
    pub validators: Vec<Validator>,
}

/// Outcome of a successful commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitInfo {
    pub height: Height,
    pub app_hash: Hash,
}
