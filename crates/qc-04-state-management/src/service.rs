//! # Application State Machine
//!
//! Advances the application state one height at a time through
//! `init_chain`, `begin_block` and `commit`, persisting each committed
//! height into a `VersionStore`.
//!
//! ## Lifecycle
//!
//! ```text
//! init_chain ──→ commit (height 1)
//!                  │
//!                  ↓
//!          begin_block(h) ──→ commit (height h) ──→ begin_block(h + 1) ...
//! ```
//!
//! The working state is private to the machine. A failed step leaves it as
//! it was before the call.

use chrono::{DateTime, Utc};
use quantum_telemetry::{log_event, log_height_event, STATE_COMMITS, STATE_LATEST_HEIGHT};
use shared_types::{
    AppState, BlockHeader, ConsensusParams, GenesisError, Height, ValidatorSet,
};
use std::sync::Arc;

use crate::domain::{
    CommitInfo, InitChainRequest, ModuleRegistry, StateError, StateVersion,
};
use crate::ports::VersionStore;

const SUBSYSTEM: &str = "state-management";

/// Uncommitted state the next commit will persist.
#[derive(Debug, Clone)]
struct WorkingState {
    chain_id: String,
    time: DateTime<Utc>,
    app_state: AppState,
    consensus_params: ConsensusParams,
    validators: ValidatorSet,
}

impl WorkingState {
    fn from_version(version: &StateVersion) -> Self {
        Self {
            chain_id: version.chain_id.clone(),
            time: version.time,
            app_state: version.app_state.clone(),
            consensus_params: version.consensus_params.clone(),
            validators: version.validators.clone(),
        }
    }

    fn to_version(&self, height: Height) -> StateVersion {
        StateVersion {
            height,
            chain_id: self.chain_id.clone(),
            time: self.time,
            app_state: self.app_state.clone(),
            consensus_params: self.consensus_params.clone(),
            validators: self.validators.clone(),
        }
    }
}

/// The deterministic block lifecycle over a version store.
pub struct ApplicationStateMachine<S: VersionStore> {
    store: Arc<S>,
    registry: ModuleRegistry,
    working: Option<WorkingState>,
    last_height: Height,
    block_in_progress: Option<Height>,
}

impl<S: VersionStore> ApplicationStateMachine<S> {
    /// A fresh machine waiting for `init_chain`.
    pub fn new(store: Arc<S>, registry: ModuleRegistry) -> Self {
        Self {
            store,
            registry,
            working: None,
            last_height: 0,
            block_in_progress: None,
        }
    }

    /// Reopen on the latest committed version, or start fresh when the store
    /// is empty.
    pub fn load_latest(store: Arc<S>, registry: ModuleRegistry) -> Result<Self, StateError> {
        match store.load_latest()? {
            Some(version) => Ok(Self::resume(store, registry, &version)),
            None => Ok(Self::new(store, registry)),
        }
    }

    /// Reopen on the version committed at `height`.
    pub fn load_height(
        store: Arc<S>,
        registry: ModuleRegistry,
        height: Height,
    ) -> Result<Self, StateError> {
        let version = store.load_at_height(height)?;
        Ok(Self::resume(store, registry, &version))
    }

    fn resume(store: Arc<S>, registry: ModuleRegistry, version: &StateVersion) -> Self {
        log_height_event!(info, SUBSYSTEM, "Loaded committed state", version.height);
        Self {
            store,
            registry,
            working: Some(WorkingState::from_version(version)),
            last_height: version.height,
            block_in_progress: None,
        }
    }

    /// Set the height-0 state from genesis.
    ///
    /// Modules missing from `app_state` get their default genesis; modules
    /// nobody registered pass through untouched.
    pub fn init_chain(&mut self, request: InitChainRequest) -> Result<(), StateError> {
        if self.working.is_some() || self.store.latest_height()? > 0 {
            return Err(StateError::AlreadyInitialized);
        }

        request
            .consensus_params
            .validate()
            .map_err(GenesisError::from)?;

        let mut app_state = request.app_state;
        for module in self.registry.iter() {
            if !app_state.contains(module.name()) {
                app_state.insert(module.name(), module.default_genesis());
            }
        }

        let mut module_validators = Vec::new();
        for module in self.registry.iter() {
            let bytes = app_state.get(module.name()).unwrap_or_default();
            let reported = module
                .init_genesis(bytes)
                .map_err(|source| StateError::Module {
                    module: module.name().to_string(),
                    source,
                })?;
            module_validators.extend(reported);
        }

        let validators = if request.validators.is_empty() {
            module_validators
        } else {
            request.validators
        };
        if validators.is_empty() {
            return Err(StateError::NoValidators);
        }
        let validators = ValidatorSet::new(validators).map_err(GenesisError::from)?;

        log_event!(
            info,
            SUBSYSTEM,
            "Chain initialized",
            chain_id = %request.chain_id,
            modules = app_state.len(),
            validators = validators.len()
        );

        self.working = Some(WorkingState {
            chain_id: request.chain_id,
            time: request.time,
            app_state,
            consensus_params: request.consensus_params,
            validators,
        });
        Ok(())
    }

    /// Start block `header.height`, which must be the next height.
    pub fn begin_block(&mut self, header: BlockHeader) -> Result<(), StateError> {
        let working = self.working.as_mut().ok_or(StateError::NotInitialized)?;
        if self.block_in_progress.is_some() {
            return Err(StateError::BlockInProgress);
        }

        let expected = self.last_height + 1;
        if header.height != expected {
            return Err(StateError::BlockHeightMismatch {
                expected,
                got: header.height,
            });
        }
        if header.chain_id != working.chain_id {
            return Err(StateError::ChainIdMismatch {
                expected: working.chain_id.clone(),
                got: header.chain_id,
            });
        }

        let mut next = working.app_state.clone();
        for module in self.registry.iter() {
            let Some(bytes) = next.get(module.name()) else {
                continue;
            };
            let updated = module
                .begin_block(bytes, &header)
                .map_err(|source| StateError::Module {
                    module: module.name().to_string(),
                    source,
                })?;
            if let Some(updated) = updated {
                next.insert(module.name(), updated);
            }
        }

        working.app_state = next;
        working.time = header.time;
        self.block_in_progress = Some(header.height);
        log_height_event!(debug, SUBSYSTEM, "Block started", header.height);
        Ok(())
    }

    /// Persist the working state as the next height.
    ///
    /// Right after `init_chain` this commits height 1 without a `begin_block`.
    pub fn commit(&mut self) -> Result<CommitInfo, StateError> {
        let working = self.working.as_ref().ok_or(StateError::NotInitialized)?;
        let height = self.last_height + 1;
        if self.block_in_progress.is_none() && self.last_height > 0 {
            return Err(StateError::NoBlockInProgress);
        }

        let committed = self.store.commit(working.to_version(height))?;
        let app_hash = committed.app_hash();

        self.last_height = height;
        self.block_in_progress = None;

        STATE_COMMITS.inc();
        STATE_LATEST_HEIGHT.set(height as f64);
        log_height_event!(
            info,
            SUBSYSTEM,
            "Committed state version",
            height,
            app_hash = %hex::encode(app_hash)
        );

        Ok(CommitInfo { height, app_hash })
    }

    /// The live state, including changes of a block not yet committed.
    ///
    /// The returned version carries the last committed height.
    pub fn working_snapshot(&self) -> Result<StateVersion, StateError> {
        self.working
            .as_ref()
            .map(|w| w.to_version(self.last_height))
            .ok_or(StateError::NotInitialized)
    }

    pub fn last_height(&self) -> Height {
        self.last_height
    }

    pub fn is_initialized(&self) -> bool {
        self.working.is_some()
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }
}
