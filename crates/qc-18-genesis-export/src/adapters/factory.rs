//! Factories over a running application or a bare version store.

use parking_lot::Mutex;
use qc_04_state_management::{
    ApplicationStateMachine, ModuleRegistry, StateVersion, VersionStore,
};
use std::sync::Arc;

use crate::context::ServerContext;
use crate::domain::{ExportError, ExportHeight};
use crate::ports::{AppFactory, ExportableState};

/// A loaded version with the modules that interpret it.
#[derive(Debug, Clone)]
pub struct LoadedState {
    version: Arc<StateVersion>,
    registry: ModuleRegistry,
}

impl LoadedState {
    pub fn new(version: Arc<StateVersion>, registry: ModuleRegistry) -> Self {
        Self { version, registry }
    }
}

impl ExportableState for LoadedState {
    fn version(&self) -> &StateVersion {
        &self.version
    }

    fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }
}

/// Reads from a running state machine.
///
/// `Latest` copies the machine's working state, so it works before the first
/// commit and sees a block that is still in progress.
pub struct LiveAppFactory<S: VersionStore> {
    app: Arc<Mutex<ApplicationStateMachine<S>>>,
}

impl<S: VersionStore> LiveAppFactory<S> {
    pub fn new(app: Arc<Mutex<ApplicationStateMachine<S>>>) -> Self {
        Self { app }
    }
}

impl<S: VersionStore> AppFactory for LiveAppFactory<S> {
    type Handle = LoadedState;

    fn open(&self, _ctx: &ServerContext, height: ExportHeight) -> Result<LoadedState, ExportError> {
        let app = self.app.lock();
        let version = match height {
            ExportHeight::Latest => Arc::new(app.working_snapshot()?),
            ExportHeight::At(h) => app.store().load_at_height(h)?,
        };
        Ok(LoadedState::new(version, app.registry().clone()))
    }
}

/// Reads committed versions only, like a node reopened on its database.
///
/// Every `open` reopens a fresh state machine at the requested height.
pub struct StoreAppFactory<S: VersionStore> {
    store: Arc<S>,
    registry: ModuleRegistry,
}

impl<S: VersionStore> StoreAppFactory<S> {
    pub fn new(store: Arc<S>, registry: ModuleRegistry) -> Self {
        Self { store, registry }
    }
}

impl<S: VersionStore> AppFactory for StoreAppFactory<S> {
    type Handle = LoadedState;

    fn open(&self, _ctx: &ServerContext, height: ExportHeight) -> Result<LoadedState, ExportError> {
        let store = Arc::clone(&self.store);
        let registry = self.registry.clone();
        let app = match height {
            ExportHeight::Latest => ApplicationStateMachine::load_latest(store, registry)?,
            ExportHeight::At(h) => ApplicationStateMachine::load_height(store, registry, h)?,
        };
        if !app.is_initialized() {
            return Err(ExportError::ExportFailed(
                "no committed state to export".to_string(),
            ));
        }
        let version = Arc::new(app.working_snapshot()?);
        Ok(LoadedState::new(version, app.registry().clone()))
    }
}
