use qc_04_state_management::{ModuleRegistry, StateVersion};

use crate::context::ServerContext;
use crate::domain::{ExportError, ExportHeight};

/// A ready-to-read application state.
pub trait ExportableState {
    /// The state to export. Its height is the height that was read.
    fn version(&self) -> &StateVersion;

    /// Modules that own the entries of the state.
    fn registry(&self) -> &ModuleRegistry;
}

/// Builds a fresh application handle for one export call.
pub trait AppFactory {
    type Handle: ExportableState;

    fn open(&self, ctx: &ServerContext, height: ExportHeight) -> Result<Self::Handle, ExportError>;
}
