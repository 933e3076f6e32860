use qc_04_state_management::StateError;
use quantum_telemetry::TelemetryError;
use shared_types::{ConsensusParamsError, Height};
use thiserror::Error;

use super::phase::ExportPhase;

/// Missing or unreadable node configuration. Messages are surfaced verbatim.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("stat {path}: no such file or directory")]
    MissingFile { path: String },

    #[error("read {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("home directory not set: define QC_HOME or HOME")]
    MissingHome,

    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("no state committed at height {height}")]
    HeightNotFound { height: Height },

    #[error("invalid jail address {address:?}: {reason}")]
    InvalidJailAddress { address: String, reason: String },

    #[error("invalid consensus params: {0}")]
    InvalidConsensusParams(#[from] ConsensusParamsError),

    #[error("{context}: {source}")]
    Serialization {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("export failed: {0}")]
    ExportFailed(String),

    #[error("export cancelled during {phase}")]
    Cancelled { phase: ExportPhase },

    #[error(transparent)]
    State(StateError),
}

impl ExportError {
    pub fn serialization(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            context: context.into(),
            source,
        }
    }

    /// Label used for the `outcome` metric.
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::Cancelled { .. } => "cancelled",
            _ => "failed",
        }
    }
}

impl From<StateError> for ExportError {
    fn from(err: StateError) -> Self {
        match err {
            StateError::HeightNotFound { height } => Self::HeightNotFound { height },
            other => Self::State(other),
        }
    }
}
