use shared_types::{GenesisError, Height};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("cannot commit height {height}: last committed height is {last}")]
    HeightOrder { height: Height, last: Height },

    #[error("no state committed at height {height}")]
    HeightNotFound { height: Height },

    #[error("chain is already initialized")]
    AlreadyInitialized,

    #[error("chain is not initialized")]
    NotInitialized,

    #[error("unexpected block height: expected {expected}, got {got}")]
    BlockHeightMismatch { expected: Height, got: Height },

    #[error("block header chain id {got:?} does not match {expected:?}")]
    ChainIdMismatch { expected: String, got: String },

    #[error("a block is already in progress")]
    BlockInProgress,

    #[error("commit without a preceding begin_block")]
    NoBlockInProgress,

    #[error("genesis produced an empty validator set")]
    NoValidators,

    #[error("invalid genesis: {0}")]
    InvalidGenesis(#[from] GenesisError),

    #[error("module {module}: {source}")]
    Module {
        module: String,
        #[source]
        source: ModuleError,
    },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Failure inside one state module.
#[derive(Debug, Error)]
pub enum ModuleError {
    #[error("malformed state: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("{0}")]
    Invalid(String),
}

impl ModuleError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }
}
