//! # Error Types
//!
//! Validation errors for the shared chain types.

use thiserror::Error;

use crate::entities::Address;

/// Errors raised when parsing a validator address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("invalid address {input:?}: {reason}")]
    InvalidHex { input: String, reason: String },

    #[error("invalid address length: expected 20 bytes, got {0}")]
    InvalidLength(usize),
}

/// Consensus parameters outside their allowed bounds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsensusParamsError {
    /// Numeric limits must be >= -1, where -1 means unlimited.
    #[error("consensus param {field} must be >= -1, got {value}")]
    BelowMinimum { field: &'static str, value: i64 },

    #[error("consensus param {field} must be > 0, got {value}")]
    NonPositive { field: &'static str, value: i64 },

    #[error("consensus param validator.pub_key_types must not be empty")]
    NoPubKeyTypes,
}

/// Violations of the validator set invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidatorSetError {
    #[error("validator {address} has non-positive power {power}")]
    NonPositivePower { address: Address, power: i64 },

    #[error("duplicate validator address {address}")]
    DuplicateAddress { address: Address },

    #[error("total validator power overflows")]
    TotalPowerOverflow,
}

/// Violations of the application state container rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppStateError {
    #[error("duplicate module {0:?} in app state")]
    DuplicateModule(String),
}

/// A genesis document that cannot start a chain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenesisError {
    #[error("genesis doc must include a non-empty chain_id")]
    EmptyChainId,

    #[error("chain_id in genesis doc is too long (max: {max}, got: {len})")]
    ChainIdTooLong { len: usize, max: usize },

    #[error(transparent)]
    ConsensusParams(#[from] ConsensusParamsError),

    #[error(transparent)]
    ValidatorSet(#[from] ValidatorSetError),
}
