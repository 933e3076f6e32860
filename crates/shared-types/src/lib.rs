//! # Shared Types Crate
//!
//! Chain-level types shared by the state machine (qc-04) and the genesis
//! export pipeline (qc-18).
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: heights, validators, consensus parameters,
//!   application state and the genesis document are defined once, here.
//! - **Opaque Module State**: `AppState` is a sequence of
//!   `(module_name, bytes)` pairs; only the owning module interprets its bytes.
//! - **Tendermint JSON**: the serde layout matches the genesis file format
//!   external tooling already reads.

pub mod app_state;
pub mod consensus;
pub mod entities;
pub mod errors;
pub mod genesis;

pub use app_state::{AppState, ModuleState};
pub use consensus::{
    BlockParams, ConsensusParams, EvidenceParams, ValidatorParams, DEFAULT_TIME_IOTA_MS, UNLIMITED,
};
pub use entities::*;
pub use errors::*;
pub use genesis::{ExportedApp, GenesisDoc, MAX_CHAIN_ID_LEN};
