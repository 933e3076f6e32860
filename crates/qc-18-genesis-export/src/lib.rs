//! # qc-18-genesis-export
//!
//! Genesis Export subsystem for Quantum-Chain.
//!
//! ## Role in System
//!
//! Materializes the application state at a chosen height into a genesis
//! document, so a new chain can start from it without replaying history.
//!
//! ```text
//! [State Management (4)] ──load──→ [ExportEngine] ──→ [ZeroHeightRewriter]
//!                                        │                    │
//!                                        ↓                    ↓
//!                                  [ExportedApp] ←────────────┘
//!                                        │
//!                                        ↓
//!                           [GenesisCodec] ──→ genesis.json
//! ```
//!
//! ## Heights
//!
//! - Export at height `h` produces `initial_height = h + 1`
//! - `latest` reads the running application's working state
//! - A zero-height export always produces `initial_height = 0`

pub mod adapters;
pub mod codec;
pub mod command;
pub mod context;
pub mod domain;
pub mod engine;
pub mod ports;
pub mod rewriter;

pub use adapters::{LiveAppFactory, LoadedState, StoreAppFactory};
pub use codec::GenesisCodec;
pub use command::ExportCommand;
pub use context::ServerContext;
pub use domain::*;
pub use engine::{CancelSignal, ExportEngine};
pub use ports::{AppFactory, ExportableState};
pub use rewriter::{RewrittenState, ZeroHeightRewriter};
