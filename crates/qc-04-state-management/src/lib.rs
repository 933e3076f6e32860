//! # qc-04-state-management
//!
//! State Management subsystem for Quantum-Chain.
//!
//! ## Role in System
//!
//! - **Versioned Store**: every committed height is an immutable
//!   `StateVersion`, readable concurrently while new heights are committed
//! - **Block Lifecycle**: `ApplicationStateMachine` drives registered modules
//!   through `init_chain`, `begin_block` and `commit`
//! - **Module Boundary**: the application state is a sequence of
//!   `(module, bytes)` pairs and only the owning `StateModule` reads its bytes
//!
//! ## Flow
//!
//! ```text
//! [InitChain] ──→ [ApplicationStateMachine] ──commit──→ [VersionStore]
//!                         ↑                                  │
//!                   begin_block(h)                   load_at_height(h)
//!                                                            ↓
//!                                                 [Genesis Export (18)]
//! ```

pub mod adapters;
pub mod domain;
pub mod modules;
pub mod ports;
pub mod service;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use adapters::*;
pub use domain::*;
pub use modules::standard_registry;
pub use ports::*;
pub use service::ApplicationStateMachine;
