//! # Quantum-Chain Test Suite
//!
//! Cross-crate tests for the state export pipeline.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/          # Criterion benchmarks (commit, load, export)
//! └── src/integration/  # State machine → store → export flows
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p qc-tests
//!
//! # Benchmarks
//! cargo bench -p qc-tests
//! ```

#![allow(unused_imports)]
#![allow(dead_code)]

pub mod integration;
