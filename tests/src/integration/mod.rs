//! # Integration Test Flows
//!
//! - `export_flows`: export from a running chain, restart from the result
//! - `concurrency`: readers and exports racing commits

pub mod concurrency;
pub mod export_flows;
