pub mod factory;

pub use factory::{LiveAppFactory, LoadedState, StoreAppFactory};
