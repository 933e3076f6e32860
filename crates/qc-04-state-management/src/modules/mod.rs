//! Built-in state modules.

pub mod bank;
pub mod gov;
pub mod staking;

use std::sync::Arc;

use crate::domain::ModuleRegistry;

pub use bank::BankModule;
pub use gov::GovModule;
pub use staking::StakingModule;

/// Registry with the built-in modules in their execution order.
pub fn standard_registry() -> ModuleRegistry {
    ModuleRegistry::new()
        .register(Arc::new(BankModule))
        .register(Arc::new(StakingModule))
        .register(Arc::new(GovModule))
}
