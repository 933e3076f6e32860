//! # State Modules
//!
//! Each module owns one entry of the `AppState` and is the only code that
//! interprets its bytes. The state machine and the export pipeline drive
//! modules through this trait without knowing their schemas.

use shared_types::{Address, BlockHeader, Validator};
use std::collections::BTreeSet;
use std::sync::Arc;

use super::errors::ModuleError;

/// One application module.
///
/// Implementations must be deterministic: the same bytes and header always
/// produce the same output bytes.
pub trait StateModule: Send + Sync {
    /// Key of this module inside the `AppState`.
    fn name(&self) -> &'static str;

    /// Compact JSON used when genesis omits this module.
    fn default_genesis(&self) -> Vec<u8>;

    /// Validate genesis bytes and report the validators they define.
    fn init_genesis(&self, state: &[u8]) -> Result<Vec<Validator>, ModuleError>;

    /// Apply begin-block logic. `None` leaves the bytes untouched.
    fn begin_block(
        &self,
        _state: &[u8],
        _header: &BlockHeader,
    ) -> Result<Option<Vec<u8>>, ModuleError> {
        Ok(None)
    }

    /// Normalize the module's state for a chain restarting at height 0.
    ///
    /// Must be idempotent. The default keeps the bytes as they are.
    fn rewrite_for_zero_height(
        &self,
        state: &[u8],
        _ctx: &mut ZeroHeightContext,
    ) -> Result<Vec<u8>, ModuleError> {
        Ok(state.to_vec())
    }
}

/// Ordered set of registered modules.
///
/// Registration order is the order modules run in, which is part of the
/// determinism contract.
#[derive(Clone, Default)]
pub struct ModuleRegistry {
    modules: Vec<Arc<dyn StateModule>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a module. A module with the same name replaces the old one in place.
    pub fn register(mut self, module: Arc<dyn StateModule>) -> Self {
        match self.modules.iter_mut().find(|m| m.name() == module.name()) {
            Some(existing) => *existing = module,
            None => self.modules.push(module),
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn StateModule>> {
        self.modules.iter().find(|m| m.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn StateModule>> {
        self.modules.iter()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.modules.iter().map(|m| m.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl std::fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Shared scratchpad for one zero-height rewrite pass.
///
/// Modules ask whether a validator is on the jail list (which records the
/// address as matched) and the module owning the bonded set reports it.
#[derive(Debug, Clone, Default)]
pub struct ZeroHeightContext {
    jail: BTreeSet<Address>,
    matched: BTreeSet<Address>,
    bonded: Option<Vec<Validator>>,
}

impl ZeroHeightContext {
    pub fn new(jail: impl IntoIterator<Item = Address>) -> Self {
        Self {
            jail: jail.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Whether `address` must be jailed. Marks the address as seen.
    pub fn is_jailed(&mut self, address: &Address) -> bool {
        if self.jail.contains(address) {
            self.matched.insert(*address);
            true
        } else {
            false
        }
    }

    /// Record that `address` names an existing validator without jailing it.
    pub fn mark_known(&mut self, address: &Address) {
        if self.jail.contains(address) {
            self.matched.insert(*address);
        }
    }

    pub fn jail_list(&self) -> &BTreeSet<Address> {
        &self.jail
    }

    /// Jail entries that matched no validator so far.
    pub fn unmatched(&self) -> impl Iterator<Item = &Address> {
        self.jail.difference(&self.matched)
    }

    /// Report the bonded validators after rewriting.
    pub fn set_bonded(&mut self, validators: Vec<Validator>) {
        self.bonded = Some(validators);
    }

    pub fn bonded(&self) -> Option<&[Validator]> {
        self.bonded.as_deref()
    }

    pub fn take_bonded(&mut self) -> Option<Vec<Validator>> {
        self.bonded.take()
    }
}
