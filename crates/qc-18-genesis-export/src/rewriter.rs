//! # Zero-Height Rewriter
//!
//! Turns a state captured at any height into a valid height-0 genesis state.
//! Every registered module normalizes its own entry through
//! `StateModule::rewrite_for_zero_height`; the rewriter never looks inside
//! module bytes.
//!
//! The rewrite works on an owned copy of the state and returns a new one, so
//! committed versions are never touched.

use qc_04_state_management::{ModuleRegistry, StateError, ZeroHeightContext};
use shared_types::{Address, AppState, ValidatorSet};

use crate::domain::ExportError;

/// Output of a rewrite pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewrittenState {
    pub app_state: AppState,
    pub validators: ValidatorSet,
}

pub struct ZeroHeightRewriter<'a> {
    registry: &'a ModuleRegistry,
}

impl<'a> ZeroHeightRewriter<'a> {
    pub fn new(registry: &'a ModuleRegistry) -> Self {
        Self { registry }
    }

    /// Rewrite `app_state` for height 0, jailing `jail_allowed_addrs`.
    ///
    /// Every jail address must name a validator, either in `validators` or in
    /// some module's own records.
    pub fn rewrite(
        &self,
        app_state: AppState,
        validators: &ValidatorSet,
        jail_allowed_addrs: &[String],
    ) -> Result<RewrittenState, ExportError> {
        let jail = parse_addresses(jail_allowed_addrs)?;
        let mut ctx = ZeroHeightContext::new(jail);
        for validator in validators {
            ctx.mark_known(&validator.address);
        }

        let mut rewritten = app_state;
        for module in self.registry.iter() {
            let Some(bytes) = rewritten.get(module.name()) else {
                continue;
            };
            let updated = module
                .rewrite_for_zero_height(bytes, &mut ctx)
                .map_err(|source| StateError::Module {
                    module: module.name().to_string(),
                    source,
                })?;
            rewritten.insert(module.name(), updated);
        }

        if let Some(address) = ctx.unmatched().next() {
            return Err(ExportError::InvalidJailAddress {
                address: address.to_string(),
                reason: "no validator with this address".to_string(),
            });
        }

        let bonded = match ctx.take_bonded() {
            Some(bonded) => bonded,
            None => validators
                .iter()
                .filter(|v| !ctx.jail_list().contains(&v.address))
                .cloned()
                .collect(),
        };
        if bonded.is_empty() {
            return Err(ExportError::ExportFailed(
                "zero-height export leaves no bonded validators".to_string(),
            ));
        }

        let validators =
            ValidatorSet::new(bonded).map_err(|e| ExportError::ExportFailed(e.to_string()))?;

        Ok(RewrittenState {
            app_state: rewritten,
            validators,
        })
    }
}

fn parse_addresses(raw: &[String]) -> Result<Vec<Address>, ExportError> {
    raw.iter()
        .map(|s| {
            s.parse::<Address>()
                .map_err(|e| ExportError::InvalidJailAddress {
                    address: s.clone(),
                    reason: e.to_string(),
                })
        })
        .collect()
}
