//! # Staking Module
//!
//! Owns the validator records, the unbonding queue and the historical power
//! snapshots. It is the module that defines the consensus validator set.
//!
//! ## Zero-Height Rewrite
//!
//! - the unbonding queue is dropped and unbonding validators finish unbonding
//! - jail-listed validators are jailed and moved to `unbonded`
//! - historical snapshots are cleared and `last_total_power` recomputed
//! - the remaining bonded validators are reported as the new set

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr, DurationSeconds};
use shared_types::{Address, BlockHeader, Height, PublicKey, Validator};
use std::collections::BTreeSet;
use std::time::Duration;

use crate::domain::{ModuleError, StateModule, ZeroHeightContext};

pub const MODULE_NAME: &str = "staking";

/// Default number of historical snapshots kept.
pub const DEFAULT_HISTORICAL_ENTRIES: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BondStatus {
    Bonded,
    Unbonding,
    Unbonded,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingValidator {
    pub address: Address,
    pub pub_key: PublicKey,
    #[serde_as(as = "DisplayFromStr")]
    pub power: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub jailed: bool,
    pub status: BondStatus,
    #[serde_as(as = "DisplayFromStr")]
    #[serde(default)]
    pub unbonding_height: Height,
    #[serde(default)]
    pub unbonding_time: Option<DateTime<Utc>>,
}

impl StakingValidator {
    /// A bonded, unjailed validator with its address derived from `pub_key`.
    pub fn bonded(pub_key: PublicKey, power: i64, name: impl Into<String>) -> Self {
        Self {
            address: pub_key.address(),
            pub_key,
            power,
            name: name.into(),
            jailed: false,
            status: BondStatus::Bonded,
            unbonding_height: 0,
            unbonding_time: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == BondStatus::Bonded && !self.jailed && self.power > 0
    }

    fn to_validator(&self) -> Validator {
        Validator {
            address: self.address,
            pub_key: self.pub_key.clone(),
            power: self.power,
            name: self.name.clone(),
        }
    }
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnbondingEntry {
    pub validator_address: Address,
    pub delegator: String,
    #[serde_as(as = "DisplayFromStr")]
    pub amount: u128,
    #[serde_as(as = "DisplayFromStr")]
    pub creation_height: Height,
    pub completion_time: DateTime<Utc>,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalPower {
    pub address: Address,
    #[serde_as(as = "DisplayFromStr")]
    pub power: i64,
}

/// Bonded powers as they stood at one height.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalInfo {
    #[serde_as(as = "DisplayFromStr")]
    pub height: Height,
    pub validators: Vec<HistoricalPower>,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingParams {
    #[serde_as(as = "DurationSeconds<u64>")]
    pub unbonding_time: Duration,
    pub historical_entries: u32,
}

impl Default for StakingParams {
    fn default() -> Self {
        Self {
            unbonding_time: Duration::from_secs(21 * 24 * 60 * 60),
            historical_entries: DEFAULT_HISTORICAL_ENTRIES,
        }
    }
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingGenesis {
    #[serde(default)]
    pub params: StakingParams,
    #[serde_as(as = "DisplayFromStr")]
    #[serde(default)]
    pub last_total_power: i64,
    #[serde(default)]
    pub validators: Vec<StakingValidator>,
    #[serde(default)]
    pub unbonding_queue: Vec<UnbondingEntry>,
    #[serde(default)]
    pub historical_info: Vec<HistoricalInfo>,
}

impl StakingGenesis {
    pub fn active_validators(&self) -> impl Iterator<Item = &StakingValidator> {
        self.validators.iter().filter(|v| v.is_active())
    }

    pub fn active_power(&self) -> Result<i64, ModuleError> {
        self.active_validators().try_fold(0i64, |total, v| {
            total
                .checked_add(v.power)
                .ok_or_else(|| ModuleError::invalid("total power overflows"))
        })
    }

    pub fn validate(&self) -> Result<(), ModuleError> {
        let mut seen = BTreeSet::new();
        for v in &self.validators {
            if !seen.insert(v.address) {
                return Err(ModuleError::invalid(format!(
                    "duplicate staking validator {}",
                    v.address
                )));
            }
            if v.address != v.pub_key.address() {
                return Err(ModuleError::invalid(format!(
                    "validator {} address does not match its public key",
                    v.address
                )));
            }
            if v.power < 0 {
                return Err(ModuleError::invalid(format!(
                    "validator {} has negative power {}",
                    v.address, v.power
                )));
            }
            if v.status == BondStatus::Bonded && !v.jailed && v.power == 0 {
                return Err(ModuleError::invalid(format!(
                    "bonded validator {} has zero power",
                    v.address
                )));
            }
        }

        let active_power = self.active_power()?;
        if self.last_total_power != 0 && self.last_total_power != active_power {
            return Err(ModuleError::invalid(format!(
                "last_total_power {} does not match bonded power {}",
                self.last_total_power, active_power
            )));
        }

        Ok(())
    }

    fn snapshot(&self, height: Height) -> HistoricalInfo {
        HistoricalInfo {
            height,
            validators: self
                .active_validators()
                .map(|v| HistoricalPower {
                    address: v.address,
                    power: v.power,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Default)]
pub struct StakingModule;

impl StateModule for StakingModule {
    fn name(&self) -> &'static str {
        MODULE_NAME
    }

    fn default_genesis(&self) -> Vec<u8> {
        // Serializing a plain struct into a Vec cannot fail.
        serde_json::to_vec(&StakingGenesis::default()).unwrap_or_default()
    }

    fn init_genesis(&self, state: &[u8]) -> Result<Vec<Validator>, ModuleError> {
        let genesis: StakingGenesis = serde_json::from_slice(state)?;
        genesis.validate()?;
        Ok(genesis
            .active_validators()
            .map(StakingValidator::to_validator)
            .collect())
    }

    fn begin_block(
        &self,
        state: &[u8],
        header: &BlockHeader,
    ) -> Result<Option<Vec<u8>>, ModuleError> {
        let mut genesis: StakingGenesis = serde_json::from_slice(state)?;
        let mut changed = false;

        let queued = genesis.unbonding_queue.len();
        genesis
            .unbonding_queue
            .retain(|entry| entry.completion_time > header.time);
        changed |= genesis.unbonding_queue.len() != queued;

        for v in &mut genesis.validators {
            let matured = v.status == BondStatus::Unbonding
                && v.unbonding_time.is_some_and(|t| t <= header.time);
            if matured {
                v.status = BondStatus::Unbonded;
                changed = true;
            }
        }

        let keep = genesis.params.historical_entries as usize;
        if keep > 0 {
            let info = genesis.snapshot(header.height);
            genesis.historical_info.push(info);
            let excess = genesis.historical_info.len().saturating_sub(keep);
            genesis.historical_info.drain(..excess);
            changed = true;
        }

        if !changed {
            return Ok(None);
        }
        Ok(Some(serde_json::to_vec(&genesis)?))
    }

    fn rewrite_for_zero_height(
        &self,
        state: &[u8],
        ctx: &mut ZeroHeightContext,
    ) -> Result<Vec<u8>, ModuleError> {
        let mut genesis: StakingGenesis = serde_json::from_slice(state)?;

        genesis.unbonding_queue.clear();
        genesis.historical_info.clear();

        for v in &mut genesis.validators {
            if ctx.is_jailed(&v.address) {
                v.jailed = true;
                v.status = BondStatus::Unbonded;
            }
            if v.status == BondStatus::Unbonding {
                v.status = BondStatus::Unbonded;
            }
            v.unbonding_height = 0;
            v.unbonding_time = None;
        }

        genesis.last_total_power = genesis.active_power()?;
        ctx.set_bonded(
            genesis
                .active_validators()
                .map(StakingValidator::to_validator)
                .collect(),
        );

        Ok(serde_json::to_vec(&genesis)?)
    }
}
