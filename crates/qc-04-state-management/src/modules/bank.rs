//! Account balances and total supply.

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};
use shared_types::Validator;
use std::collections::{BTreeMap, BTreeSet};

use crate::domain::{ModuleError, StateModule};

pub const MODULE_NAME: &str = "bank";

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    #[serde_as(as = "DisplayFromStr")]
    pub amount: u128,
}

impl Coin {
    pub fn new(denom: impl Into<String>, amount: u128) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub address: String,
    pub coins: Vec<Coin>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankGenesis {
    #[serde(default)]
    pub balances: Vec<Balance>,
    /// When empty, genesis accepts whatever the balances add up to.
    #[serde(default)]
    pub supply: Vec<Coin>,
}

impl BankGenesis {
    /// Sum of all balances per denomination.
    pub fn computed_supply(&self) -> Result<Vec<Coin>, ModuleError> {
        let mut totals: BTreeMap<&str, u128> = BTreeMap::new();
        for balance in &self.balances {
            for coin in &balance.coins {
                let total = totals.entry(coin.denom.as_str()).or_default();
                *total = total.checked_add(coin.amount).ok_or_else(|| {
                    ModuleError::invalid(format!("supply of {} overflows", coin.denom))
                })?;
            }
        }
        Ok(totals
            .into_iter()
            .map(|(denom, amount)| Coin::new(denom, amount))
            .collect())
    }

    pub fn validate(&self) -> Result<(), ModuleError> {
        let mut addresses = BTreeSet::new();
        for balance in &self.balances {
            if balance.address.is_empty() {
                return Err(ModuleError::invalid("balance with empty address"));
            }
            if !addresses.insert(balance.address.as_str()) {
                return Err(ModuleError::invalid(format!(
                    "duplicate balance for address {}",
                    balance.address
                )));
            }

            let mut denoms = BTreeSet::new();
            for coin in &balance.coins {
                if coin.denom.is_empty() {
                    return Err(ModuleError::invalid(format!(
                        "empty denom in balance of {}",
                        balance.address
                    )));
                }
                if !denoms.insert(coin.denom.as_str()) {
                    return Err(ModuleError::invalid(format!(
                        "duplicate denom {} in balance of {}",
                        coin.denom, balance.address
                    )));
                }
            }
        }

        if !self.supply.is_empty() {
            let mut declared = self.supply.clone();
            declared.sort_by(|a, b| a.denom.cmp(&b.denom));
            let computed = self.computed_supply()?;
            if declared != computed {
                return Err(ModuleError::invalid(
                    "declared supply does not match the sum of balances",
                ));
            }
        }

        Ok(())
    }
}

/// Bank module. Balances carry no height-dependent data, so the zero-height
/// rewrite keeps them as they are.
#[derive(Debug, Default)]
pub struct BankModule;

impl StateModule for BankModule {
    fn name(&self) -> &'static str {
        MODULE_NAME
    }

    fn default_genesis(&self) -> Vec<u8> {
        br#"{"balances":[],"supply":[]}"#.to_vec()
    }

    fn init_genesis(&self, state: &[u8]) -> Result<Vec<Validator>, ModuleError> {
        let genesis: BankGenesis = serde_json::from_slice(state)?;
        genesis.validate()?;
        Ok(Vec::new())
    }
}
