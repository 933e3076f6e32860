//! Governance proposals with a height-bounded voting period.

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};
use shared_types::{BlockHeader, Height, Validator};
use std::collections::BTreeSet;

use crate::domain::{ModuleError, StateModule, ZeroHeightContext};

pub const MODULE_NAME: &str = "gov";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    VotingPeriod,
    Passed,
    Rejected,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    #[serde_as(as = "DisplayFromStr")]
    pub id: u64,
    pub title: String,
    pub status: ProposalStatus,
    #[serde_as(as = "DisplayFromStr")]
    pub voting_end_height: Height,
    #[serde_as(as = "DisplayFromStr")]
    #[serde(default)]
    pub yes: u128,
    #[serde_as(as = "DisplayFromStr")]
    #[serde(default)]
    pub no: u128,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovGenesis {
    #[serde(default)]
    pub proposals: Vec<Proposal>,
}

#[derive(Debug, Default)]
pub struct GovModule;

impl StateModule for GovModule {
    fn name(&self) -> &'static str {
        MODULE_NAME
    }

    fn default_genesis(&self) -> Vec<u8> {
        br#"{"proposals":[]}"#.to_vec()
    }

    fn init_genesis(&self, state: &[u8]) -> Result<Vec<Validator>, ModuleError> {
        let genesis: GovGenesis = serde_json::from_slice(state)?;
        let mut ids = BTreeSet::new();
        for proposal in &genesis.proposals {
            if !ids.insert(proposal.id) {
                return Err(ModuleError::invalid(format!(
                    "duplicate proposal id {}",
                    proposal.id
                )));
            }
        }
        Ok(Vec::new())
    }

    /// Tally every proposal whose voting period ended at or before this block.
    fn begin_block(
        &self,
        state: &[u8],
        header: &BlockHeader,
    ) -> Result<Option<Vec<u8>>, ModuleError> {
        let mut genesis: GovGenesis = serde_json::from_slice(state)?;
        let mut changed = false;

        for proposal in &mut genesis.proposals {
            if proposal.status == ProposalStatus::VotingPeriod
                && proposal.voting_end_height <= header.height
            {
                proposal.status = if proposal.yes > proposal.no {
                    ProposalStatus::Passed
                } else {
                    ProposalStatus::Rejected
                };
                changed = true;
            }
        }

        if !changed {
            return Ok(None);
        }
        Ok(Some(serde_json::to_vec(&genesis)?))
    }

    /// Drops proposals still in their voting period.
    fn rewrite_for_zero_height(
        &self,
        state: &[u8],
        _ctx: &mut ZeroHeightContext,
    ) -> Result<Vec<u8>, ModuleError> {
        let mut genesis: GovGenesis = serde_json::from_slice(state)?;
        genesis
            .proposals
            .retain(|p| p.status != ProposalStatus::VotingPeriod);
        Ok(serde_json::to_vec(&genesis)?)
    }
}
