//! Reference chain fixture: one bonded validator and one funded account.

use chrono::{DateTime, Duration, TimeZone, Utc};
use shared_types::{AppState, BlockHeader, ConsensusParams, Height, PublicKey, Validator};
use std::sync::Arc;

use crate::adapters::InMemoryVersionStore;
use crate::domain::InitChainRequest;
use crate::modules::bank::{Balance, BankGenesis, Coin};
use crate::modules::gov::GovGenesis;
use crate::modules::staking::{StakingGenesis, StakingValidator};
use crate::modules::standard_registry;
use crate::ports::VersionStore;
use crate::service::ApplicationStateMachine;

pub const CHAIN_ID: &str = "theChainId";
pub const BOND_DENOM: &str = "stake";
pub const FUNDED_ACCOUNT: &str = "qc1funded";
pub const FUNDED_AMOUNT: u128 = 100_000_000_000_000;
pub const VALIDATOR_POWER: i64 = 10;

pub fn genesis_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .expect("valid fixture time")
}

/// Header for block `height`, five seconds after the previous one.
pub fn block_header(height: Height) -> BlockHeader {
    BlockHeader::new(
        CHAIN_ID,
        height,
        genesis_time() + Duration::seconds(5 * height as i64),
    )
}

pub fn validator_key(seed: u8) -> PublicKey {
    PublicKey::ed25519([seed; 32])
}

pub fn reference_validator() -> Validator {
    Validator::new(validator_key(1), VALIDATOR_POWER, "validator-1")
}

/// Genesis app state for the reference chain.
pub fn reference_app_state() -> AppState {
    let bank = BankGenesis {
        balances: vec![Balance {
            address: FUNDED_ACCOUNT.to_string(),
            coins: vec![Coin::new(BOND_DENOM, FUNDED_AMOUNT)],
        }],
        supply: vec![Coin::new(BOND_DENOM, FUNDED_AMOUNT)],
    };
    let staking = StakingGenesis {
        validators: vec![StakingValidator::bonded(
            validator_key(1),
            VALIDATOR_POWER,
            "validator-1",
        )],
        last_total_power: VALIDATOR_POWER,
        ..StakingGenesis::default()
    };

    let mut state = AppState::new();
    state.insert_json("bank", &bank).expect("bank fixture encodes");
    state.insert_json("staking", &staking).expect("staking fixture encodes");
    state.insert_json("gov", &GovGenesis::default()).expect("gov fixture encodes");
    state
}

pub fn reference_genesis() -> InitChainRequest {
    InitChainRequest {
        chain_id: CHAIN_ID.to_string(),
        time: genesis_time(),
        app_state: reference_app_state(),
        consensus_params: ConsensusParams::default(),
        validators: vec![reference_validator()],
    }
}

/// A reference chain running on an in-memory store.
pub struct ReferenceChain {
    pub machine: ApplicationStateMachine<InMemoryVersionStore>,
}

impl ReferenceChain {
    /// Initialized, with the genesis block committed at height 1.
    pub fn new() -> Self {
        Self::from_request(reference_genesis())
    }

    pub fn from_request(request: InitChainRequest) -> Self {
        let mut machine = ApplicationStateMachine::new(
            Arc::new(InMemoryVersionStore::new()),
            standard_registry(),
        );
        machine
            .init_chain(request)
            .unwrap_or_else(|e| panic!("reference genesis rejected: {e}"));
        machine
            .commit()
            .unwrap_or_else(|e| panic!("genesis commit failed: {e}"));
        Self { machine }
    }

    /// Committed up to and including `height`.
    pub fn with_blocks(height: Height) -> Self {
        let mut chain = Self::new();
        chain.advance_to(height);
        chain
    }

    pub fn advance_to(&mut self, height: Height) {
        while self.machine.last_height() < height {
            let next = self.machine.last_height() + 1;
            self.machine
                .begin_block(block_header(next))
                .unwrap_or_else(|e| panic!("begin_block({next}) failed: {e}"));
            self.machine
                .commit()
                .unwrap_or_else(|e| panic!("commit({next}) failed: {e}"));
        }
    }

    pub fn store(&self) -> Arc<InMemoryVersionStore> {
        Arc::clone(self.machine.store())
    }

    pub fn latest_height(&self) -> Height {
        self.machine.store().latest_height().unwrap_or_default()
    }
}

impl Default for ReferenceChain {
    fn default() -> Self {
        Self::new()
    }
}
