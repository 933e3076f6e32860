//! End-to-end tests of the export command against a reference chain.

use parking_lot::Mutex;
use qc_04_state_management::test_utils::{
    genesis_time, reference_app_state, reference_genesis, reference_validator, ReferenceChain,
    CHAIN_ID,
};
use qc_04_state_management::{InMemoryVersionStore, VersionStore};
use qc_18_genesis_export::{
    CancelSignal, ExportCommand, ExportError, ExportHeight, ExportPhase, ExportRequest,
    GenesisCodec, LiveAppFactory, ServerContext,
};
use shared_types::{ConsensusParams, GenesisDoc, ValidatorSet};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

struct Setup {
    home: TempDir,
    chain: ReferenceChain,
}

/// Block time increment written to the node's genesis file, distinct from the
/// application's own default.
const NODE_TIME_IOTA_MS: i64 = 5000;

/// A home directory holding `config/genesis.json` and a chain committed at
/// height 1. The chain starts with no validators in `InitChain`, so the set
/// comes from the staking genesis.
fn setup_app() -> Setup {
    let home = TempDir::new().unwrap();
    fs::create_dir(home.path().join("config")).unwrap();

    let mut consensus_params = ConsensusParams::default();
    consensus_params.block.time_iota_ms = NODE_TIME_IOTA_MS;
    let genesis = GenesisDoc {
        chain_id: CHAIN_ID.to_string(),
        genesis_time: genesis_time(),
        initial_height: 1,
        consensus_params,
        validators: ValidatorSet::empty(),
        app_state: reference_app_state(),
    };
    let ctx = ServerContext::new(home.path());
    GenesisCodec::write_file(&ctx.genesis_file(), &genesis).unwrap();

    let mut request = reference_genesis();
    request.validators.clear();

    Setup {
        home,
        chain: ReferenceChain::from_request(request),
    }
}

fn command(setup: Setup) -> (TempDir, ExportCommand<LiveAppFactory<InMemoryVersionStore>>) {
    let ctx = ServerContext::new(setup.home.path());
    let factory = LiveAppFactory::new(Arc::new(Mutex::new(setup.chain.machine)));
    (setup.home, ExportCommand::new(ctx, factory))
}

fn run(setup: Setup, request: ExportRequest) -> GenesisDoc {
    let (_home, mut cmd) = command(setup);
    let mut output = Vec::new();
    cmd.execute(&request, &mut output).unwrap();
    GenesisCodec::decode(&output).unwrap()
}

#[test]
fn test_export_cmd_consensus_params() {
    let exported = run(setup_app(), ExportRequest::latest());
    let defaults = ConsensusParams::default();

    assert_eq!(exported.consensus_params.block.max_bytes, defaults.block.max_bytes);
    assert_eq!(exported.consensus_params.block.max_gas, defaults.block.max_gas);
    assert_eq!(
        exported.consensus_params.evidence.max_age_duration,
        defaults.evidence.max_age_duration
    );
    assert_eq!(
        exported.consensus_params.evidence.max_age_num_blocks,
        defaults.evidence.max_age_num_blocks
    );
    assert_eq!(
        exported.consensus_params.validator.pub_key_types,
        defaults.validator.pub_key_types
    );
    assert_eq!(exported.consensus_params.block.time_iota_ms, NODE_TIME_IOTA_MS);
}

#[test]
fn test_export_validators_come_from_staking_genesis() {
    let setup = setup_app();
    let committed = setup.chain.store().load_at_height(1).unwrap();
    assert_eq!(
        committed.validators,
        ValidatorSet::new(vec![reference_validator()]).unwrap()
    );

    let exported = run(setup, ExportRequest::latest().for_zero_height());
    assert_eq!(
        exported.validators,
        ValidatorSet::new(vec![reference_validator()]).unwrap()
    );
}

#[test]
fn test_export_cmd_home_dir() {
    let setup = setup_app();
    let factory = LiveAppFactory::new(Arc::new(Mutex::new(setup.chain.machine)));
    let mut cmd = ExportCommand::new(ServerContext::new("foobar"), factory);

    let mut output = Vec::new();
    let err = cmd.execute(&ExportRequest::latest(), &mut output).unwrap_err();

    assert_eq!(
        err.to_string(),
        "stat foobar/config/genesis.json: no such file or directory"
    );
    assert!(output.is_empty());
}

#[test]
fn test_export_cmd_height() {
    struct Case {
        name: &'static str,
        request: ExportRequest,
        fast_forward: u64,
        exp_height: u64,
    }

    let cases = [
        Case {
            name: "should export correct height",
            request: ExportRequest::latest(),
            fast_forward: 5,
            exp_height: 6,
        },
        Case {
            name: "should export correct height with --height",
            request: ExportRequest::new(ExportHeight::from_flag(3).unwrap()),
            fast_forward: 5,
            exp_height: 4,
        },
        Case {
            name: "should export height 0 with --for-zero-height",
            request: ExportRequest::latest().for_zero_height(),
            fast_forward: 2,
            exp_height: 0,
        },
    ];

    for case in cases {
        let mut setup = setup_app();
        setup.chain.advance_to(case.fast_forward);
        assert_eq!(setup.chain.latest_height(), case.fast_forward, "{}", case.name);

        let exported = run(setup, case.request);
        assert_eq!(exported.initial_height, case.exp_height, "{}", case.name);
    }
}

#[test]
fn test_export_keeps_chain_identity_from_genesis_file() {
    let mut setup = setup_app();
    setup.chain.advance_to(3);

    let exported = run(setup, ExportRequest::latest());
    assert_eq!(exported.chain_id, CHAIN_ID);
    assert_eq!(exported.genesis_time, genesis_time());
    assert_eq!(
        exported.validators,
        ValidatorSet::new(vec![reference_validator()]).unwrap()
    );
}

#[test]
fn test_zero_height_with_unknown_jail_address_writes_nothing() {
    let (_home, mut cmd) = command(setup_app());
    let request = ExportRequest::latest()
        .for_zero_height()
        .with_jail(["00112233445566778899AABBCCDDEEFF00112233"]);

    let mut output = Vec::new();
    let err = cmd.execute(&request, &mut output).unwrap_err();

    assert!(matches!(err, ExportError::InvalidJailAddress { .. }));
    assert!(output.is_empty());
    assert_eq!(cmd.engine().phase(), ExportPhase::Failed);
}

#[test]
fn test_missing_height_writes_nothing() {
    let (_home, mut cmd) = command(setup_app());
    let mut output = Vec::new();

    let err = cmd.execute(&ExportRequest::at(42), &mut output).unwrap_err();
    assert!(matches!(err, ExportError::HeightNotFound { height: 42 }));
    assert!(output.is_empty());
}

#[test]
fn test_cancelled_export_writes_nothing() {
    let (_home, mut cmd) = command(setup_app());
    let (tx, cancel) = CancelSignal::channel();
    tx.send(true).unwrap();

    let mut output = Vec::new();
    let err = cmd
        .execute_with_cancel(&ExportRequest::latest(), &cancel, &mut output)
        .unwrap_err();
    assert!(matches!(err, ExportError::Cancelled { .. }));
    assert!(output.is_empty());
}

#[test]
fn test_export_output_round_trips() {
    let mut setup = setup_app();
    setup.chain.advance_to(2);
    let committed = setup.chain.store().load_at_height(2).unwrap();

    let (_home, mut cmd) = command(setup);
    let mut output = Vec::new();
    cmd.execute(&ExportRequest::at(2), &mut output).unwrap();

    let doc = GenesisCodec::decode(&output).unwrap();
    assert_eq!(doc.app_state, committed.app_state);
    assert_eq!(GenesisCodec::encode(&doc).unwrap(), output);
}
