//! # Export Flows
//!
//! Chain runs, exports, and restarts from the exported genesis.
//!
//! ## Flow Tested:
//!
//! 1. **State Management (4) → Genesis Export (18)**: committed heights export
//!    with `initial_height = h + 1`
//! 2. **Zero-height restart**: a chain initialized from a zero-height export
//!    exports the same state again
//! 3. **Pruning**: pruned heights surface as `HeightNotFound`

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;
    use qc_04_state_management::test_utils::{
        block_header, genesis_time, reference_app_state, ReferenceChain, CHAIN_ID,
    };
    use qc_04_state_management::{
        standard_registry, InMemoryVersionStore, InitChainRequest, VersionStore,
    };
    use qc_18_genesis_export::{
        CancelSignal, ExportCommand, ExportEngine, ExportError, ExportRequest, GenesisCodec,
        LiveAppFactory, ServerContext, StoreAppFactory,
    };
    use shared_types::{ConsensusParams, ExportedApp, GenesisDoc, ValidatorSet};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn ctx() -> ServerContext {
        ServerContext::new("integration-home")
    }

    fn export_from_store(
        chain: &ReferenceChain,
        request: ExportRequest,
    ) -> Result<ExportedApp, ExportError> {
        let mut engine = ExportEngine::new(StoreAppFactory::new(chain.store(), standard_registry()));
        engine.export(&ctx(), &request, &CancelSignal::never())
    }

    /// Genesis document a restarted chain would be handed.
    fn restart_doc(exported: ExportedApp) -> GenesisDoc {
        GenesisDoc {
            chain_id: CHAIN_ID.to_string(),
            genesis_time: genesis_time(),
            initial_height: exported.height,
            consensus_params: exported.consensus_params,
            validators: exported.validators,
            app_state: exported.app_state,
        }
    }

    fn restart_from(doc: &GenesisDoc) -> ReferenceChain {
        ReferenceChain::from_request(InitChainRequest {
            chain_id: doc.chain_id.clone(),
            time: doc.genesis_time,
            app_state: doc.app_state.clone(),
            consensus_params: doc.consensus_params.clone(),
            validators: doc.validators.clone().into_inner(),
        })
    }

    // =============================================================================
    // INTEGRATION TESTS: EXPORT → RESTART
    // =============================================================================

    #[test]
    fn test_export_height_is_next_height_for_every_committed_height() {
        let chain = ReferenceChain::with_blocks(6);
        for h in 1..=6 {
            let exported = export_from_store(&chain, ExportRequest::at(h)).unwrap();
            assert_eq!(exported.height, h + 1);
        }
    }

    #[test]
    fn test_zero_height_export_restarts_cleanly() {
        let chain = ReferenceChain::with_blocks(5);
        let first = export_from_store(&chain, ExportRequest::latest().for_zero_height()).unwrap();
        assert_eq!(first.height, 0);

        // Through the codec, as a real restart would.
        let doc = restart_doc(first.clone());
        let decoded = GenesisCodec::decode(&GenesisCodec::encode(&doc).unwrap()).unwrap();
        assert_eq!(decoded, doc);

        let restarted = restart_from(&decoded);
        let mut engine = ExportEngine::new(LiveAppFactory::new(Arc::new(Mutex::new(
            restarted.machine,
        ))));
        let second = engine
            .export(&ctx(), &ExportRequest::latest().for_zero_height(), &CancelSignal::never())
            .unwrap();

        assert_eq!(second.app_state, first.app_state);
        assert_eq!(second.validators, first.validators);
        assert_eq!(second.consensus_params, first.consensus_params);
    }

    #[test]
    fn test_untouched_chain_keeps_custom_consensus_params() {
        let mut params = ConsensusParams::default();
        params.block.max_bytes = 1_048_576;
        params.block.max_gas = -1;
        params.evidence.max_age_num_blocks = 1000;
        params.validator.pub_key_types = vec!["ed25519".into(), "secp256k1".into()];

        let chain = ReferenceChain::from_request(InitChainRequest {
            consensus_params: params.clone(),
            ..qc_04_state_management::test_utils::reference_genesis()
        });

        let exported = export_from_store(&chain, ExportRequest::latest()).unwrap();
        assert_eq!(exported.consensus_params, params);
    }

    #[test]
    fn test_pruned_height_is_not_found() {
        let chain = ReferenceChain::with_blocks(6);
        chain.store().prune(4).unwrap();

        assert!(matches!(
            export_from_store(&chain, ExportRequest::at(2)),
            Err(ExportError::HeightNotFound { height: 2 })
        ));
        assert!(export_from_store(&chain, ExportRequest::at(4)).is_ok());
    }

    #[test]
    fn test_repeated_exports_are_identical() {
        let chain = ReferenceChain::with_blocks(4);
        let a = export_from_store(&chain, ExportRequest::at(3)).unwrap();
        let b = export_from_store(&chain, ExportRequest::at(3)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.app_state.digest(), b.app_state.digest());
    }

    #[test]
    fn test_jail_through_full_command() {
        let home = tempfile::tempdir().unwrap();
        std::fs::create_dir(home.path().join("config")).unwrap();
        let ctx = ServerContext::new(home.path());
        GenesisCodec::write_file(
            &ctx.genesis_file(),
            &GenesisDoc {
                chain_id: CHAIN_ID.to_string(),
                genesis_time: genesis_time(),
                initial_height: 1,
                consensus_params: ConsensusParams::default(),
                validators: ValidatorSet::empty(),
                app_state: reference_app_state(),
            },
        )
        .unwrap();

        // The only validator cannot be jailed: nothing would be left bonded.
        let chain = ReferenceChain::with_blocks(2);
        let only = chain.machine.working_snapshot().unwrap().validators.validators()[0]
            .address
            .to_string();
        let mut cmd = ExportCommand::new(
            ctx,
            LiveAppFactory::new(Arc::new(Mutex::new(chain.machine))),
        );

        let mut output = Vec::new();
        let err = cmd
            .execute(
                &ExportRequest::latest().for_zero_height().with_jail([only]),
                &mut output,
            )
            .unwrap_err();
        assert!(matches!(err, ExportError::ExportFailed(_)));
        assert!(output.is_empty());
    }

    #[test]
    fn test_latest_before_first_commit() {
        let store = Arc::new(InMemoryVersionStore::new());
        let mut machine =
            qc_04_state_management::ApplicationStateMachine::new(Arc::clone(&store), standard_registry());
        machine
            .init_chain(qc_04_state_management::test_utils::reference_genesis())
            .unwrap();

        let mut engine = ExportEngine::new(LiveAppFactory::new(Arc::new(Mutex::new(machine))));
        let exported = engine
            .export(&ctx(), &ExportRequest::latest(), &CancelSignal::never())
            .unwrap();

        assert_eq!(exported.height, 1);
        assert_eq!(store.latest_height().unwrap(), 0);
    }

    #[test]
    fn test_begin_block_in_progress_is_visible_to_latest_only() {
        let mut chain = ReferenceChain::with_blocks(3);
        chain.machine.begin_block(block_header(4)).unwrap();
        let committed = chain.store().load_at_height(3).unwrap();

        let mut engine = ExportEngine::new(LiveAppFactory::new(Arc::new(Mutex::new(chain.machine))));
        let live = engine
            .export(&ctx(), &ExportRequest::latest(), &CancelSignal::never())
            .unwrap();
        let at3 = engine
            .export(&ctx(), &ExportRequest::at(3), &CancelSignal::never())
            .unwrap();

        assert_eq!(live.height, 4);
        assert_eq!(at3.height, 4);
        assert_eq!(at3.app_state, committed.app_state);
        assert_ne!(live.app_state, at3.app_state);
    }
}
