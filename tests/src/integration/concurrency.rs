//! # Concurrent Reads and Exports
//!
//! Exports and historical reads run while the chain keeps committing.
//!
//! ## Flow Tested:
//!
//! 1. **Readers vs. writer**: `load_at_height` on committed heights returns the
//!    same version no matter how many commits land meanwhile
//! 2. **Exports vs. writer**: an export of a fixed height is unaffected by
//!    concurrent commits on the same store

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use qc_04_state_management::test_utils::{block_header, ReferenceChain};
    use qc_04_state_management::{standard_registry, VersionStore};
    use qc_18_genesis_export::{
        CancelSignal, ExportEngine, ExportRequest, ServerContext, StoreAppFactory,
    };

    const COMMITTED: u64 = 4;
    const EXTRA_BLOCKS: u64 = 20;

    #[test]
    fn test_readers_see_stable_versions_during_commits() {
        let mut chain = ReferenceChain::with_blocks(COMMITTED);
        let store = chain.store();
        let expected: Vec<_> = (1..=COMMITTED)
            .map(|h| store.load_at_height(h).unwrap())
            .collect();

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                let expected = expected.clone();
                thread::spawn(move || {
                    for _ in 0..50 {
                        for (i, version) in expected.iter().enumerate() {
                            let loaded = store.load_at_height(i as u64 + 1).unwrap();
                            assert_eq!(*loaded, **version);
                        }
                        assert!(store.latest_height().unwrap() >= COMMITTED);
                    }
                })
            })
            .collect();

        chain.advance_to(COMMITTED + EXTRA_BLOCKS);

        for reader in readers {
            reader.join().unwrap();
        }
        assert_eq!(store.latest_height().unwrap(), COMMITTED + EXTRA_BLOCKS);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_exports_race_commits() {
        let mut chain = ReferenceChain::with_blocks(COMMITTED);
        let store = chain.store();
        let reference = {
            let mut engine =
                ExportEngine::new(StoreAppFactory::new(Arc::clone(&store), standard_registry()));
            engine
                .export(
                    &ServerContext::new("unused"),
                    &ExportRequest::at(COMMITTED).for_zero_height(),
                    &CancelSignal::never(),
                )
                .unwrap()
        };

        let exports: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::task::spawn_blocking(move || {
                    let mut engine =
                        ExportEngine::new(StoreAppFactory::new(store, standard_registry()));
                    engine.export(
                        &ServerContext::new("unused"),
                        &ExportRequest::at(COMMITTED).for_zero_height(),
                        &CancelSignal::never(),
                    )
                })
            })
            .collect();

        let writer = tokio::task::spawn_blocking(move || {
            for h in COMMITTED + 1..=COMMITTED + EXTRA_BLOCKS {
                chain.machine.begin_block(block_header(h)).unwrap();
                chain.machine.commit().unwrap();
            }
            chain.machine.last_height()
        });

        for export in exports {
            let exported = export.await.unwrap().unwrap();
            assert_eq!(exported, reference);
        }
        assert_eq!(writer.await.unwrap(), COMMITTED + EXTRA_BLOCKS);
    }
}
