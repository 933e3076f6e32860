//! # Export Command
//!
//! Turns an export into a genesis file: chain id, genesis time and the block
//! time increment come from the node's existing `config/genesis.json`,
//! everything else from the export. The new document is fully encoded before
//! a single byte is written.

use quantum_telemetry::log_event;
use shared_types::GenesisDoc;
use std::io::Write;

use crate::codec::GenesisCodec;
use crate::context::ServerContext;
use crate::domain::{ExportError, ExportRequest};
use crate::engine::{CancelSignal, ExportEngine};
use crate::ports::AppFactory;

pub struct ExportCommand<F: AppFactory> {
    ctx: ServerContext,
    engine: ExportEngine<F>,
}

impl<F: AppFactory> ExportCommand<F> {
    pub fn new(ctx: ServerContext, factory: F) -> Self {
        Self {
            ctx,
            engine: ExportEngine::new(factory),
        }
    }

    pub fn context(&self) -> &ServerContext {
        &self.ctx
    }

    pub fn engine(&self) -> &ExportEngine<F> {
        &self.engine
    }

    pub fn execute<W: Write>(&mut self, request: &ExportRequest, out: &mut W) -> Result<(), ExportError> {
        self.execute_with_cancel(request, &CancelSignal::never(), out)
    }

    pub fn execute_with_cancel<W: Write>(
        &mut self,
        request: &ExportRequest,
        cancel: &CancelSignal,
        out: &mut W,
    ) -> Result<(), ExportError> {
        let genesis_file = self.ctx.genesis_file();
        let current = GenesisCodec::read_file(&genesis_file)?;

        let exported = self.engine.export(&self.ctx, request, cancel)?;

        let mut consensus_params = exported.consensus_params;
        consensus_params.block.time_iota_ms = current.consensus_params.block.time_iota_ms;

        let doc = GenesisDoc {
            chain_id: current.chain_id,
            genesis_time: current.genesis_time,
            initial_height: exported.height,
            consensus_params,
            validators: exported.validators,
            app_state: exported.app_state,
        };
        let bytes = GenesisCodec::encode(&doc)?;

        out.write_all(&bytes)
            .and_then(|_| out.flush())
            .map_err(|e| ExportError::ExportFailed(format!("write genesis document: {e}")))?;

        log_event!(
            debug,
            "genesis-export",
            "Genesis document written",
            chain_id = %doc.chain_id,
            initial_height = doc.initial_height,
            bytes = bytes.len()
        );
        Ok(())
    }
}
