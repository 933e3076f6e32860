//! # Export Engine
//!
//! Orchestrates one export: load the requested state through the injected
//! `AppFactory`, rewrite it for height 0 when asked, and package the result.
//!
//! ## Phases
//!
//! ```text
//! Idle ──→ LoadingState ──→ [Rewriting] ──→ Packaging ──→ Done
//!               │                │              │
//!               └────────────────┴──────────────┴──→ Failed
//! ```
//!
//! Cancellation is checked before each phase starts. A failed export returns
//! no `ExportedApp` at all.

use quantum_telemetry::{log_event, time_histogram, EXPORT_DURATION, EXPORT_REQUESTS};
use shared_types::ExportedApp;
use tokio::sync::watch;

use crate::context::ServerContext;
use crate::domain::{ExportError, ExportHeight, ExportPhase, ExportRequest};
use crate::ports::{AppFactory, ExportableState};
use crate::rewriter::{RewrittenState, ZeroHeightRewriter};

const SUBSYSTEM: &str = "genesis-export";

/// Caller-controlled cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct CancelSignal {
    rx: Option<watch::Receiver<bool>>,
}

impl CancelSignal {
    /// A signal that never fires.
    pub fn never() -> Self {
        Self::default()
    }

    pub fn new(rx: watch::Receiver<bool>) -> Self {
        Self { rx: Some(rx) }
    }

    /// Sender and signal pair. Sending `true` cancels.
    pub fn channel() -> (watch::Sender<bool>, Self) {
        let (tx, rx) = watch::channel(false);
        (tx, Self::new(rx))
    }

    pub fn is_cancelled(&self) -> bool {
        self.rx.as_ref().is_some_and(|rx| *rx.borrow())
    }

    fn check(&self, phase: ExportPhase) -> Result<(), ExportError> {
        if self.is_cancelled() {
            return Err(ExportError::Cancelled { phase });
        }
        Ok(())
    }
}

pub struct ExportEngine<F: AppFactory> {
    factory: F,
    phase: ExportPhase,
}

impl<F: AppFactory> ExportEngine<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            phase: ExportPhase::Idle,
        }
    }

    /// Phase reached by the most recent export.
    pub fn phase(&self) -> ExportPhase {
        self.phase
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Export the requested state.
    ///
    /// The result height is `read height + 1`, or 0 for a zero-height export.
    pub fn export(
        &mut self,
        ctx: &ServerContext,
        request: &ExportRequest,
        cancel: &CancelSignal,
    ) -> Result<ExportedApp, ExportError> {
        let _timer = time_histogram!(EXPORT_DURATION);
        self.phase = ExportPhase::Idle;

        match self.run(ctx, request, cancel) {
            Ok(exported) => {
                self.phase = ExportPhase::Done;
                EXPORT_REQUESTS.with_label_values(&["success"]).inc();
                log_event!(
                    info,
                    SUBSYSTEM,
                    "Exported application state",
                    target_height = %request.height,
                    for_zero_height = request.for_zero_height,
                    height = exported.height,
                    validators = exported.validators.len()
                );
                Ok(exported)
            }
            Err(err) => {
                let failed_in = self.phase;
                self.phase = ExportPhase::Failed;
                EXPORT_REQUESTS.with_label_values(&[err.outcome()]).inc();
                log_event!(
                    warn,
                    SUBSYSTEM,
                    "Export failed",
                    target_height = %request.height,
                    for_zero_height = request.for_zero_height,
                    phase = %failed_in,
                    error = %err
                );
                Err(err)
            }
        }
    }

    fn run(
        &mut self,
        ctx: &ServerContext,
        request: &ExportRequest,
        cancel: &CancelSignal,
    ) -> Result<ExportedApp, ExportError> {
        self.enter(ExportPhase::LoadingState, cancel)?;
        let handle = self.factory.open(ctx, request.height)?;
        let version = handle.version();
        if let ExportHeight::At(h) = request.height {
            if version.height != h {
                return Err(ExportError::ExportFailed(format!(
                    "requested height {h} but the factory loaded {}",
                    version.height
                )));
            }
        }

        let (rewritten, height) = if request.for_zero_height {
            self.enter(ExportPhase::Rewriting, cancel)?;
            let rewritten = ZeroHeightRewriter::new(handle.registry()).rewrite(
                version.app_state.clone(),
                &version.validators,
                &request.jail_allowed_addrs,
            )?;
            (rewritten, 0)
        } else {
            if !request.jail_allowed_addrs.is_empty() {
                log_event!(
                    warn,
                    SUBSYSTEM,
                    "Jail list ignored without zero-height export",
                    count = request.jail_allowed_addrs.len()
                );
            }
            let copy = RewrittenState {
                app_state: version.app_state.clone(),
                validators: version.validators.clone(),
            };
            (copy, version.height + 1)
        };

        self.enter(ExportPhase::Packaging, cancel)?;
        // The artifact must be encodable before it is handed out.
        serde_json::to_vec(&rewritten.app_state)
            .map_err(|e| ExportError::ExportFailed(format!("app state is not encodable: {e}")))?;

        Ok(ExportedApp {
            app_state: rewritten.app_state,
            validators: rewritten.validators,
            height,
            consensus_params: version.consensus_params.clone(),
        })
    }

    fn enter(&mut self, phase: ExportPhase, cancel: &CancelSignal) -> Result<(), ExportError> {
        cancel.check(phase)?;
        self.phase = phase;
        Ok(())
    }
}
