use std::fmt;

/// Progress of one export call.
///
/// `Idle → LoadingState → Rewriting (zero-height only) → Packaging → Done`,
/// with `Failed` reachable from every step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportPhase {
    Idle,
    LoadingState,
    Rewriting,
    Packaging,
    Done,
    Failed,
}

impl fmt::Display for ExportPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::LoadingState => "loading state",
            Self::Rewriting => "rewriting",
            Self::Packaging => "packaging",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}
