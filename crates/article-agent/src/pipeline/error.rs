use thiserror::Error;

use super::stage::Stage;
use crate::generation::GenerationError;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Invalid input '{field}': {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("{stage} stage failed: {source}")]
    Generation {
        stage: Stage,
        #[source]
        source: GenerationError,
    },

    #[error("{stage} stage timed out after {secs}s")]
    Timeout { stage: Stage, secs: u64 },
}

impl PipelineError {
    /// Stage the failure happened in, if any.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            PipelineError::InvalidInput { .. } => None,
            PipelineError::Generation { stage, .. } | PipelineError::Timeout { stage, .. } => {
                Some(*stage)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineWarning {
    /// The Organizer fell back to the degraded plan marker.
    PlanDegraded { reason: String },
}
