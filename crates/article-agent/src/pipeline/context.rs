use super::error::PipelineWarning;
use super::state::{ArticleRequest, PipelineState};

#[derive(Debug)]
pub struct PipelineContext {
    // Correlates log lines and progress records of one invocation
    pub run_id: String,

    // Inputs plus every merged stage update
    pub state: PipelineState,

    // Non-fatal warnings
    pub warnings: Vec<PipelineWarning>,
}

impl PipelineContext {
    pub fn new(request: ArticleRequest) -> Self {
        Self::with_run_id(uuid::Uuid::new_v4().to_string(), request)
    }

    pub fn with_run_id(run_id: impl Into<String>, request: ArticleRequest) -> Self {
        Self {
            run_id: run_id.into(),
            state: PipelineState::from_request(request),
            warnings: Vec::new(),
        }
    }

    pub fn into_state(self) -> PipelineState {
        self.state
    }
}
