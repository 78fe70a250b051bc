//! The four-stage article pipeline.
//!
//! Organizer plans, Writer drafts, Editor formats and Reviewer rates. Each
//! stage reads the accumulated [`PipelineState`] and returns one
//! [`StateUpdate`] that the runner merges before the next stage starts.

mod config;
mod context;
mod error;
mod plan;
mod progress;
mod runner;
mod stage;
mod state;

pub use config::PipelineConfig;
pub use context::PipelineContext;
pub use error::{PipelineError, PipelineWarning};
pub use plan::{
    Plan, PlanOutcome, DEGRADED_PLAN_MARKER, FALLBACK_WRITER_INSTRUCTIONS, MISSING_PLAN_MARKER,
};
pub use progress::{ChannelProgress, NoopProgress, ProgressEvent, ProgressRecord, ProgressReporter};
pub use runner::Pipeline;
pub use stage::Stage;
pub use state::{ArticleRequest, PipelineState, StateUpdate};
