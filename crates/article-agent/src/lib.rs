pub mod config;
pub mod error;
pub mod generation;
pub mod logging;
pub mod pipeline;
pub mod rating;
pub mod secrets;

pub use config::{load_config, load_config_from_str, AgentConfig, ModelPreset, PromptTemplates};
pub use error::{AgentError, ConfigError, Result};
pub use generation::{
    CannedGenerator, ChatClient, ChatMessage, GenerationError, GenerationService, OutputSchema,
    Role,
};
pub use logging::{init_logging, LogFormat, LoggingError};
pub use pipeline::{
    ArticleRequest, ChannelProgress, NoopProgress, Pipeline, PipelineConfig, PipelineContext,
    PipelineError, PipelineState, Plan, PlanOutcome, ProgressEvent, ProgressRecord,
    ProgressReporter, Stage, StateUpdate,
};
pub use rating::{parse_rating, Rating};
pub use secrets::{resolve_secret, SecretError};
