use std::time::Duration;

use crate::config::{AgentConfig, PromptTemplates};

pub struct PipelineConfig {
    pub prompts: PromptTemplates,
    /// Upper bound on each generation call.
    pub call_timeout: Duration,
}

impl PipelineConfig {
    pub fn from_config(config: &AgentConfig) -> Self {
        Self {
            prompts: config.prompt_templates(),
            call_timeout: Duration::from_secs(config.api.timeout_secs),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::from_config(&AgentConfig::default())
    }
}
