pub mod loader;
pub mod prompts;
pub mod schema;

pub use loader::{default_config_path, load_config, load_config_from_str, load_config_or_default};
pub use prompts::{render, sanitize_for_prompt, PromptTemplates};
pub use schema::{AgentConfig, ApiConfig, ModelConfig, ModelPreset, PromptOverrides};
