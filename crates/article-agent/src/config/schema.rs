use serde::{Deserialize, Serialize};

/// Default OpenAI-compatible endpoint (Groq).
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Environment variable consulted for the API key when nothing else is configured.
pub const DEFAULT_API_KEY_ENV_VAR: &str = "GROQ_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    pub version: String,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub prompts: PromptOverrides,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            model: ModelConfig::default(),
            api: ApiConfig::default(),
            prompts: PromptOverrides::default(),
        }
    }
}

/// Named model setups. Both drive the same four-stage pipeline and differ only
/// in model, temperature and prompt wording.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelPreset {
    /// `openai/gpt-oss-120b` at the provider's default temperature.
    Planner,
    /// `llama-3.3-70b-versatile` at temperature 0.6.
    #[default]
    Editorial,
}

impl ModelPreset {
    pub fn model_name(&self) -> &'static str {
        match self {
            ModelPreset::Planner => "openai/gpt-oss-120b",
            ModelPreset::Editorial => "llama-3.3-70b-versatile",
        }
    }

    pub fn temperature(&self) -> Option<f32> {
        match self {
            ModelPreset::Planner => None,
            ModelPreset::Editorial => Some(0.6),
        }
    }
}

impl std::fmt::Display for ModelPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelPreset::Planner => write!(f, "planner"),
            ModelPreset::Editorial => write!(f, "editorial"),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub preset: ModelPreset,
    /// Overrides the preset's model identifier.
    #[serde(default)]
    pub name: Option<String>,
    /// Overrides the preset's sampling temperature.
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

impl ModelConfig {
    pub fn model_name(&self) -> &str {
        self.name
            .as_deref()
            .unwrap_or_else(|| self.preset.model_name())
    }

    pub fn temperature(&self) -> Option<f32> {
        self.temperature.or_else(|| self.preset.temperature())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Inline API key. Prefer `api_key_file` or `api_key_env_var`.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_key_file: Option<String>,
    #[serde(default = "default_api_key_env_var")]
    pub api_key_env_var: Option<String>,
    /// Per-call timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_api_key_env_var() -> Option<String> {
    Some(DEFAULT_API_KEY_ENV_VAR.to_string())
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            api_key_file: None,
            api_key_env_var: default_api_key_env_var(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Per-stage prompt template overrides. Unset stages use the preset's wording.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptOverrides {
    #[serde(default)]
    pub organizer: Option<String>,
    #[serde(default)]
    pub writer: Option<String>,
    #[serde(default)]
    pub editor: Option<String>,
    #[serde(default)]
    pub reviewer: Option<String>,
}
