//! Generation service: the pipeline's only outbound dependency.
//!
//! Two modes are exposed. Free-text mode takes role-tagged messages and
//! returns the generated text. Structured mode takes a single instruction and
//! an [`OutputSchema`] and returns a JSON value the model produced for it;
//! callers validate the value before trusting it.

pub mod canned;
pub mod client;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use canned::{CallMode, CannedGenerator, RecordedCall};
pub use client::ChatClient;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Failed to create HTTP client: {0}")]
    ClientBuild(String),

    #[error("Generation request failed: {0}")]
    Request(String),

    #[error("Generation service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Generation service returned no content")]
    EmptyResponse,

    #[error("Failed to parse generation response: {0}")]
    Parse(String),

    #[error("Structured output does not match schema '{schema}': {errors}")]
    SchemaViolation { schema: String, errors: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Target shape for a structured generation call.
#[derive(Debug, Clone)]
pub struct OutputSchema {
    /// Identifier sent to the model (function/tool name).
    pub name: String,
    pub description: String,
    /// JSON Schema document.
    pub schema: serde_json::Value,
}

impl OutputSchema {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        schema: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            schema,
        }
    }

    /// Checks `value` against the schema, collecting every violation.
    pub fn validate(&self, value: &serde_json::Value) -> Result<(), GenerationError> {
        let validator = jsonschema::validator_for(&self.schema).map_err(|e| {
            GenerationError::SchemaViolation {
                schema: self.name.clone(),
                errors: format!("invalid schema: {}", e),
            }
        })?;

        let errors: Vec<String> = validator
            .iter_errors(value)
            .map(|e| e.to_string())
            .collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(GenerationError::SchemaViolation {
                schema: self.name.clone(),
                errors: errors.join("; "),
            })
        }
    }

    /// Schema body suitable for a tool definition (meta keys removed).
    pub fn parameters(&self) -> serde_json::Value {
        let mut parameters = self.schema.clone();
        if let Some(map) = parameters.as_object_mut() {
            map.remove("$schema");
            map.remove("$id");
            map.remove("title");
        }
        parameters
    }
}

#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Free-text generation from an ordered list of messages.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, GenerationError>;

    /// Structured generation constrained to `schema`.
    async fn complete_structured(
        &self,
        instruction: &str,
        schema: &OutputSchema,
    ) -> Result<serde_json::Value, GenerationError>;
}
