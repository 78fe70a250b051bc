//! OpenAI-compatible chat completions client (Groq by default).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ChatMessage, GenerationError, GenerationService, OutputSchema};
use crate::config::AgentConfig;

/// Error bodies are truncated to keep logs readable.
const MAX_ERROR_BODY_LENGTH: usize = 200;

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

fn truncate_error_body(body: &str) -> String {
    if body.chars().count() > MAX_ERROR_BODY_LENGTH {
        let head: String = body.chars().take(MAX_ERROR_BODY_LENGTH).collect();
        format!("{}... (truncated)", head)
    } else {
        body.to_string()
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<ToolDefinition>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct ToolDefinition {
    #[serde(rename = "type")]
    kind: &'static str,
    function: FunctionDefinition,
}

#[derive(Debug, Serialize)]
struct FunctionDefinition {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<ToolCall>,
}

#[derive(Debug, Deserialize)]
struct ToolCall {
    function: FunctionCall,
}

#[derive(Debug, Deserialize)]
struct FunctionCall {
    name: String,
    arguments: String,
}

/// Long-lived client for a hosted chat model. Build once, share by `Arc`.
pub struct ChatClient {
    client: Client,
    endpoint: String,
    api_key: SecretString,
    model: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl ChatClient {
    pub fn new(
        base_url: &str,
        api_key: SecretString,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .timeout(timeout)
            .build()
            .map_err(|e| GenerationError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key,
            model: model.into(),
            temperature: None,
            max_tokens: None,
        })
    }

    /// Builds a client from config, resolving the API key from its sources.
    pub fn from_config(config: &AgentConfig) -> crate::Result<Self> {
        let api_key = config.api.resolve_api_key()?;
        let client = Self::new(
            &config.api.base_url,
            api_key,
            config.model.model_name(),
            Duration::from_secs(config.api.timeout_secs),
        )?
        .with_temperature(config.model.temperature())
        .with_max_tokens(config.model.max_tokens);
        Ok(client)
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn send(&self, request: &ChatRequest<'_>) -> Result<ChatResponse, GenerationError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose_secret())
            .json(request)
            .send()
            .await
            .map_err(|e| GenerationError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Status {
                status,
                body: truncate_error_body(&body),
            });
        }

        response
            .json()
            .await
            .map_err(|e| GenerationError::Parse(e.to_string()))
    }
}

#[async_trait]
impl GenerationService for ChatClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, GenerationError> {
        debug!(
            model = %self.model,
            messages = messages.len(),
            chars = messages.iter().map(|m| m.content.len()).sum::<usize>(),
            "Sending free-text generation request"
        );

        let request = ChatRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            tools: None,
            tool_choice: None,
        };

        let response = self.send(&request).await?;
        extract_text(response)
    }

    async fn complete_structured(
        &self,
        instruction: &str,
        schema: &OutputSchema,
    ) -> Result<serde_json::Value, GenerationError> {
        debug!(
            model = %self.model,
            schema = %schema.name,
            chars = instruction.len(),
            "Sending structured generation request"
        );

        let messages = [ChatMessage::user(instruction)];
        let request = ChatRequest {
            model: &self.model,
            messages: &messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            tools: Some(vec![ToolDefinition {
                kind: "function",
                function: FunctionDefinition {
                    name: schema.name.clone(),
                    description: schema.description.clone(),
                    parameters: schema.parameters(),
                },
            }]),
            tool_choice: Some(serde_json::json!({
                "type": "function",
                "function": { "name": schema.name },
            })),
        };

        let response = self.send(&request).await?;
        extract_structured(response, &schema.name)
    }
}

/// First choice's content, verbatim. Only a missing choice or `null` content
/// is an error; a blank reply is passed through.
fn extract_text(response: ChatResponse) -> Result<String, GenerationError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or(GenerationError::EmptyResponse)
}

/// Takes the forced tool call's arguments; falls back to the first JSON object
/// in the message content when the model answered in prose.
fn extract_structured(
    response: ChatResponse,
    tool_name: &str,
) -> Result<serde_json::Value, GenerationError> {
    let message = response
        .choices
        .into_iter()
        .next()
        .map(|c| c.message)
        .ok_or(GenerationError::EmptyResponse)?;

    let call = message
        .tool_calls
        .iter()
        .find(|call| call.function.name == tool_name)
        .or_else(|| message.tool_calls.first());

    if let Some(call) = call {
        return serde_json::from_str(&call.function.arguments).map_err(|e| {
            GenerationError::Parse(format!("Tool arguments are not valid JSON: {}", e))
        });
    }

    let content = message
        .content
        .filter(|c| !c.trim().is_empty())
        .ok_or(GenerationError::EmptyResponse)?;
    let json_str = extract_json(&content).ok_or_else(|| {
        GenerationError::Parse(format!(
            "No JSON object in response: {}",
            truncate_error_body(&content)
        ))
    })?;

    serde_json::from_str(json_str)
        .map_err(|e| GenerationError::Parse(format!("Failed to parse JSON: {}", e)))
}

/// Finds the first balanced `{...}` object, skipping braces inside strings.
pub(crate) fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, c) in text[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match c {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + i + 1]);
                }
            }
            _ => {}
        }
    }

    None
}
