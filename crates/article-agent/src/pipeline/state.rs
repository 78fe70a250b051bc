use serde::{Deserialize, Serialize};

use super::error::PipelineError;
use super::plan::PlanOutcome;
use crate::rating::{parse_rating, Rating};

/// Caller inputs for one pipeline invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRequest {
    pub subject: String,
    /// Length budget (characters or words, depending on the prompt wording).
    pub length: u32,
    pub target: String,
    /// Free-form source notes.
    pub content: String,
}

impl ArticleRequest {
    pub fn new(
        subject: impl Into<String>,
        length: u32,
        target: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            length,
            target: target.into(),
            content: content.into(),
        }
    }

    /// Builds a request from a loosely typed JSON object.
    ///
    /// Missing text inputs become empty strings and a missing length becomes 0.
    /// Present values of the wrong type are rejected.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, PipelineError> {
        let map = value.as_object().ok_or_else(|| PipelineError::InvalidInput {
            field: "request".to_string(),
            reason: "expected a JSON object".to_string(),
        })?;

        let text = |field: &str| -> Result<String, PipelineError> {
            match map.get(field) {
                None | Some(serde_json::Value::Null) => Ok(String::new()),
                Some(serde_json::Value::String(s)) => Ok(s.clone()),
                Some(other) => Err(PipelineError::InvalidInput {
                    field: field.to_string(),
                    reason: format!("expected a string, got {}", other),
                }),
            }
        };

        let length = match map.get("length") {
            None | Some(serde_json::Value::Null) => 0,
            Some(value) => value
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .ok_or_else(|| PipelineError::InvalidInput {
                    field: "length".to_string(),
                    reason: format!("expected a non-negative integer, got {}", value),
                })?,
        };

        Ok(Self {
            subject: text("subject")?,
            length,
            target: text("target")?,
            content: text("content")?,
        })
    }
}

/// Partial state produced by one stage. Merging overwrites exactly one key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "key", content = "value")]
pub enum StateUpdate {
    Plan(PlanOutcome),
    Article(String),
    Result(String),
    Rating(String),
}

impl StateUpdate {
    pub fn key(&self) -> &'static str {
        match self {
            StateUpdate::Plan(_) => "plan",
            StateUpdate::Article(_) => "article",
            StateUpdate::Result(_) => "result",
            StateUpdate::Rating(_) => "rating",
        }
    }
}

/// State threaded through the stages of one invocation.
///
/// The four inputs are always present; each stage output is `None` until the
/// producing stage has been merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineState {
    pub subject: String,
    pub length: u32,
    pub target: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<PlanOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub article: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<String>,
}

impl PipelineState {
    pub fn from_request(request: ArticleRequest) -> Self {
        Self {
            subject: request.subject,
            length: request.length,
            target: request.target,
            content: request.content,
            plan: None,
            article: None,
            result: None,
            rating: None,
        }
    }

    /// Applies a stage update; the named key is replaced wholesale.
    pub fn merge(&mut self, update: StateUpdate) {
        match update {
            StateUpdate::Plan(plan) => self.plan = Some(plan),
            StateUpdate::Article(article) => self.article = Some(article),
            StateUpdate::Result(result) => self.result = Some(result),
            StateUpdate::Rating(rating) => self.rating = Some(rating),
        }
    }

    /// Keys currently set, in the order stages make them available.
    pub fn populated_keys(&self) -> Vec<&'static str> {
        let mut keys = vec!["subject", "length", "target", "content"];
        if self.plan.is_some() {
            keys.push("plan");
        }
        if self.article.is_some() {
            keys.push("article");
        }
        if self.result.is_some() {
            keys.push("result");
        }
        if self.rating.is_some() {
            keys.push("rating");
        }
        keys
    }

    /// JSON object view for loosely typed callers.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }

    /// Parsed form of the Reviewer's rating text, if present.
    pub fn parsed_rating(&self) -> Option<Rating> {
        self.rating.as_deref().map(parse_rating)
    }
}
