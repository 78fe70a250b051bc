//! Canned generation service for tests and offline runs.
//!
//! Free-text replies are served from a FIFO queue, one per call. The structured
//! reply is reused for every structured call. Every request is recorded so
//! callers can assert on call order and prompt contents.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::{ChatMessage, GenerationError, GenerationService, OutputSchema};

#[derive(Debug, Clone)]
enum CannedReply<T> {
    Ok(T),
    Fail(String),
}

impl<T: Clone> CannedReply<T> {
    fn to_result(&self) -> Result<T, GenerationError> {
        match self {
            CannedReply::Ok(value) => Ok(value.clone()),
            CannedReply::Fail(reason) => Err(GenerationError::Request(reason.clone())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallMode {
    FreeText,
    Structured,
}

/// One request observed by a [`CannedGenerator`].
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub mode: CallMode,
    pub messages: Vec<ChatMessage>,
    /// Schema name for structured calls.
    pub schema: Option<String>,
}

impl RecordedCall {
    /// All message contents joined with newlines.
    pub fn text(&self) -> String {
        self.messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Default)]
pub struct CannedGenerator {
    text_replies: Mutex<VecDeque<CannedReply<String>>>,
    structured_reply: Mutex<Option<CannedReply<serde_json::Value>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl CannedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a free-text reply.
    pub fn with_text_reply(self, reply: impl Into<String>) -> Self {
        lock(&self.text_replies).push_back(CannedReply::Ok(reply.into()));
        self
    }

    /// Queues a free-text failure.
    pub fn with_text_failure(self, reason: impl Into<String>) -> Self {
        lock(&self.text_replies).push_back(CannedReply::Fail(reason.into()));
        self
    }

    /// Sets the value returned by structured calls.
    pub fn with_structured_reply(self, value: serde_json::Value) -> Self {
        *lock(&self.structured_reply) = Some(CannedReply::Ok(value));
        self
    }

    /// Makes structured calls fail.
    pub fn with_structured_failure(self, reason: impl Into<String>) -> Self {
        *lock(&self.structured_reply) = Some(CannedReply::Fail(reason.into()));
        self
    }

    /// Requests received so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }

    /// Number of free-text replies not yet consumed.
    pub fn remaining_text_replies(&self) -> usize {
        lock(&self.text_replies).len()
    }

    fn record(&self, call: RecordedCall) {
        lock(&self.calls).push(call);
    }
}

#[async_trait]
impl GenerationService for CannedGenerator {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, GenerationError> {
        self.record(RecordedCall {
            mode: CallMode::FreeText,
            messages: messages.to_vec(),
            schema: None,
        });

        let reply = lock(&self.text_replies).pop_front();
        match reply {
            Some(reply) => reply.to_result(),
            None => Err(GenerationError::EmptyResponse),
        }
    }

    async fn complete_structured(
        &self,
        instruction: &str,
        schema: &OutputSchema,
    ) -> Result<serde_json::Value, GenerationError> {
        self.record(RecordedCall {
            mode: CallMode::Structured,
            messages: vec![ChatMessage::user(instruction)],
            schema: Some(schema.name.clone()),
        });

        let reply = lock(&self.structured_reply).clone();
        match reply {
            Some(reply) => reply.to_result(),
            None => Err(GenerationError::EmptyResponse),
        }
    }
}
