//! Builder patterns for creating test data programmatically.

#![allow(dead_code)]

use serde_json::{json, Value};

use article_agent::{ArticleRequest, CannedGenerator};

/// Builder for structured plan replies.
pub struct PlanBuilder {
    subject: String,
    length: u32,
    target: String,
    title: String,
    header: String,
    question: String,
    content: String,
    steps: Vec<String>,
    instructions: String,
}

impl PlanBuilder {
    /// Create a plan matching [`RequestBuilder::new`].
    pub fn new() -> Self {
        Self {
            subject: "Remote work".to_string(),
            length: 1200,
            target: "Managers".to_string(),
            title: "The Office Is Optional".to_string(),
            header: "What distributed teams get right".to_string(),
            question: "Is the office still worth the commute?".to_string(),
            content: "Remote teams report higher focus time.".to_string(),
            steps: vec![
                "Open with a commute anecdote".to_string(),
                "Present focus-time data".to_string(),
                "Close with a checklist".to_string(),
            ],
            instructions: "Conversational tone for managers, about 1200 words.".to_string(),
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn instructions(mut self, instructions: &str) -> Self {
        self.instructions = instructions.to_string();
        self
    }

    pub fn steps(mut self, steps: &[&str]) -> Self {
        self.steps = steps.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Build the JSON value the Organizer receives from the model.
    pub fn build(self) -> Value {
        json!({
            "subject": self.subject,
            "length": self.length,
            "target": self.target,
            "title": self.title,
            "header": self.header,
            "question": self.question,
            "content": self.content,
            "steps": self.steps,
            "instructions_for_writer": self.instructions,
        })
    }
}

impl Default for PlanBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for pipeline inputs.
pub struct RequestBuilder {
    subject: String,
    length: u32,
    target: String,
    content: String,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            subject: "Remote work".to_string(),
            length: 1200,
            target: "Managers".to_string(),
            content: "Remote teams report higher focus time.".to_string(),
        }
    }

    pub fn subject(mut self, subject: &str) -> Self {
        self.subject = subject.to_string();
        self
    }

    pub fn length(mut self, length: u32) -> Self {
        self.length = length;
        self
    }

    pub fn content(mut self, content: &str) -> Self {
        self.content = content.to_string();
        self
    }

    pub fn build(self) -> ArticleRequest {
        ArticleRequest::new(self.subject, self.length, self.target, self.content)
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A generator that answers all four stages successfully.
pub fn happy_generator() -> CannedGenerator {
    CannedGenerator::new()
        .with_structured_reply(PlanBuilder::new().build())
        .with_text_reply("Remote work draft body")
        .with_text_reply("# The Office Is Optional\n\nRemote work draft body")
        .with_text_reply("Rating: 4/5\nNote: Good pacing, needs one more source.")
}
