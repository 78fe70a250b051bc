//! Prompt templates for the four pipeline stages.
//!
//! Templates use `{name}` placeholders. Rendering replaces known placeholders
//! and leaves anything else untouched, so literal braces in a template survive.

use super::schema::{ModelPreset, PromptOverrides};
use crate::error::ConfigError;

/// Placeholders the organizer template must reference.
pub const ORGANIZER_PLACEHOLDERS: &[&str] = &["subject", "length", "target", "content"];

/// Placeholders the writer template must reference.
pub const WRITER_PLACEHOLDERS: &[&str] = &["plan"];

const PLANNER_ORGANIZER: &str = r#"You are an Article Organizer AI. Your job is to plan and organize an article based on the user's inputs.
Use the provided fields:
- subject: {subject}
- length: {length} words
- target: {target}
- content: {content}

Your tasks:
1. Fill the `steps` field with 3-5 clear, actionable steps to write this article.
2. Fill the `instructions_for_writer` field with detailed instructions for the Writer Agent.
   - Include article structure: intro, headings, body, conclusion
   - Specify tone and style based on `target`
   - Integrate `subject`, `title`, `header`, `question`, and `content`
   - Make sure the instructions respect the requested `length`
3. `question`: a controversial question in the header, answered in the main content."#;

const PLANNER_WRITER: &str = r#"You're a professional Article Writer.
You'll receive instructions from another agent. Follow them strictly to write the article.

Plan & Instructions:
{plan}"#;

const PLANNER_EDITOR: &str = r#"Agent Role: Content Organizer
Task: Receive a text article or blog post draft and restructure it into a well-organized, publication-ready format.
Instructions:
- Structure the content using clear, hierarchical headings (H1, H2, H3).
- Use bullet points for lists and key takeaways.
- Remove all word-count notes (e.g. "(~135 words)") and meta-commentary about length.
- Keep all original meaning, data, examples, and emphasis (bold/italics).
- Ensure the flow is logical: Introduction, Main Sections, Conclusion.
- Do not add or remove content, only organize and format.
Output clean Markdown only."#;

const PLANNER_REVIEWER: &str = r#"You are a professional article reviewer.
Evaluate the article against the provided instructions.
Rate it from 0 to 5 (example: 4.6/5).
Optionally give a short note about the rating, one line or less.

Output format:
Rating: X/5
Note: <short critique>"#;

const EDITORIAL_ORGANIZER: &str = r#"You are a Professional Content Strategist.
You MUST provide your response by filling the tool/schema provided.

User Inputs:
- Subject: {subject}
- Target: {target}
- Max Length: {length} characters
- Core Ideas: {content}

Fill every field in the schema. Ensure 'instructions_for_writer' is very detailed."#;

const EDITORIAL_WRITER: &str =
    "Write a full article following these specific instructions: {plan}";

const EDITORIAL_EDITOR: &str = "Format this text into clean Markdown with H1, H2, and H3 tags. \
Use bullet lists where they help. Keep the tone professional. Remove meta-talk such as word-count notes. \
Do not add or remove content.";

const EDITORIAL_REVIEWER: &str = "Review this article against the instructions and rate it from 0 to 5. \
Output exactly in this format:\nRating: X/5\nNote: [Your short critique]";

/// The four stage templates in effect for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplates {
    /// Structured planning instruction; placeholders `{subject}`, `{length}`, `{target}`, `{content}`.
    pub organizer: String,
    /// Drafting instruction; placeholder `{plan}`.
    pub writer: String,
    /// System instruction for markdown formatting.
    pub editor: String,
    /// System instruction for the rating.
    pub reviewer: String,
}

impl PromptTemplates {
    pub fn for_preset(preset: ModelPreset) -> Self {
        let (organizer, writer, editor, reviewer) = match preset {
            ModelPreset::Planner => (
                PLANNER_ORGANIZER,
                PLANNER_WRITER,
                PLANNER_EDITOR,
                PLANNER_REVIEWER,
            ),
            ModelPreset::Editorial => (
                EDITORIAL_ORGANIZER,
                EDITORIAL_WRITER,
                EDITORIAL_EDITOR,
                EDITORIAL_REVIEWER,
            ),
        };

        Self {
            organizer: organizer.to_string(),
            writer: writer.to_string(),
            editor: editor.to_string(),
            reviewer: reviewer.to_string(),
        }
    }

    pub fn with_overrides(mut self, overrides: &PromptOverrides) -> Self {
        if let Some(organizer) = &overrides.organizer {
            self.organizer = organizer.clone();
        }
        if let Some(writer) = &overrides.writer {
            self.writer = writer.clone();
        }
        if let Some(editor) = &overrides.editor {
            self.editor = editor.clone();
        }
        if let Some(reviewer) = &overrides.reviewer {
            self.reviewer = reviewer.clone();
        }
        self
    }

    /// Checks that every template references the placeholders its stage fills.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_placeholders("organizer", &self.organizer, ORGANIZER_PLACEHOLDERS)?;
        check_placeholders("writer", &self.writer, WRITER_PLACEHOLDERS)?;
        for (name, template) in [("editor", &self.editor), ("reviewer", &self.reviewer)] {
            if template.trim().is_empty() {
                return Err(ConfigError::InvalidTemplate {
                    name: name.to_string(),
                    reason: "Template is empty".to_string(),
                });
            }
        }
        Ok(())
    }
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self::for_preset(ModelPreset::default())
    }
}

fn check_placeholders(name: &str, template: &str, required: &[&str]) -> Result<(), ConfigError> {
    let missing: Vec<String> = required
        .iter()
        .filter(|p| !template.contains(&format!("{{{}}}", p)))
        .map(|p| format!("{{{}}}", p))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::InvalidTemplate {
            name: name.to_string(),
            reason: format!("Missing placeholder(s): {}", missing.join(", ")),
        })
    }
}

/// Replaces `{key}` placeholders with the given values in a single pass.
///
/// Inserted values are never rescanned, so user text containing `{name}`
/// reaches the model unchanged. Unknown placeholders are copied through.
pub fn render(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];

        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };

        let name = &after[..end];
        match values.iter().find(|(key, _)| *key == name) {
            Some((_, value)) => {
                out.push_str(value);
                rest = &after[end + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Escapes chat-template control sequences in user-supplied text.
///
/// Covers ChatML (`<|...|>`), sequence boundaries (`<s>`, `</s>`) and
/// Llama-style instruction markers (`[INST]`, `<<SYS>>`).
pub fn sanitize_for_prompt(text: &str) -> String {
    text.replace("<|", "< |")
        .replace("|>", "| >")
        .replace("<s>", "< s >")
        .replace("</s>", "< / s >")
        .replace("[INST]", "[ INST ]")
        .replace("[/INST]", "[ / INST ]")
        .replace("<<SYS>>", "< < SYS > >")
        .replace("<</SYS>>", "< < / SYS > >")
}
