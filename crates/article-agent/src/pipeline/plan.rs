use serde::{Deserialize, Serialize, Serializer};

use crate::generation::{GenerationError, OutputSchema};

const PLAN_SCHEMA_JSON: &str = include_str!("../../../../schema/plan-v1.json");

/// Textual form of a plan the Organizer could not produce.
pub const DEGRADED_PLAN_MARKER: &str = "Error in planning phase.";

/// Writer input when no plan exists in the state at all.
pub const MISSING_PLAN_MARKER: &str = "Organizer Agent crashed";

/// Reviewer instructions when no usable plan exists.
pub const FALLBACK_WRITER_INSTRUCTIONS: &str = "General professional standards.";

/// Structured writing plan produced by the Organizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub subject: String,
    pub length: u32,
    pub target: String,
    pub title: String,
    pub header: String,
    pub question: String,
    pub content: String,
    pub steps: Vec<String>,
    pub instructions_for_writer: String,
}

impl Plan {
    pub fn output_schema() -> Result<OutputSchema, GenerationError> {
        let schema = serde_json::from_str(PLAN_SCHEMA_JSON)
            .map_err(|e| GenerationError::Parse(format!("Invalid embedded plan schema: {}", e)))?;
        Ok(OutputSchema::new(
            "Plan",
            "Structured writing plan for the article",
            schema,
        ))
    }

    /// Validates a structured reply against `schema` and converts it.
    pub fn from_value(
        value: serde_json::Value,
        schema: &OutputSchema,
    ) -> Result<Self, GenerationError> {
        schema.validate(&value)?;
        serde_json::from_value(value).map_err(|e| GenerationError::Parse(e.to_string()))
    }

    /// Lossless JSON rendering handed to the Writer.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| format!("{:?}", self))
    }
}

/// Result of the Organizer stage: a usable plan or a degraded marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanOutcome {
    Ready(Plan),
    Degraded { reason: String },
}

impl PlanOutcome {
    pub fn degraded(reason: impl Into<String>) -> Self {
        PlanOutcome::Degraded {
            reason: reason.into(),
        }
    }

    pub fn as_plan(&self) -> Option<&Plan> {
        match self {
            PlanOutcome::Ready(plan) => Some(plan),
            PlanOutcome::Degraded { .. } => None,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, PlanOutcome::Degraded { .. })
    }

    /// Plan text for the Writer prompt.
    pub fn writer_input(&self) -> String {
        match self {
            PlanOutcome::Ready(plan) => plan.to_json(),
            PlanOutcome::Degraded { .. } => DEGRADED_PLAN_MARKER.to_string(),
        }
    }

    /// Instructions the Reviewer grades against.
    pub fn writer_instructions(&self) -> &str {
        match self {
            PlanOutcome::Ready(plan) => &plan.instructions_for_writer,
            PlanOutcome::Degraded { .. } => FALLBACK_WRITER_INSTRUCTIONS,
        }
    }
}

impl std::fmt::Display for PlanOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.writer_input())
    }
}

/// A ready plan serializes as its record, a degraded one as the marker string.
impl Serialize for PlanOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PlanOutcome::Ready(plan) => plan.serialize(serializer),
            PlanOutcome::Degraded { .. } => serializer.serialize_str(DEGRADED_PLAN_MARKER),
        }
    }
}
