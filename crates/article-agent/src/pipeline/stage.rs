use serde::{Deserialize, Serialize};

/// Pipeline stages in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Organizer,
    Writer,
    Editor,
    Reviewer,
}

impl Stage {
    pub const ALL: [Stage; 4] = [Stage::Organizer, Stage::Writer, Stage::Editor, Stage::Reviewer];

    pub fn name(&self) -> &'static str {
        match self {
            Stage::Organizer => "Organizer",
            Stage::Writer => "Writer",
            Stage::Editor => "Editor",
            Stage::Reviewer => "Reviewer",
        }
    }

    /// Progress message shown while the stage runs.
    pub fn activity(&self) -> &'static str {
        match self {
            Stage::Organizer => "Organizing the article plan...",
            Stage::Writer => "Writing the article...",
            Stage::Editor => "Final touches...",
            Stage::Reviewer => "Reviewing the article...",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
