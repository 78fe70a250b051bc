//! Parsing of the Reviewer's free-text verdict.
//!
//! The Reviewer is asked for `Rating: X/5` followed by `Note: <critique>`.
//! Models drift from that format, so parsing is lenient: a missing marker
//! yields `None` and display code falls back to placeholders.

use serde::Serialize;

pub const SCORE_PLACEHOLDER: &str = "N/A";
pub const NOTE_PLACEHOLDER: &str = "No critique available.";

const RATING_MARKER: &str = "Rating:";
const NOTE_MARKER: &str = "Note:";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Rating {
    /// Text after `Rating:` up to the end of that line, e.g. `4/5`.
    pub score: Option<String>,
    /// Everything after the first `Note:`.
    pub note: Option<String>,
}

impl Rating {
    pub fn score_or_placeholder(&self) -> &str {
        self.score.as_deref().unwrap_or(SCORE_PLACEHOLDER)
    }

    pub fn note_or_placeholder(&self) -> &str {
        self.note.as_deref().unwrap_or(NOTE_PLACEHOLDER)
    }

    /// Numeric `(value, scale)` for scores shaped like `4.5/5`.
    pub fn numeric_score(&self) -> Option<(f32, f32)> {
        let score = self.score.as_deref()?;
        let (value, scale) = score.split_once('/')?;
        let value = value.trim().parse::<f32>().ok()?;
        let scale = scale
            .split_whitespace()
            .next()?
            .parse::<f32>()
            .ok()?;
        if scale > 0.0 {
            Some((value, scale))
        } else {
            None
        }
    }
}

pub fn parse_rating(text: &str) -> Rating {
    let mut score = text.find(RATING_MARKER).map(|idx| {
        let rest = &text[idx + RATING_MARKER.len()..];
        rest.lines().next().unwrap_or_default().to_string()
    });

    let mut note = text
        .find(NOTE_MARKER)
        .map(|idx| text[idx + NOTE_MARKER.len()..].trim().to_string());

    // Single-line variant: `Rating: 4/5 | short comment`
    if note.is_none() {
        if let Some((head, tail)) = score.as_deref().and_then(|s| s.split_once('|')) {
            note = Some(tail.trim().to_string());
            score = Some(head.to_string());
        }
    }

    Rating {
        score: score.map(|s| clean_score(&s)).filter(|s| !s.is_empty()),
        note: note.filter(|n| !n.is_empty()),
    }
}

fn clean_score(raw: &str) -> String {
    raw.trim_matches(|c: char| c == '*' || c.is_whitespace())
        .to_string()
}
