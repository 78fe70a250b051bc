use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;

use super::stage::Stage;
use super::state::StateUpdate;

/// Events emitted by the pipeline while it runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    StageStarted {
        stage: Stage,
        message: String,
    },
    /// Emitted after a stage returns, before its update is merged.
    StageCompleted {
        stage: Stage,
        update: StateUpdate,
    },
    /// Human-readable notice about a recovered failure.
    Notice {
        stage: Stage,
        message: String,
    },
    Completed,
    Failed {
        stage: Option<Stage>,
        error: String,
    },
}

pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// No-op reporter for unit tests.
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn report(&self, _event: ProgressEvent) {}
}

/// A progress event stamped with its run and time.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    pub run_id: String,
    pub timestamp: DateTime<Utc>,
    pub event: ProgressEvent,
}

/// Forwards events into an unbounded channel so another task can stream them.
pub struct ChannelProgress {
    run_id: String,
    sender: mpsc::UnboundedSender<ProgressRecord>,
}

impl ChannelProgress {
    pub fn new(run_id: impl Into<String>) -> (Self, mpsc::UnboundedReceiver<ProgressRecord>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            Self {
                run_id: run_id.into(),
                sender,
            },
            receiver,
        )
    }
}

impl ProgressReporter for ChannelProgress {
    fn report(&self, event: ProgressEvent) {
        let record = ProgressRecord {
            run_id: self.run_id.clone(),
            timestamp: Utc::now(),
            event,
        };
        // A dropped receiver just means nobody is watching.
        let _ = self.sender.send(record);
    }
}
