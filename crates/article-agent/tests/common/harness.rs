//! Test harness for isolated pipeline execution.
//!
//! The `TestHarness` owns a temporary directory for config and secret files
//! and runs the pipeline against a [`CannedGenerator`], capturing every
//! progress event.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tempfile::TempDir;

use article_agent::{
    ArticleRequest, CannedGenerator, Pipeline, PipelineConfig, PipelineContext, PipelineError,
    ProgressEvent, ProgressReporter, Stage,
};

/// Progress reporter that keeps every event for later assertions.
#[derive(Default)]
pub struct RecordingProgress {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingProgress {
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Stages in the order they reported completion.
    pub fn completed_stages(&self) -> Vec<Stage> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ProgressEvent::StageCompleted { stage, .. } => Some(stage),
                _ => None,
            })
            .collect()
    }

    pub fn notices(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ProgressEvent::Notice { message, .. } => Some(message),
                _ => None,
            })
            .collect()
    }
}

impl ProgressReporter for RecordingProgress {
    fn report(&self, event: ProgressEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Test harness providing an isolated environment for integration tests.
pub struct TestHarness {
    temp_dir: TempDir,
    pub generator: Arc<CannedGenerator>,
    pub progress: RecordingProgress,
    config: PipelineConfig,
}

impl TestHarness {
    pub fn new(generator: CannedGenerator) -> Self {
        Self::with_config(generator, PipelineConfig::default())
    }

    pub fn with_config(generator: CannedGenerator, config: PipelineConfig) -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp directory"),
            generator: Arc::new(generator),
            progress: RecordingProgress::default(),
            config,
        }
    }

    pub fn pipeline(&self) -> Pipeline {
        Pipeline::new(
            self.generator.clone(),
            Arc::new(PipelineConfig {
                prompts: self.config.prompts.clone(),
                call_timeout: self.config.call_timeout,
            }),
        )
    }

    /// Run all stages, recording progress.
    pub async fn run(&self, request: ArticleRequest) -> Result<PipelineContext, PipelineError> {
        self.pipeline().run_request(request, &self.progress).await
    }

    /// Write a file into the temp directory and return its path.
    pub fn write_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        std::fs::write(&path, content).expect("Failed to write test file");
        path
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }
}
