use std::future::Future;
use std::sync::Arc;

use tracing::{debug, info, info_span, warn, Instrument};

use crate::config::{render, sanitize_for_prompt, AgentConfig};
use crate::generation::{ChatMessage, GenerationError, GenerationService};

use super::config::PipelineConfig;
use super::context::PipelineContext;
use super::error::{PipelineError, PipelineWarning};
use super::plan::{Plan, PlanOutcome, MISSING_PLAN_MARKER};
use super::progress::{NoopProgress, ProgressEvent, ProgressReporter};
use super::stage::Stage;
use super::state::{ArticleRequest, PipelineState, StateUpdate};

pub struct Pipeline {
    service: Arc<dyn GenerationService>,
    config: Arc<PipelineConfig>,
}

impl Pipeline {
    pub fn new(service: Arc<dyn GenerationService>, config: Arc<PipelineConfig>) -> Self {
        Self { service, config }
    }

    /// Production constructor: prompts and timeout come from the loaded config.
    pub fn from_config(service: Arc<dyn GenerationService>, config: &AgentConfig) -> Self {
        Self::new(service, Arc::new(PipelineConfig::from_config(config)))
    }

    /// Runs all four stages for a fresh request.
    pub async fn run_request(
        &self,
        request: ArticleRequest,
        progress: &dyn ProgressReporter,
    ) -> Result<PipelineContext, PipelineError> {
        self.run(PipelineContext::new(request), progress).await
    }

    /// Runs Organizer, Writer, Editor and Reviewer in order, merging each
    /// stage's update into `ctx.state`.
    ///
    /// A Writer, Editor or Reviewer failure aborts the run and no state is
    /// returned. Dropping the returned future cancels the in-flight call.
    pub async fn run(
        &self,
        mut ctx: PipelineContext,
        progress: &dyn ProgressReporter,
    ) -> Result<PipelineContext, PipelineError> {
        let span = info_span!("pipeline",
            run_id = %ctx.run_id,
            subject = %ctx.state.subject,
            length = ctx.state.length,
        );

        async move {
            for stage in Stage::ALL {
                progress.report(ProgressEvent::StageStarted {
                    stage,
                    message: stage.activity().to_string(),
                });

                let update = match self.execute(stage, &ctx.state, progress).await {
                    Ok(update) => update,
                    Err(e) => {
                        warn!(%stage, error = %e, "Pipeline aborted");
                        progress.report(ProgressEvent::Failed {
                            stage: Some(stage),
                            error: e.to_string(),
                        });
                        return Err(e);
                    }
                };

                if let StateUpdate::Plan(PlanOutcome::Degraded { reason }) = &update {
                    ctx.warnings.push(PipelineWarning::PlanDegraded {
                        reason: reason.clone(),
                    });
                }

                progress.report(ProgressEvent::StageCompleted {
                    stage,
                    update: update.clone(),
                });
                ctx.state.merge(update);
            }

            info!(warnings = ctx.warnings.len(), "Pipeline completed");
            progress.report(ProgressEvent::Completed);
            Ok(ctx)
        }
        .instrument(span)
        .await
    }

    /// Runs one stage against `state` without merging its update.
    pub async fn run_stage(
        &self,
        stage: Stage,
        state: &PipelineState,
    ) -> Result<StateUpdate, PipelineError> {
        self.execute(stage, state, &NoopProgress).await
    }

    async fn execute(
        &self,
        stage: Stage,
        state: &PipelineState,
        progress: &dyn ProgressReporter,
    ) -> Result<StateUpdate, PipelineError> {
        let span = info_span!("stage", stage = %stage);
        async move {
            match stage {
                Stage::Organizer => Ok(self.step_organize(state, progress).await),
                Stage::Writer => self.step_write(state).await,
                Stage::Editor => self.step_edit(state).await,
                Stage::Reviewer => self.step_review(state).await,
            }
        }
        .instrument(span)
        .await
    }

    /// Never fails: any planning error degrades the plan instead.
    async fn step_organize(
        &self,
        state: &PipelineState,
        progress: &dyn ProgressReporter,
    ) -> StateUpdate {
        let outcome = match self.request_plan(state).await {
            Ok(plan) => {
                debug!(title = %plan.title, steps = plan.steps.len(), "Plan ready");
                PlanOutcome::Ready(plan)
            }
            Err(e) => {
                let reason = e.to_string();
                warn!(%reason, "Organizer failed, continuing with degraded plan");
                progress.report(ProgressEvent::Notice {
                    stage: Stage::Organizer,
                    message: format!("Organizer error: {}", reason),
                });
                PlanOutcome::degraded(reason)
            }
        };

        StateUpdate::Plan(outcome)
    }

    async fn request_plan(&self, state: &PipelineState) -> Result<Plan, PipelineError> {
        let stage = Stage::Organizer;
        let schema = Plan::output_schema()
            .map_err(|source| PipelineError::Generation { stage, source })?;

        let length = state.length.to_string();
        let subject = sanitize_for_prompt(&state.subject);
        let target = sanitize_for_prompt(&state.target);
        let content = sanitize_for_prompt(&state.content);
        let prompt = render(
            &self.config.prompts.organizer,
            &[
                ("subject", subject.as_str()),
                ("length", length.as_str()),
                ("target", target.as_str()),
                ("content", content.as_str()),
            ],
        );
        debug!(chars = prompt.len(), "Organizer prompt built");

        let value = self
            .call(stage, self.service.complete_structured(&prompt, &schema))
            .await?;

        Plan::from_value(value, &schema).map_err(|source| PipelineError::Generation { stage, source })
    }

    async fn step_write(&self, state: &PipelineState) -> Result<StateUpdate, PipelineError> {
        let plan_text = state
            .plan
            .as_ref()
            .map(PlanOutcome::writer_input)
            .unwrap_or_else(|| MISSING_PLAN_MARKER.to_string());

        let prompt = render(&self.config.prompts.writer, &[("plan", plan_text.as_str())]);
        let messages = [ChatMessage::user(prompt)];

        let article = self
            .call(Stage::Writer, self.service.complete(&messages))
            .await?;
        debug!(chars = article.len(), "Article drafted");
        Ok(StateUpdate::Article(article))
    }

    async fn step_edit(&self, state: &PipelineState) -> Result<StateUpdate, PipelineError> {
        let article = state.article.clone().unwrap_or_default();
        let messages = [
            ChatMessage::system(self.config.prompts.editor.clone()),
            ChatMessage::user(article),
        ];

        let result = self
            .call(Stage::Editor, self.service.complete(&messages))
            .await?;
        debug!(chars = result.len(), "Article formatted");
        Ok(StateUpdate::Result(result))
    }

    async fn step_review(&self, state: &PipelineState) -> Result<StateUpdate, PipelineError> {
        let result = state.result.as_deref().unwrap_or_default();
        let instructions = state
            .plan
            .as_ref()
            .map(PlanOutcome::writer_instructions)
            .unwrap_or(super::plan::FALLBACK_WRITER_INSTRUCTIONS);

        let messages = [
            ChatMessage::system(self.config.prompts.reviewer.clone()),
            ChatMessage::user(format!(
                "INSTRUCTIONS:\n{}\n\nARTICLE:\n{}",
                instructions, result
            )),
        ];

        let rating = self
            .call(Stage::Reviewer, self.service.complete(&messages))
            .await?;
        Ok(StateUpdate::Rating(rating))
    }

    /// Awaits one generation call under the configured timeout.
    async fn call<T>(
        &self,
        stage: Stage,
        request: impl Future<Output = Result<T, GenerationError>>,
    ) -> Result<T, PipelineError> {
        match tokio::time::timeout(self.config.call_timeout, request).await {
            Ok(result) => result.map_err(|source| PipelineError::Generation { stage, source }),
            Err(_) => Err(PipelineError::Timeout {
                stage,
                secs: self.config.call_timeout.as_secs(),
            }),
        }
    }
}
