//! End-to-end pipeline scenarios against a canned generator.

mod common;

use std::sync::Arc;

use serde_json::json;

use article_agent::pipeline::{
    ChannelProgress, PipelineContext, PipelineWarning, DEGRADED_PLAN_MARKER,
    FALLBACK_WRITER_INSTRUCTIONS,
};
use article_agent::{
    load_config_from_str, ArticleRequest, CannedGenerator, Pipeline, PipelineConfig,
    PipelineError, PipelineState, ProgressEvent, Stage, StateUpdate,
};
use common::{happy_generator, PlanBuilder, RequestBuilder, TestHarness};

#[tokio::test]
async fn test_end_to_end_scenario() {
    let harness = TestHarness::new(happy_generator());

    let ctx = harness.run(RequestBuilder::new().build()).await.unwrap();
    let state = &ctx.state;

    let plan = state.plan.as_ref().unwrap().as_plan().unwrap();
    assert_eq!(plan.title, "The Office Is Optional");
    assert_eq!(plan.steps.len(), 3);
    assert_eq!(state.article.as_deref(), Some("Remote work draft body"));
    assert!(state.result.as_deref().unwrap().starts_with("# The Office Is Optional"));

    let rating = state.parsed_rating().unwrap();
    assert_eq!(rating.score_or_placeholder(), "4/5");
    assert_eq!(
        rating.note_or_placeholder(),
        "Good pacing, needs one more source."
    );

    assert_eq!(
        harness.progress.completed_stages(),
        vec![Stage::Organizer, Stage::Writer, Stage::Editor, Stage::Reviewer]
    );
    assert!(harness.progress.notices().is_empty());
}

#[tokio::test]
async fn test_inputs_are_preserved() {
    let harness = TestHarness::new(happy_generator());
    let request = RequestBuilder::new()
        .subject("Urban gardening")
        .length(600)
        .content("Balconies can grow tomatoes.")
        .build();

    let ctx = harness.run(request.clone()).await.unwrap();

    assert_eq!(ctx.state.subject, request.subject);
    assert_eq!(ctx.state.length, 600);
    assert_eq!(ctx.state.target, request.target);
    assert_eq!(ctx.state.content, request.content);
}

#[tokio::test]
async fn test_writer_sees_plan_and_reviewer_sees_instructions() {
    let plan = PlanBuilder::new()
        .title("Gardens in the Sky")
        .instructions("Keep it under 600 words and cite one study.")
        .build();
    let generator = CannedGenerator::new()
        .with_structured_reply(plan)
        .with_text_reply("draft")
        .with_text_reply("# formatted")
        .with_text_reply("Rating: 3/5");
    let harness = TestHarness::new(generator);

    harness.run(RequestBuilder::new().build()).await.unwrap();

    let calls = harness.generator.calls();
    assert_eq!(calls[0].schema.as_deref(), Some("Plan"));
    assert!(calls[1].text().contains("Gardens in the Sky"));
    assert!(calls[3]
        .text()
        .contains("INSTRUCTIONS:\nKeep it under 600 words and cite one study."));
}

#[tokio::test]
async fn test_degraded_plan_still_produces_article() {
    let generator = CannedGenerator::new()
        .with_structured_failure("model refused tool call")
        .with_text_reply("draft without plan")
        .with_text_reply("# formatted")
        .with_text_reply("Rating: 2/5\nNote: Generic.");
    let harness = TestHarness::new(generator);

    let ctx = harness.run(RequestBuilder::new().build()).await.unwrap();

    assert!(ctx.state.plan.as_ref().unwrap().is_degraded());
    assert_eq!(ctx.state.article.as_deref(), Some("draft without plan"));
    assert!(matches!(
        ctx.warnings.as_slice(),
        [PipelineWarning::PlanDegraded { reason }] if reason.contains("model refused tool call")
    ));

    let notices = harness.progress.notices();
    assert_eq!(notices.len(), 1);
    assert!(notices[0].starts_with("Organizer error: "));

    let calls = harness.generator.calls();
    assert!(calls[1].text().contains(DEGRADED_PLAN_MARKER));
    assert!(calls[3].text().contains(FALLBACK_WRITER_INSTRUCTIONS));

    let serialized = ctx.state.to_json();
    assert_eq!(serialized["plan"], json!(DEGRADED_PLAN_MARKER));
}

#[tokio::test]
async fn test_generation_failure_returns_no_state() {
    let generator = CannedGenerator::new()
        .with_structured_reply(PlanBuilder::new().build())
        .with_text_reply("draft")
        .with_text_failure("connection reset");
    let harness = TestHarness::new(generator);

    let err = harness.run(RequestBuilder::new().build()).await.unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Generation {
            stage: Stage::Editor,
            ..
        }
    ));
    assert_eq!(
        harness.progress.completed_stages(),
        vec![Stage::Organizer, Stage::Writer]
    );
    assert!(matches!(
        harness.progress.events().last(),
        Some(ProgressEvent::Failed {
            stage: Some(Stage::Editor),
            error
        }) if error.contains("connection reset")
    ));
}

#[tokio::test]
async fn test_blank_review_completes_with_placeholders() {
    let generator = CannedGenerator::new()
        .with_structured_reply(PlanBuilder::new().build())
        .with_text_reply("draft")
        .with_text_reply("# formatted")
        .with_text_reply("");
    let harness = TestHarness::new(generator);

    let ctx = harness.run(RequestBuilder::new().build()).await.unwrap();

    assert_eq!(ctx.state.result.as_deref(), Some("# formatted"));
    assert_eq!(ctx.state.rating.as_deref(), Some(""));
    let rating = ctx.state.parsed_rating().unwrap();
    assert_eq!(rating.score_or_placeholder(), "N/A");
    assert_eq!(rating.note_or_placeholder(), "No critique available.");
    assert_eq!(
        harness.progress.events().last(),
        Some(&ProgressEvent::Completed)
    );
}

#[tokio::test]
async fn test_run_keeps_caller_run_id_for_channel_progress() {
    let ctx = PipelineContext::with_run_id("run-42", RequestBuilder::new().build());
    let (progress, mut receiver) = ChannelProgress::new(ctx.run_id.clone());
    let pipeline = Pipeline::new(
        Arc::new(happy_generator()),
        Arc::new(PipelineConfig::default()),
    );

    let ctx = pipeline.run(ctx, &progress).await.unwrap();
    assert_eq!(ctx.run_id, "run-42");
    drop(progress);

    let mut records = Vec::new();
    while let Some(record) = receiver.recv().await {
        records.push(record);
    }
    assert_eq!(records.len(), 9);
    assert!(records.iter().all(|r| r.run_id == "run-42"));
    assert!(records
        .windows(2)
        .all(|pair| pair[0].timestamp <= pair[1].timestamp));
    assert_eq!(records.last().unwrap().event, ProgressEvent::Completed);
}

#[tokio::test]
async fn test_stages_run_individually_in_sequence() {
    let pipeline = Pipeline::new(
        Arc::new(happy_generator()),
        Arc::new(PipelineConfig::default()),
    );
    let mut state = PipelineState::from_request(RequestBuilder::new().build());

    let mut keys = Vec::new();
    for stage in Stage::ALL {
        let update = pipeline.run_stage(stage, &state).await.unwrap();
        keys.push(update.key());
        state.merge(update);
    }
    assert_eq!(keys, vec!["plan", "article", "result", "rating"]);

    assert_eq!(
        state.populated_keys(),
        vec!["subject", "length", "target", "content", "plan", "article", "result", "rating"]
    );
}

#[tokio::test]
async fn test_request_from_loose_json() {
    let request = ArticleRequest::from_json(&json!({
        "subject": "Solar roofs",
        "length": 900,
        "target": "Homeowners"
    }))
    .unwrap();
    assert_eq!(request.content, "");

    let harness = TestHarness::new(happy_generator());
    let ctx = harness.run(request).await.unwrap();
    assert!(ctx.state.rating.is_some());
}

#[tokio::test]
async fn test_custom_prompts_from_config() {
    let config = load_config_from_str(
        r#"{
            "version": "1.0",
            "prompts": {
                "editor": "Format as plain Markdown with a TL;DR section."
            }
        }"#,
    )
    .unwrap();
    let harness = TestHarness::with_config(happy_generator(), PipelineConfig::from_config(&config));

    harness.run(RequestBuilder::new().build()).await.unwrap();

    let calls = harness.generator.calls();
    assert_eq!(
        calls[2].messages[0].content,
        "Format as plain Markdown with a TL;DR section."
    );
}

#[tokio::test]
async fn test_stage_updates_serialize_for_streaming() {
    let harness = TestHarness::new(happy_generator());
    harness.run(RequestBuilder::new().build()).await.unwrap();

    let updates: Vec<StateUpdate> = harness
        .progress
        .events()
        .into_iter()
        .filter_map(|e| match e {
            ProgressEvent::StageCompleted { update, .. } => Some(update),
            _ => None,
        })
        .collect();

    let plan_json = serde_json::to_value(&updates[0]).unwrap();
    assert_eq!(plan_json["key"], "plan");
    assert_eq!(plan_json["value"]["title"], "The Office Is Optional");

    let rating_json = serde_json::to_value(&updates[3]).unwrap();
    assert_eq!(rating_json["key"], "rating");
}
