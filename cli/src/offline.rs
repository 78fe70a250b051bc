//! Canned generator for `--offline` runs.
//!
//! Builds deterministic replies from the request itself so the whole pipeline
//! can be exercised without network access or an API key.

use serde_json::json;

use article_agent::{ArticleRequest, CannedGenerator};

pub fn generator_for(request: &ArticleRequest) -> CannedGenerator {
    let title = format!("{}: A Guide for {}", request.subject, request.target);
    let steps = [
        format!("Introduce {}", request.subject),
        "Walk through the source notes".to_string(),
        format!("Close with takeaways for {}", request.target),
    ];

    let plan = json!({
        "subject": request.subject,
        "length": request.length,
        "target": request.target,
        "title": title,
        "header": format!("What {} should know", request.target),
        "question": format!("Why does {} matter now?", request.subject),
        "content": request.content,
        "steps": steps,
        "instructions_for_writer": format!(
            "Write about {} words for {} in a clear, friendly tone.",
            request.length, request.target
        ),
    });

    let draft = format!(
        "{}\n\n{}\n\n{}",
        title,
        request.content.trim(),
        steps.join("\n")
    );

    let body = steps
        .iter()
        .map(|step| format!("## {}\n\n{}", step, request.content.trim()))
        .collect::<Vec<_>>()
        .join("\n\n");
    let formatted = format!("# {}\n\n{}\n", title, body);

    CannedGenerator::new()
        .with_structured_reply(plan)
        .with_text_reply(draft)
        .with_text_reply(formatted)
        .with_text_reply("Rating: N/A\nNote: Offline run, no review performed.")
}
