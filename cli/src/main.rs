use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn};

use article_agent::config::{default_config_path, load_config, load_config_or_default};
use article_agent::pipeline::{ChannelProgress, PipelineContext, ProgressRecord};
use article_agent::{
    init_logging, AgentConfig, ArticleRequest, ChatClient, GenerationService, LogFormat,
    Pipeline, ProgressEvent, Rating, StateUpdate,
};

mod offline;

#[derive(Parser)]
#[command(name = "article-agent")]
#[command(version, about = "Plan, write, format and review an article with a hosted model", long_about = None)]
struct Cli {
    /// Article subject
    #[arg(long)]
    subject: String,

    /// Target audience
    #[arg(long)]
    target: String,

    /// Length budget
    #[arg(long, default_value_t = 1200, value_parser = clap::value_parser!(u32).range(100..=20000))]
    length: u32,

    /// Source notes for the article
    #[arg(long, conflicts_with = "content_file")]
    content: Option<String>,

    /// Read source notes from a file
    #[arg(long)]
    content_file: Option<PathBuf>,

    /// Config file (defaults to the platform config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where to write the formatted article
    #[arg(short, long, default_value = "article.md")]
    output: PathBuf,

    /// Use canned replies instead of calling the model
    #[arg(long)]
    offline: bool,

    /// Log output format (text or json)
    #[arg(long, default_value = "text")]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.log_format) {
        eprintln!("Warning: {}", e);
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let content = read_content(&cli).await?;
    if content.trim().is_empty() {
        bail!("Please enter some content first!");
    }

    let config = resolve_config(cli.config.as_ref())?;
    let request = ArticleRequest::new(&cli.subject, cli.length, &cli.target, content);

    let service: Arc<dyn GenerationService> = if cli.offline {
        info!("Offline mode, using canned replies");
        Arc::new(offline::generator_for(&request))
    } else {
        Arc::new(ChatClient::from_config(&config)?)
    };

    let pipeline = Pipeline::from_config(service, &config);
    let ctx = PipelineContext::new(request);
    let (progress, receiver) = ChannelProgress::new(ctx.run_id.clone());
    let printer = tokio::spawn(print_progress(receiver));

    let outcome = tokio::select! {
        outcome = pipeline.run(ctx, &progress) => outcome,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, abandoning run");
            bail!("Interrupted");
        }
    };
    drop(progress);
    printer.await.ok();

    let state = outcome?.into_state();

    let result = state.result.as_deref().unwrap_or_default();
    tokio::fs::write(&cli.output, result)
        .await
        .with_context(|| format!("Failed to write {}", cli.output.display()))?;
    println!("Article written to {}", cli.output.display());

    let rating = state.parsed_rating().unwrap_or_default();
    println!("Rating: {}", rating.score_or_placeholder());
    if let Some(line) = percent_line(&rating) {
        println!("{}", line);
    }
    println!("Note: {}", rating.note_or_placeholder());

    Ok(())
}

/// `Score: 90%` for numeric ratings such as `4.5/5`.
fn percent_line(rating: &Rating) -> Option<String> {
    let (value, scale) = rating.numeric_score()?;
    Some(format!("Score: {:.0}%", value / scale * 100.0))
}

async fn read_content(cli: &Cli) -> Result<String> {
    if let Some(path) = &cli.content_file {
        return tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()));
    }
    Ok(cli.content.clone().unwrap_or_default())
}

fn resolve_config(path: Option<&PathBuf>) -> Result<AgentConfig> {
    match path {
        // An explicit path must exist.
        Some(path) => load_config(path).with_context(|| format!("Loading {}", path.display())),
        None => match default_config_path() {
            Some(path) => Ok(load_config_or_default(path)?),
            None => Ok(AgentConfig::default()),
        },
    }
}

async fn print_progress(mut receiver: tokio::sync::mpsc::UnboundedReceiver<ProgressRecord>) {
    while let Some(record) = receiver.recv().await {
        match record.event {
            ProgressEvent::StageStarted { message, .. } => eprintln!("{}", message),
            ProgressEvent::StageCompleted { stage, update } => {
                println!("Step {} complete...", stage);
                if let StateUpdate::Plan(plan) = &update {
                    if let Some(plan) = plan.as_plan() {
                        println!("  Title: {}", plan.title);
                    }
                }
            }
            ProgressEvent::Notice { message, .. } => eprintln!("{}", message),
            ProgressEvent::Completed => println!("Done."),
            ProgressEvent::Failed { error, .. } => eprintln!("Failed: {}", error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use article_agent::parse_rating;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from([
            "article-agent",
            "--subject",
            "Bees",
            "--target",
            "Gardeners",
            "--content",
            "Bees pollinate.",
        ])
        .unwrap();
        assert_eq!(cli.length, 1200);
        assert_eq!(cli.output, PathBuf::from("article.md"));
        assert_eq!(cli.log_format, LogFormat::Text);
        assert!(!cli.offline);
    }

    #[test]
    fn test_cli_rejects_out_of_range_length() {
        let result = Cli::try_parse_from([
            "article-agent",
            "--subject",
            "Bees",
            "--target",
            "Gardeners",
            "--length",
            "50",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_content_sources_conflict() {
        let result = Cli::try_parse_from([
            "article-agent",
            "--subject",
            "Bees",
            "--target",
            "Gardeners",
            "--content",
            "x",
            "--content-file",
            "notes.txt",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_percent_line_for_numeric_ratings() {
        assert_eq!(
            percent_line(&parse_rating("Rating: 4.5/5\nNote: ok")).as_deref(),
            Some("Score: 90%")
        );
        assert_eq!(percent_line(&parse_rating("Rating: N/A")), None);
        assert_eq!(percent_line(&parse_rating("")), None);
    }

    #[tokio::test]
    async fn test_empty_content_is_rejected() {
        let cli = Cli::try_parse_from([
            "article-agent",
            "--subject",
            "Bees",
            "--target",
            "Gardeners",
            "--content",
            "   ",
            "--offline",
        ])
        .unwrap();

        let err = run(cli).await.unwrap_err();
        assert_eq!(err.to_string(), "Please enter some content first!");
    }
}
