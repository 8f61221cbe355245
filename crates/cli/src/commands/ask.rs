//! Ask command handler.
//!
//! Runs one question through the policy pipeline and prints the grounded
//! answer with its sources.

use clap::Args;
use policy_core::{config::AppConfig, AppError, AppResult};
use policy_knowledge::{PolicyPipeline, QueryOutcome};

/// Ask a question about HR policy
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: String,

    /// Number of documents to retrieve (default: retrieval.topK)
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Also print the visibility mode and the documents kept by the filter
    #[arg(long)]
    pub show_filtered: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");

        if self.question.trim().is_empty() {
            return Err(AppError::Config("No question provided".to_string()));
        }

        let pipeline = PolicyPipeline::from_config(config).await?;
        let top_k = self.top_k.unwrap_or(pipeline.top_k());
        let outcome = pipeline.ask_with_top_k(&self.question, top_k).await?;

        if self.json {
            print_json(&self.question, &outcome)
        } else {
            print_text(&outcome, self.show_filtered);
            Ok(())
        }
    }
}

/// Print an outcome as pretty JSON on stdout.
pub fn print_json(question: &str, outcome: &QueryOutcome) -> AppResult<()> {
    let output = serde_json::json!({
        "question": question,
        "mode": outcome.mode,
        "answer": outcome.answer.text,
        "sources": outcome.answer.sources,
        "retrieved": outcome.retrieved.iter().map(|m| serde_json::json!({
            "source": m.source(),
            "status": m.status(),
            "score": m.score,
        })).collect::<Vec<_>>(),
        "kept": outcome.filtered.iter().map(|m| m.source()).collect::<Vec<_>>(),
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Print an outcome as plain text on stdout.
pub fn print_text(outcome: &QueryOutcome, show_filtered: bool) {
    if show_filtered {
        println!("Mode: {}", outcome.mode);
        if outcome.filtered.is_empty() {
            println!("Kept: (none)");
        } else {
            println!("Kept:");
            for m in &outcome.filtered {
                println!("- {} ({}, v{}, {})", m.source(), m.status(), m.metadata.version, m.metadata.year);
            }
        }
        println!();
    }

    println!("Answer: {}", outcome.answer.text);
    if outcome.answer.sources.is_empty() {
        println!("Source(s): (none)");
    } else {
        println!("Source(s): {}", outcome.answer.sources.join(", "));
    }
}
