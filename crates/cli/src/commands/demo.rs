//! Demo command handler: runs the reference questions against the corpus.

use crate::commands::ask::print_text;
use clap::Args;
use policy_core::{config::AppConfig, AppResult};
use policy_knowledge::PolicyPipeline;

/// Questions covering the active-only, no-keyword and draft-visible paths.
pub const DEMO_QUESTIONS: &[&str] = &[
    "How many days can I work remotely?",
    "What is the meal allowance?",
    "Are there any plans to change the vacation policy?",
];

/// Run the reference questions and print each answer
#[derive(Args, Debug)]
pub struct DemoCommand {
    /// Also print the visibility mode and the documents kept by the filter
    #[arg(long)]
    pub show_filtered: bool,
}

impl DemoCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing demo command");

        // The corpus is embedded once and shared by every question
        let pipeline = PolicyPipeline::from_config(config).await?;

        for question in DEMO_QUESTIONS {
            println!();
            println!("==============================");
            println!("Question: {}", question);

            let outcome = pipeline.ask(question).await?;
            print_text(&outcome, self.show_filtered);
        }

        Ok(())
    }
}
