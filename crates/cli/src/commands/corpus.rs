//! Corpus command handler: lists the policy documents and their lifecycle.

use clap::Args;
use policy_core::{config::AppConfig, AppResult};
use policy_knowledge::{CorpusManifest, DocumentStore};

/// List the loaded policy documents
#[derive(Args, Debug)]
pub struct CorpusCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl CorpusCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing corpus command");

        let manifest_path = config.corpus_manifest_path();
        let manifest = CorpusManifest::load_or_reference(&manifest_path)?;
        let documents = DocumentStore::new(config.workspace.clone(), manifest).load()?;

        if self.json {
            let output: Vec<_> = documents
                .iter()
                .map(|d| {
                    serde_json::json!({
                        "source": d.id(),
                        "status": d.status(),
                        "version": d.metadata().version,
                        "year": d.metadata().year,
                        "bytes": d.content().len(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("Corpus ({} documents):", documents.len());
            for doc in &documents {
                let meta = doc.metadata();
                println!(
                    "- {} [{}] v{} ({})",
                    doc.id(),
                    meta.status,
                    meta.version,
                    meta.year
                );
            }
        }

        Ok(())
    }
}
