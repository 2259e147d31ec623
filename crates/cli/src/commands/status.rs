//! Status command handler.

use clap::Args;
use docqa_core::{config::AppConfig, AppResult};
use docqa_knowledge::DocQa;
use std::process::ExitCode;

/// Show whether a document is indexed
#[derive(Args, Debug)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatusCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<ExitCode> {
        tracing::info!("Executing status command");

        let qa = DocQa::from_config(config)?;
        let status = qa.status()?;

        if self.json {
            super::print_json(&serde_json::json!({
                "hasIndex": status.has_index,
                "chunks": status.chunks,
                "dimensions": status.dimensions,
                "storageDir": config.storage_dir,
            }))?;
        } else if status.has_index {
            println!(
                "Indexed document: {} chunks ({} dimensions)",
                status.chunks,
                status.dimensions.unwrap_or_default()
            );
            println!("Storage: {}", config.storage_dir.display());
        } else {
            println!("No indexed document.");
            println!("Storage: {}", config.storage_dir.display());
        }

        Ok(ExitCode::SUCCESS)
    }
}
