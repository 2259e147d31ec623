//! Ingest command handler.
//!
//! Indexes a PDF or DOCX file, replacing any previously indexed document.

use clap::Args;
use docqa_core::{config::AppConfig, AppResult};
use docqa_knowledge::{DocQa, IngestReport};
use std::path::PathBuf;
use std::process::ExitCode;

/// Index a PDF or DOCX document
#[derive(Args, Debug)]
pub struct IngestCommand {
    /// Path to the document
    pub file: PathBuf,

    /// Words per chunk (default from config)
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl IngestCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<ExitCode> {
        tracing::info!("Executing ingest command for {:?}", self.file);

        let mut config = config.clone();
        if let Some(chunk_size) = self.chunk_size {
            config.chunk_size = chunk_size;
        }
        config.ensure_storage_dir()?;

        let qa = DocQa::from_config(&config)?;
        let report = qa.ingest_path(&self.file).await?;

        if self.json {
            super::print_json(&serde_json::json!({
                "message": IngestReport::MESSAGE,
                "fileName": report.file_name,
                "format": report.format.as_str(),
                "chunks": report.chunks,
                "dimensions": report.dimensions,
                "durationSecs": report.duration_secs,
            }))?;
        } else {
            println!("{}", IngestReport::MESSAGE);
            println!(
                "{} ({}): {} chunks in {:.2}s",
                report.file_name, report.format, report.chunks, report.duration_secs
            );
        }

        Ok(ExitCode::SUCCESS)
    }
}
