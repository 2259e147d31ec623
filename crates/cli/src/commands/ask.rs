//! Ask command handler.
//!
//! Answers a question about the indexed document.

use clap::Args;
use docqa_core::{config::AppConfig, AppResult};
use docqa_knowledge::{Answer, DocQa};
use std::process::ExitCode;

/// Ask a question about the indexed document
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub query: String,

    /// Number of chunks to retrieve (default from config)
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<ExitCode> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        let qa = DocQa::from_config(config)?;
        let answer = qa.ask(&self.query, self.top_k).await?;

        tracing::debug!("Answer status: {}", answer.status());

        if self.json {
            super::print_json(&answer_json(&answer))?;
        } else if answer.is_failure() {
            eprintln!("{}", answer.render());
        } else {
            println!("{}", answer.render());
        }

        Ok(if answer.is_failure() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        })
    }
}

fn answer_json(answer: &Answer) -> serde_json::Value {
    let mut output = serde_json::json!({
        "answer": answer.render(),
        "status": answer.status(),
    });

    if let Answer::Failed { message, .. } = answer {
        output["error"] = serde_json::Value::String(message.clone());
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_json_generated() {
        let value = answer_json(&Answer::Generated("Rust, SQL".to_string()));
        assert_eq!(value["answer"], "Rust, SQL");
        assert_eq!(value["status"], "generated");
        assert!(value.get("error").is_none());
    }

    #[test]
    fn test_answer_json_failed() {
        let value = answer_json(&Answer::Failed {
            provider: "Gemini".to_string(),
            message: "quota exceeded".to_string(),
        });
        assert_eq!(value["answer"], "Gemini error: quota exceeded");
        assert_eq!(value["status"], "failed");
        assert_eq!(value["error"], "quota exceeded");
    }
}
