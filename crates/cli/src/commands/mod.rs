//! Command handlers for the DocQA CLI.
//!
//! Each command lives in its own submodule.

pub mod ask;
pub mod ingest;
pub mod status;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use ingest::IngestCommand;
pub use status::StatusCommand;

use docqa_core::AppResult;

/// Print a JSON value to stdout.
fn print_json(value: &serde_json::Value) -> AppResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
