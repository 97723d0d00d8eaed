//! Clear command implementation.

use anyhow::{Context, Result};
use clipshelf::ClipStore;
use serde::Serialize;

use crate::OutputFormat;

#[derive(Serialize)]
struct ClearOutput {
    removed: usize,
}

pub async fn run(store: &ClipStore, format: OutputFormat) -> Result<()> {
    let removed = store.clear_all_pages().await.context("clear failed")?;

    match format {
        OutputFormat::Text => println!("Removed {} clip(s)", removed),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&ClearOutput { removed })?);
        }
    }

    Ok(())
}
