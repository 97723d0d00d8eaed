//! Delete command implementation.

use anyhow::{Context, Result};
use clipshelf::{ClipId, ClipStore};
use serde::Serialize;

use crate::OutputFormat;

#[derive(Serialize)]
struct DeleteOutput {
    id: ClipId,
}

pub async fn run(store: &ClipStore, id: ClipId, format: OutputFormat) -> Result<()> {
    // Unknown ids are a silent no-op in the store
    store.delete_page(id).await.context("delete failed")?;

    match format {
        OutputFormat::Text => println!("Deleted clip {}", id),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&DeleteOutput { id })?);
        }
    }

    Ok(())
}
