//! Add command implementation.

use std::fs;

use anyhow::{anyhow, Context, Result};
use clipshelf::model::parse_timestamp;
use clipshelf::{ClipId, ClipStore, NewClip};
use serde::Serialize;

use crate::OutputFormat;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AddOutput {
    id: ClipId,
    title: String,
    url: String,
    content_bytes: usize,
}

pub async fn run(
    store: &ClipStore,
    title: String,
    url: String,
    content: Option<String>,
    file: Option<String>,
    timestamp: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    // Determine content source
    let content = match (content, file) {
        (Some(c), None) => c,
        (None, Some(f)) => {
            fs::read_to_string(&f).with_context(|| format!("failed to read file: {}", f))?
        }
        (Some(_), Some(_)) => {
            return Err(anyhow!("cannot specify both content and --file"));
        }
        (None, None) => {
            use std::io::{self, Read};
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read from stdin")?;
            buffer
        }
    };

    let mut clip = NewClip::new(title, url, content);
    if let Some(ts) = timestamp {
        let parsed =
            parse_timestamp(&ts).with_context(|| format!("invalid timestamp: {}", ts))?;
        clip = clip.with_timestamp(parsed);
    }

    let title = clip.title.clone();
    let url = clip.url.clone();
    let content_bytes = clip.content.len();

    let id = store.add_page(clip).await.context("add failed")?;

    let output = AddOutput {
        id,
        title,
        url,
        content_bytes,
    };

    match format {
        OutputFormat::Text => {
            println!("Saved clip '{}'", output.title);
            println!("  Id: {}", output.id);
            println!("  URL: {}", output.url);
            println!("  Content size: {} bytes", output.content_bytes);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
