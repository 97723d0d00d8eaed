//! List command implementation.

use anyhow::{Context, Result};
use clipshelf::model::sort_newest_first;
use clipshelf::{ClipStore, ClippedPage};
use serde::Serialize;

use crate::OutputFormat;

#[derive(Serialize)]
struct ListOutput {
    clips: Vec<ClippedPage>,
    total: usize,
}

pub async fn run(store: &ClipStore, format: OutputFormat) -> Result<()> {
    let mut clips = store.get_all_pages().await.context("list failed")?;
    sort_newest_first(&mut clips);

    let output = ListOutput {
        total: clips.len(),
        clips,
    };

    match format {
        OutputFormat::Text => {
            if output.clips.is_empty() {
                println!("No clips saved.");
            } else {
                println!(
                    "{:>6}  {:<40} {:>8} {:>6}  {}",
                    "ID", "TITLE", "WORDS", "MIN", "SAVED"
                );
                println!("{}", "-".repeat(90));
                for clip in &output.clips {
                    println!(
                        "{:>6}  {:<40} {:>8} {:>6}  {}",
                        clip.id,
                        truncate(&clip.title, 40),
                        clip.word_count,
                        clip.reading_time,
                        clip.timestamp.format("%Y-%m-%d %H:%M")
                    );
                }
                println!();
                println!("Total: {} clip(s)", output.total);
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 40), "short");
        assert_eq!(truncate("abcdefghij", 8), "abcde...");
        assert_eq!(truncate("ééééé", 4), "é...");
    }
}
