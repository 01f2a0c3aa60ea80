//! Recommend command - Analyze a corpus and suggest vertical settings
//!
//! Scans the given path, tallies files by content category, and prints the
//! recommended category with its chunking defaults. The JSON output feeds
//! directly into `spindex vertical create` overrides.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use spindex_corpus::analyze;

use crate::output::{get_formatter, OutputFormat};

#[derive(Debug, Args)]
pub struct RecommendCommand {
    /// File or directory to analyze (directories are scanned recursively)
    pub path: PathBuf,
}

impl RecommendCommand {
    pub async fn execute(&self, format: OutputFormat) -> Result<()> {
        let fmt = get_formatter(format);

        let rec = analyze(&self.path)?;

        if format.is_json() {
            let json = serde_json::to_value(&rec).context("Failed to serialize recommendation")?;
            fmt.print_json(&json);
            return Ok(());
        }

        fmt.success(&format!("Recommended vertical: {}", rec.recommended));
        fmt.info(&format!("Confidence:  {:.0}%", rec.confidence * 100.0));
        fmt.info(&format!("Reasoning:   {}", rec.reasoning));
        fmt.info(&format!("Total files: {}", rec.total_files));
        fmt.info("");

        for tally in &rec.counts_by_category {
            if tally.count == 0 {
                continue;
            }
            let extensions = tally
                .extensions
                .iter()
                .map(|(ext, count)| format!("{ext}({count})"))
                .collect::<Vec<_>>()
                .join(", ");
            fmt.info(&format!(
                "{:12} files={:5} size={:>10}  {}",
                tally.category.to_string(),
                tally.count,
                human_size(tally.size_bytes),
                extensions
            ));
        }

        fmt.info("");
        fmt.info(&format!("Suggested chunk size: {}", rec.suggested_chunk_size));
        fmt.info(&format!("Suggested overlap:    {}", rec.suggested_overlap));
        if !rec.indexed_extensions.is_empty() {
            fmt.info(&format!(
                "Indexer extensions:   {}",
                rec.indexed_extensions
            ));
        }

        Ok(())
    }
}

/// Formats a byte count with a binary unit suffix
fn human_size(bytes: u64) -> String {
    let mut value = bytes as f64;
    for unit in ["B", "KB", "MB", "GB"] {
        if value < 1024.0 {
            return format!("{value:.1} {unit}");
        }
        value /= 1024.0;
    }
    format!("{value:.1} TB")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn human_size_picks_sensible_units() {
        assert_eq!(human_size(512), "512.0 B");
        assert_eq!(human_size(2048), "2.0 KB");
        assert_eq!(human_size(3 * 1024 * 1024), "3.0 MB");
    }
}
