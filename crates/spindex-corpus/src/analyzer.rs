//! Corpus scan and vertical recommendation
//!
//! Walks the given path, tallies files by category, and picks the dominant
//! category by file count, with total byte size breaking ties. `Unknown`
//! never wins unless no file was recognized at all.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tracing::debug;
use walkdir::WalkDir;

use crate::category::Category;

/// Per-category tally of the scanned corpus
#[derive(Debug, Clone, Serialize)]
pub struct CategoryTally {
    pub category: Category,
    pub count: u64,
    pub size_bytes: u64,
    /// Count per extension within this category
    pub extensions: BTreeMap<String, u64>,
}

impl CategoryTally {
    fn new(category: Category) -> Self {
        Self {
            category,
            count: 0,
            size_bytes: 0,
            extensions: BTreeMap::new(),
        }
    }
}

/// Analysis result with suggested provisioning settings
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub recommended: Category,
    /// Heuristic confidence in `[0, 1]`
    pub confidence: f64,
    pub reasoning: String,
    pub total_files: u64,
    pub counts_by_category: Vec<CategoryTally>,
    pub suggested_chunk_size: u32,
    pub suggested_overlap: u32,
    /// Comma-separated extension list for the indexer configuration
    pub indexed_extensions: String,
}

/// Scans `path` (a file or directory, recursively) and recommends a vertical
pub fn analyze(path: &Path) -> Result<Recommendation> {
    if !path.exists() {
        bail!("Path not found: {}", path.display());
    }

    let mut counts_by_category: Vec<CategoryTally> =
        Category::ALL.iter().map(|&c| CategoryTally::new(c)).collect();

    let mut total_files = 0u64;
    for entry in WalkDir::new(path) {
        let entry = entry.with_context(|| format!("Failed to scan {}", path.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let ext = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_lowercase()))
            .unwrap_or_default();
        let category = Category::for_extension(&ext);
        let size = entry.metadata().map(|m| m.len()).unwrap_or(0);

        let tally = &mut counts_by_category[position_of(category)];
        tally.count += 1;
        tally.size_bytes += size;
        *tally.extensions.entry(ext).or_insert(0) += 1;
        total_files += 1;
    }

    debug!(path = %path.display(), total_files, "Corpus scan complete");

    let (recommended, confidence, reasoning) = choose(&counts_by_category, total_files);

    Ok(Recommendation {
        recommended,
        confidence,
        reasoning,
        total_files,
        suggested_chunk_size: recommended.chunk_size(),
        suggested_overlap: recommended.chunk_overlap(),
        indexed_extensions: indexed_extensions(recommended),
        counts_by_category,
    })
}

/// Index of `category` in [`Category::ALL`] and in the tally vector
fn position_of(category: Category) -> usize {
    Category::ALL
        .iter()
        .position(|&c| c == category)
        .unwrap_or(Category::ALL.len() - 1)
}

/// Picks the dominant category and explains the pick
fn choose(tallies: &[CategoryTally], total: u64) -> (Category, f64, String) {
    if total == 0 {
        return (Category::Unknown, 0.0, "No files found.".to_string());
    }

    let top = tallies
        .iter()
        .filter(|t| t.category != Category::Unknown)
        .max_by_key(|t| (t.count, t.size_bytes));

    let top = match top {
        Some(t) if t.count > 0 => t,
        _ => {
            return (
                Category::Unknown,
                0.1,
                "All files are of unknown types.".to_string(),
            )
        }
    };

    let share = top.count as f64 / total as f64;
    let (confidence, reasoning) = if share >= 0.9 {
        (0.95, "Clear majority of files belong to this category.")
    } else if share >= 0.75 {
        (0.85, "Strong majority; a few outliers present.")
    } else if share >= 0.6 {
        (0.7, "Majority present; consider filtering outliers if needed.")
    } else {
        (0.5, "Mixed content; recommending best fit but consider splitting.")
    };
    let mut reasoning = reasoning.to_string();

    if top.category == Category::Media {
        let documents = tallies
            .iter()
            .find(|t| t.category == Category::Documents)
            .map(|t| t.count)
            .unwrap_or(0);
        if documents > 0 {
            reasoning.push_str(" Media is not text-indexed; exclude it or add captions.");
        }
    }

    (top.category, confidence, reasoning)
}

/// Comma-separated sorted extension list for the recommended category
fn indexed_extensions(category: Category) -> String {
    let mut extensions: Vec<&str> = category.extensions().to_vec();
    extensions.sort_unstable();
    extensions.join(",")
}
