//! Content categories and their chunking defaults
//!
//! Each category carries the split-skill settings that work well for its
//! content shape. Chunk sizes are characters, matching the split skill's
//! `maximumPageLength` unit.

use std::fmt::{self, Display, Formatter};

use serde::Serialize;

/// Broad content category of a file, derived from its extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Code,
    Documents,
    Structured,
    Spreadsheets,
    Media,
    Unknown,
}

impl Category {
    /// The categories in reporting order, `Unknown` last
    pub const ALL: [Category; 6] = [
        Category::Code,
        Category::Documents,
        Category::Structured,
        Category::Spreadsheets,
        Category::Media,
        Category::Unknown,
    ];

    /// File extensions belonging to this category (lowercase, with dot)
    ///
    /// `.html`/`.htm` are markup but read like documents once text is
    /// extracted, so they count as `Documents` rather than `Code`.
    #[must_use]
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Category::Code => &[
                ".py", ".js", ".ts", ".java", ".cpp", ".c", ".cs", ".go", ".rb", ".php", ".css",
                ".scss", ".tsx", ".jsx", ".rs",
            ],
            Category::Documents => &[
                ".pdf", ".docx", ".doc", ".pptx", ".ppt", ".txt", ".md", ".rtf", ".html", ".htm",
            ],
            Category::Structured => &[".json", ".xml", ".yaml", ".yml", ".toml", ".ini"],
            Category::Spreadsheets => &[".xlsx", ".xls", ".csv"],
            Category::Media => &[".png", ".jpg", ".jpeg", ".gif", ".svg", ".mp4", ".mp3", ".wav"],
            Category::Unknown => &[],
        }
    }

    /// Suggested split-skill chunk size for this category
    #[must_use]
    pub fn chunk_size(&self) -> u32 {
        match self {
            Category::Code => 3000,
            Category::Documents => 2000,
            Category::Structured => 5000,
            Category::Spreadsheets => 4000,
            Category::Media => 0,
            Category::Unknown => 2000,
        }
    }

    /// Suggested overlap between adjacent chunks
    #[must_use]
    pub fn chunk_overlap(&self) -> u32 {
        match self {
            Category::Code => 200,
            Category::Documents => 100,
            Category::Structured => 0,
            Category::Spreadsheets => 50,
            Category::Media => 0,
            Category::Unknown => 100,
        }
    }

    /// One-line rationale for the chunking defaults
    #[must_use]
    pub fn note(&self) -> &'static str {
        match self {
            Category::Code => "Larger chunks preserve function and context boundaries.",
            Category::Documents => "Paragraph-sized chunks with slight overlap for coherence.",
            Category::Structured => "Keep structure intact; no overlap to avoid syntax breaks.",
            Category::Spreadsheets => "Balance row context with chunk size.",
            Category::Media => "Media is not text-indexed; consider captions or transcripts.",
            Category::Unknown => "Unrecognized content; document defaults apply.",
        }
    }

    /// Classifies a file extension (lowercase comparison, dot optional)
    #[must_use]
    pub fn for_extension(ext: &str) -> Category {
        let normalized = if ext.starts_with('.') {
            ext.to_lowercase()
        } else {
            format!(".{}", ext.to_lowercase())
        };
        for category in Category::ALL {
            if category.extensions().contains(&normalized.as_str()) {
                return category;
            }
        }
        Category::Unknown
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let label = match self {
            Category::Code => "CODE",
            Category::Documents => "DOCUMENTS",
            Category::Structured => "STRUCTURED",
            Category::Spreadsheets => "SPREADSHEETS",
            Category::Media => "MEDIA",
            Category::Unknown => "UNKNOWN",
        };
        write!(f, "{label}")
    }
}
