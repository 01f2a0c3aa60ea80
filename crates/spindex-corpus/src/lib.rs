//! Spindex Corpus - corpus analysis and vertical recommendation
//!
//! Scans a directory of files destined for one search vertical, tallies
//! them by content category, and recommends the category whose chunking
//! defaults fit the corpus best. The output feeds directly into the
//! vertical overrides used at provisioning time.

pub mod analyzer;
pub mod category;

pub use analyzer::{analyze, CategoryTally, Recommendation};
pub use category::Category;
