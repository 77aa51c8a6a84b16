//! # curator-diff
//!
//! Structural text diffing for the edit orchestrator.
//!
//! [`diff_lines`] and [`diff_words`] compute deterministic diffs between two
//! text blobs; [`extract_corrections`] derives terse original→corrected pairs
//! from adjacent delete/insert runs; [`has_significant_changes`] is the single
//! whitespace-insensitive gate the session uses to decide whether a component
//! was actually edited; [`summarize`] bundles everything into a
//! [`ComponentDiff`] with a human-readable summary.
//!
//! The prompt formatters are a compatibility surface: the regeneration
//! service consumes their output as plain text, so phrasing changes must be
//! versioned deliberately.

pub mod corrections;
pub mod engine;
pub mod format;
pub mod records;

pub use corrections::extract_corrections;
pub use engine::{diff_lines, diff_words, has_significant_changes, summarize};
pub use format::{format_component_diffs_for_prompt, format_for_prompt};
pub use records::{ComponentDiff, DiffKind, DiffRecord};
