//! Diff record types.

use serde::{Deserialize, Serialize};

/// Classification of one diff record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffKind {
    Addition,
    Deletion,
    /// A removed run immediately replaced by an added run at the same
    /// position; carries both sides.
    Change,
}

/// One contiguous diff run.
///
/// `line_number` is the 1-based line at which the run starts in the merged
/// view (original and modified lines interleaved); word-level records carry
/// no line number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffRecord {
    pub kind: DiffKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_number: Option<usize>,
}

impl DiffRecord {
    pub fn addition(text: impl Into<String>, line_number: Option<usize>) -> Self {
        DiffRecord {
            kind: DiffKind::Addition,
            original_text: None,
            modified_text: Some(text.into()),
            line_number,
        }
    }

    pub fn deletion(text: impl Into<String>, line_number: Option<usize>) -> Self {
        DiffRecord {
            kind: DiffKind::Deletion,
            original_text: Some(text.into()),
            modified_text: None,
            line_number,
        }
    }

    pub fn change(
        original: impl Into<String>,
        modified: impl Into<String>,
        line_number: Option<usize>,
    ) -> Self {
        DiffRecord {
            kind: DiffKind::Change,
            original_text: Some(original.into()),
            modified_text: Some(modified.into()),
            line_number,
        }
    }
}

/// Diff of one named component, with a human-readable summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentDiff {
    pub component_name: String,
    pub records: Vec<DiffRecord>,
    /// E.g. `"2 addition(s), 1 deletion(s)"`, or `"No changes"`.
    pub summary: String,
    pub has_changes: bool,
}
