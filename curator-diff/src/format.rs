//! Machine-consumption diff renderers.
//!
//! The regeneration service parses no structure out of these payloads, so
//! the exact phrasing below is a compatibility surface. Change it only as a
//! deliberate, versioned decision.

use std::fmt::Write;

use crate::records::{ComponentDiff, DiffKind, DiffRecord};

/// Render a record list as plain text for a prompt payload.
///
/// Deterministic: identical records always produce identical text.
pub fn format_for_prompt(records: &[DiffRecord]) -> String {
    let mut out = String::new();
    for record in records {
        let loc = record
            .line_number
            .map(|n| format!(" (line {n})"))
            .unwrap_or_default();
        match record.kind {
            DiffKind::Addition => {
                let _ = writeln!(
                    out,
                    "Added{loc}:\n{}",
                    record.modified_text.as_deref().unwrap_or("")
                );
            }
            DiffKind::Deletion => {
                let _ = writeln!(
                    out,
                    "Removed{loc}:\n{}",
                    record.original_text.as_deref().unwrap_or("")
                );
            }
            DiffKind::Change => {
                let _ = writeln!(
                    out,
                    "Changed{loc}:\n--- before ---\n{}\n--- after ---\n{}",
                    record.original_text.as_deref().unwrap_or(""),
                    record.modified_text.as_deref().unwrap_or("")
                );
            }
        }
    }
    out.trim_end().to_string()
}

/// Render a set of component diffs as one prompt payload, one section per
/// component that actually changed. Components without changes are skipped;
/// an empty string means nothing changed anywhere.
pub fn format_component_diffs_for_prompt(diffs: &[ComponentDiff]) -> String {
    let mut out = String::new();
    for diff in diffs.iter().filter(|d| d.has_changes) {
        let _ = writeln!(out, "=== {} ({}) ===", diff.component_name, diff.summary);
        let _ = writeln!(out, "{}", format_for_prompt(&diff.records));
        out.push('\n');
    }
    out.trim_end().to_string()
}
