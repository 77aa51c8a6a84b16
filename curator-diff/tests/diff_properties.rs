//! Cross-function diff behavior: replay round-trips, whitespace gating,
//! correction extraction over realistic edits.

use curator_diff::{
    diff_lines, extract_corrections, has_significant_changes, summarize, DiffKind, DiffRecord,
};

/// Replay a line diff against the original text and return the
/// reconstructed modified text.
///
/// Walks the merged view using each record's start line: unchanged lines are
/// copied from the original, deletions skip original lines, additions emit
/// the recorded block, changes do both.
fn replay(original: &str, records: &[DiffRecord]) -> String {
    let original_lines: Vec<&str> = original.lines().collect();
    let mut out: Vec<String> = Vec::new();
    let mut merged_line = 1usize;
    let mut next_original = 0usize;

    for record in records {
        let start = record.line_number.expect("line diff records carry lines");
        while merged_line < start {
            out.push(original_lines[next_original].to_string());
            next_original += 1;
            merged_line += 1;
        }
        let removed = record
            .original_text
            .as_deref()
            .map(|t| t.lines().count())
            .unwrap_or(0);
        let added = record.modified_text.as_deref();
        match record.kind {
            DiffKind::Deletion => {
                next_original += removed;
                merged_line += removed;
            }
            DiffKind::Addition => {
                let block = added.expect("addition has modified text");
                out.extend(block.lines().map(str::to_string));
                merged_line += block.lines().count();
            }
            DiffKind::Change => {
                next_original += removed;
                merged_line += removed;
                let block = added.expect("change has modified text");
                out.extend(block.lines().map(str::to_string));
                merged_line += block.lines().count();
            }
        }
    }
    for line in &original_lines[next_original..] {
        out.push(line.to_string());
    }
    out.join("\n")
}

#[test]
fn diff_of_identical_text_is_empty() {
    let text = "Chapter 1\n\nIt was a dark and stormy night.\nThe rain fell in torrents.";
    assert!(diff_lines(text, text).is_empty());
}

#[test]
fn replaying_a_diff_reconstructs_the_modified_text() {
    let cases = [
        ("a\nb\nc", "a\nB\nc"),
        ("a\nb\nc", "a\nc"),
        ("a\nc", "a\nb\nc"),
        ("one\ntwo\nthree\nfour", "zero\none\nthree\nfive\nsix"),
        ("", "fresh\ncontent"),
        ("stale\ncontent", ""),
        (
            "The archive holds letters.\nMost are undated.\nSome are torn.",
            "The archive holds letters and photographs.\nMost are undated.\nA few are annotated.\nSome are torn.",
        ),
    ];
    for (original, modified) in cases {
        let records = diff_lines(original, modified);
        assert_eq!(
            replay(original, &records),
            modified,
            "replay failed for {original:?} -> {modified:?}"
        );
    }
}

#[test]
fn whitespace_only_edits_are_not_significant() {
    let original = "The quick brown fox\njumps over the lazy dog.";
    let reindented = "  The quick  brown fox jumps\n\tover the lazy dog.\n";
    assert!(!has_significant_changes(original, reindented));
    assert!(has_significant_changes(original, "The quick brown fox sleeps."));
}

#[test]
fn whitespace_only_edit_still_produces_line_records_but_no_significance() {
    // The line diff sees reflowed lines; the significance gate does not.
    let original = "alpha beta\ngamma";
    let reflowed = "alpha\nbeta gamma";
    assert!(!diff_lines(original, reflowed).is_empty());
    assert!(!has_significant_changes(original, reflowed));
}

#[test]
fn corrections_from_a_realistic_edit() {
    let original = "Adam Toze teaches economic history at Colombia University.";
    let modified = "Adam Tooze teaches economic history at Columbia University.";
    let corrections = extract_corrections(original, modified, Some("description"));
    assert_eq!(corrections.len(), 2);
    assert_eq!(corrections[0].original_text, "Toze");
    assert_eq!(corrections[0].corrected_text, "Tooze");
    assert_eq!(corrections[1].original_text, "Colombia");
    assert_eq!(corrections[1].corrected_text, "Columbia");
}

#[test]
fn title_insertion_produces_no_spurious_corrections() {
    let corrections = extract_corrections("Adam Tooze", "Professor Adam Tooze", None);
    assert!(corrections.is_empty());
}

#[test]
fn summarize_matches_record_classification() {
    let diff = summarize(
        "description",
        "line one\nline two\nline three",
        "line one\nline 2\nline three\nline four",
    );
    assert!(diff.has_changes);
    let changes = diff
        .records
        .iter()
        .filter(|r| r.kind == DiffKind::Change)
        .count();
    let additions = diff
        .records
        .iter()
        .filter(|r| r.kind == DiffKind::Addition)
        .count();
    assert_eq!(changes, 1, "line two -> line 2 should coalesce");
    assert_eq!(additions, 1, "line four is a pure addition");
    assert_eq!(diff.summary, "2 addition(s), 1 deletion(s)");
}
