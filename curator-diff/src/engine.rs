//! Line- and word-granularity diff computation.

use similar::{ChangeTag, TextDiff};

use crate::records::{ComponentDiff, DiffKind, DiffRecord};

/// Whitespace-insensitive edit gate.
///
/// True iff `a` and `b` differ after collapsing every whitespace run to a
/// single space and trimming both ends. Pure reformatting is never a change.
pub fn has_significant_changes(a: &str, b: &str) -> bool {
    normalize_whitespace(a) != normalize_whitespace(b)
}

fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Line-granularity diff.
///
/// Each contiguous run of added lines becomes one `Addition` record holding
/// the trailing-whitespace-trimmed block and the 1-based line at which the
/// run starts in the merged view; removed runs become `Deletion` records
/// likewise. A removed run immediately followed by an added run coalesces
/// into a single `Change` record carrying both blocks. Unchanged runs only
/// advance the line counter. Output is deterministic for identical inputs.
pub fn diff_lines(original: &str, modified: &str) -> Vec<DiffRecord> {
    // Normalize endings and guarantee a trailing newline so a final line
    // without one still compares equal to its terminated counterpart.
    let original = with_trailing_newline(normalize_line_endings(original));
    let modified = with_trailing_newline(normalize_line_endings(modified));
    let diff = TextDiff::from_lines(original.as_str(), modified.as_str());

    struct Run {
        tag: ChangeTag,
        lines: Vec<String>,
        start: usize,
        end: usize,
    }

    let mut runs: Vec<Run> = Vec::new();
    let mut line = 1usize;
    for change in diff.iter_all_changes() {
        let tag = change.tag();
        if tag != ChangeTag::Equal {
            let text = change.value().trim_end_matches('\n').to_string();
            match runs.last_mut() {
                Some(run) if run.tag == tag && run.end == line => {
                    run.lines.push(text);
                    run.end = line + 1;
                }
                _ => runs.push(Run {
                    tag,
                    lines: vec![text],
                    start: line,
                    end: line + 1,
                }),
            }
        }
        line += 1;
    }

    let block = |run: &Run| run.lines.join("\n").trim_end().to_string();

    let mut records = Vec::new();
    let mut i = 0;
    while i < runs.len() {
        let run = &runs[i];
        if run.tag == ChangeTag::Delete && i + 1 < runs.len() {
            let next = &runs[i + 1];
            // Coalesce only when the added run directly follows the removed
            // one in the merged view, with no unchanged lines between.
            if next.tag == ChangeTag::Insert && next.start == run.end {
                records.push(DiffRecord::change(block(run), block(next), Some(run.start)));
                i += 2;
                continue;
            }
        }
        match run.tag {
            ChangeTag::Insert => records.push(DiffRecord::addition(block(run), Some(run.start))),
            ChangeTag::Delete => records.push(DiffRecord::deletion(block(run), Some(run.start))),
            ChangeTag::Equal => unreachable!("equal runs are never collected"),
        }
        i += 1;
    }
    records
}

/// Word-granularity diff: a flat list of `Addition`/`Deletion` records with
/// no line numbers and no coalescing.
///
/// Contiguous added or removed tokens (words and the whitespace between
/// them) are grouped into one record; correction extraction depends on the
/// raw deletion/addition adjacency this preserves.
pub fn diff_words(original: &str, modified: &str) -> Vec<DiffRecord> {
    let diff = TextDiff::from_words(original, modified);

    let mut records: Vec<DiffRecord> = Vec::new();
    let mut last_tag: Option<ChangeTag> = None;
    for change in diff.iter_all_changes() {
        let tag = change.tag();
        match tag {
            ChangeTag::Equal => {}
            ChangeTag::Insert => {
                match records.last_mut() {
                    Some(last)
                        if last.kind == DiffKind::Addition
                            && last_tag == Some(ChangeTag::Insert) =>
                    {
                        last.modified_text
                            .get_or_insert_with(String::new)
                            .push_str(change.value());
                    }
                    _ => records.push(DiffRecord::addition(change.value(), None)),
                }
            }
            ChangeTag::Delete => match records.last_mut() {
                Some(last)
                    if last.kind == DiffKind::Deletion && last_tag == Some(ChangeTag::Delete) =>
                {
                    last.original_text
                        .get_or_insert_with(String::new)
                        .push_str(change.value());
                }
                _ => records.push(DiffRecord::deletion(change.value(), None)),
            },
        }
        last_tag = Some(tag);
    }
    records
}

/// Diff one component and summarize the result.
///
/// The summary reads `"N addition(s), M deletion(s)"`, omitting a clause
/// whose count is zero; a `Change` record counts toward both. `"No changes"`
/// when the diff is empty.
pub fn summarize(component_name: &str, original: &str, modified: &str) -> ComponentDiff {
    let records = diff_lines(original, modified);
    let additions = records
        .iter()
        .filter(|r| matches!(r.kind, DiffKind::Addition | DiffKind::Change))
        .count();
    let deletions = records
        .iter()
        .filter(|r| matches!(r.kind, DiffKind::Deletion | DiffKind::Change))
        .count();
    let summary = match (additions, deletions) {
        (0, 0) => "No changes".to_string(),
        (a, 0) => format!("{a} addition(s)"),
        (0, d) => format!("{d} deletion(s)"),
        (a, d) => format!("{a} addition(s), {d} deletion(s)"),
    };
    ComponentDiff {
        component_name: component_name.to_string(),
        has_changes: !records.is_empty(),
        records,
        summary,
    }
}

fn normalize_line_endings(content: &str) -> String {
    content.replace("\r\n", "\n")
}

fn with_trailing_newline(mut s: String) -> String {
    if !s.is_empty() && !s.ends_with('\n') {
        s.push('\n');
    }
    s
}
