//! Correction extraction from word-level diffs.

use curator_core::Correction;

use crate::engine::diff_words;
use crate::records::DiffKind;

/// Derive original→corrected replacement pairs from a word-level diff.
///
/// Scans left to right: whenever a deletion is immediately followed by an
/// addition and both trimmed texts are non-empty and different, one
/// [`Correction`] is emitted and both records are consumed; any other record
/// advances the scan by one. Unrelated unchanged tokens are never paired.
///
/// This scan is the canonical source of the correction facts sent to the
/// regeneration service.
pub fn extract_corrections(
    original: &str,
    modified: &str,
    source_label: Option<&str>,
) -> Vec<Correction> {
    let records = diff_words(original, modified);

    let mut corrections = Vec::new();
    let mut i = 0;
    while i < records.len() {
        if records[i].kind == DiffKind::Deletion
            && i + 1 < records.len()
            && records[i + 1].kind == DiffKind::Addition
        {
            let removed = records[i].original_text.as_deref().unwrap_or("").trim();
            let added = records[i + 1].modified_text.as_deref().unwrap_or("").trim();
            if !removed.is_empty() && !added.is_empty() && removed != added {
                corrections.push(Correction {
                    original_text: removed.to_string(),
                    corrected_text: added.to_string(),
                    source_component: source_label.map(str::to_string),
                    context: None,
                });
                i += 2;
                continue;
            }
        }
        i += 1;
    }
    corrections
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_adjacent_pair_yields_nothing() {
        assert!(extract_corrections("a b c", "a b c", None).is_empty());
        // Pure insertion: no deletion to pair with.
        assert!(extract_corrections("a c", "a b c", None).is_empty());
        // Pure removal: no addition to pair with.
        assert!(extract_corrections("a b c", "a c", None).is_empty());
    }

    #[test]
    fn replaced_word_becomes_one_correction() {
        let corrections = extract_corrections("Adam Toze wrote it", "Adam Tooze wrote it", None);
        assert_eq!(corrections.len(), 1);
        assert_eq!(corrections[0].original_text, "Toze");
        assert_eq!(corrections[0].corrected_text, "Tooze");
        assert!(corrections[0].source_component.is_none());
    }

    #[test]
    fn prefix_insertion_pairs_no_unrelated_tokens() {
        let corrections = extract_corrections("Adam Tooze", "Professor Adam Tooze", None);
        assert!(
            corrections.is_empty(),
            "insertion before unchanged tokens must not pair them: {corrections:?}"
        );
    }

    #[test]
    fn source_label_is_carried() {
        let corrections =
            extract_corrections("the colour red", "the color red", Some("description"));
        assert_eq!(corrections.len(), 1);
        assert_eq!(
            corrections[0].source_component.as_deref(),
            Some("description")
        );
    }

    #[test]
    fn multiple_replacements_extract_in_order() {
        let corrections = extract_corrections(
            "teh quick brwon fox",
            "the quick brown fox",
            Some("description"),
        );
        assert_eq!(corrections.len(), 2);
        assert_eq!(corrections[0].original_text, "teh");
        assert_eq!(corrections[0].corrected_text, "the");
        assert_eq!(corrections[1].original_text, "brwon");
        assert_eq!(corrections[1].corrected_text, "brown");
    }

    #[test]
    fn multi_word_replacement_is_one_correction() {
        let corrections = extract_corrections("moved to New York in", "moved to Boston in", None);
        assert_eq!(corrections.len(), 1);
        assert_eq!(corrections[0].original_text, "New York");
        assert_eq!(corrections[0].corrected_text, "Boston");
    }
}
