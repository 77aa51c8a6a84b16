//! Prompt contexts — serializable rendering payloads.
//!
//! Each context is a pure function of its inputs; constructors do the
//! truncation and instruction fallback so that preview and submit render
//! byte-identical payloads from the same state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use curator_core::{Correction, EditScope, Entity, RegenKind};
use curator_diff::{format_component_diffs_for_prompt, ComponentDiff};

use crate::error::RenderError;

/// Content longer than this is cut before being embedded in a prompt, with
/// an explicit marker telling the regeneration service the excerpt is
/// incomplete.
pub const CONTENT_TRUNCATION_LIMIT: usize = 2000;

/// Entity fields exposed to templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityCtx {
    pub id: String,
    pub version: u64,
    pub component_count: usize,
}

impl EntityCtx {
    pub fn from_entity(entity: &Entity) -> Self {
        EntityCtx {
            id: entity.id.to_string(),
            version: entity.version,
            component_count: entity.components.len(),
        }
    }
}

/// Cascade appendix payload: tells a human reviewer that ancestors will also
/// be regenerated. Boundary semantics belong to the remote service; this is
/// pass-through description only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CascadeCtx {
    /// Ancestor ids in upward order, when known. May be empty.
    pub path: Vec<String>,
    pub stop_at: Option<String>,
}

impl CascadeCtx {
    /// Build from a scope; `None` when the scope does not cascade.
    pub fn from_scope(scope: &EditScope, path: Vec<String>) -> Option<Self> {
        scope.cascade.then(|| CascadeCtx {
            path,
            stop_at: scope.stop_at.as_ref().map(|id| id.to_string()),
        })
    }
}

/// Context for a direct-instruction prompt: user free text plus the current
/// (possibly truncated) component content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectInstructionCtx {
    pub entity: EntityCtx,
    pub component_name: String,
    pub instruction: String,
    pub current_content: String,
    pub truncated: bool,
    pub truncation_limit: usize,
    pub generated_at: Option<DateTime<Utc>>,
    pub cascade: Option<CascadeCtx>,
}

impl DirectInstructionCtx {
    pub fn new(
        entity: &Entity,
        kind: RegenKind,
        instruction: impl Into<String>,
        current_content: &str,
        generated_at: Option<DateTime<Utc>>,
        cascade: Option<CascadeCtx>,
    ) -> Self {
        let (current_content, truncated) = truncate_content(current_content);
        DirectInstructionCtx {
            entity: EntityCtx::from_entity(entity),
            component_name: kind.component_name().to_string(),
            instruction: instruction.into(),
            current_content,
            truncated,
            truncation_limit: CONTENT_TRUNCATION_LIMIT,
            generated_at,
            cascade,
        }
    }
}

/// Context for an edit-review prompt: what was manually changed plus the
/// corrections and instruction the regeneration service must honor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditReviewCtx {
    pub entity: EntityCtx,
    pub diff_payload: String,
    pub corrections: Vec<Correction>,
    pub instruction: String,
    pub generated_at: Option<DateTime<Utc>>,
    pub cascade: Option<CascadeCtx>,
}

impl EditReviewCtx {
    pub fn new(
        entity: &Entity,
        diffs: &[ComponentDiff],
        corrections: Vec<Correction>,
        instruction: impl Into<String>,
        generated_at: Option<DateTime<Utc>>,
        cascade: Option<CascadeCtx>,
    ) -> Self {
        EditReviewCtx {
            entity: EntityCtx::from_entity(entity),
            diff_payload: format_component_diffs_for_prompt(diffs),
            corrections,
            instruction: instruction.into(),
            generated_at,
            cascade,
        }
    }
}

/// Standalone cascade-appendix context (the same payload the other prompts
/// embed).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CascadeOnlyCtx {
    pub cascade: CascadeCtx,
}

/// Merge a general instruction and a component-specific instruction into one
/// block, falling back to the kind's default instruction when both are
/// absent or blank.
pub fn combine_instructions(
    general: Option<&str>,
    specific: Option<&str>,
    kind: RegenKind,
) -> String {
    let general = general.map(str::trim).filter(|s| !s.is_empty());
    let specific = specific.map(str::trim).filter(|s| !s.is_empty());
    match (general, specific) {
        (Some(g), Some(s)) => format!("{g}\n\n{s}"),
        (Some(g), None) => g.to_string(),
        (None, Some(s)) => s.to_string(),
        (None, None) => kind.default_instruction().to_string(),
    }
}

/// Cut `content` at [`CONTENT_TRUNCATION_LIMIT`] characters.
///
/// Char-based, so the cut never lands inside a UTF-8 sequence.
pub fn truncate_content(content: &str) -> (String, bool) {
    if content.chars().count() <= CONTENT_TRUNCATION_LIMIT {
        return (content.to_string(), false);
    }
    (content.chars().take(CONTENT_TRUNCATION_LIMIT).collect(), true)
}

pub(crate) fn to_tera_context<T: serde::Serialize>(ctx: &T) -> Result<tera::Context, RenderError> {
    tera::Context::from_serialize(ctx).map_err(RenderError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use curator_core::{EntityId, Tip};
    use std::collections::BTreeMap;

    fn make_entity() -> Entity {
        Entity {
            id: EntityId::from("e-1"),
            version: 2,
            timestamp: Utc::now(),
            tip: Tip::from("T2"),
            components: BTreeMap::from([("description".to_string(), "cid-d".into())]),
            child_ids: vec![],
            parent_id: None,
        }
    }

    #[test]
    fn truncation_only_beyond_limit() {
        let short = "a".repeat(CONTENT_TRUNCATION_LIMIT);
        assert_eq!(truncate_content(&short), (short.clone(), false));

        let long = "b".repeat(CONTENT_TRUNCATION_LIMIT + 1);
        let (cut, truncated) = truncate_content(&long);
        assert!(truncated);
        assert_eq!(cut.chars().count(), CONTENT_TRUNCATION_LIMIT);
    }

    #[test]
    fn truncation_is_char_safe() {
        let long = "é".repeat(CONTENT_TRUNCATION_LIMIT + 10);
        let (cut, truncated) = truncate_content(&long);
        assert!(truncated);
        assert_eq!(cut.chars().count(), CONTENT_TRUNCATION_LIMIT);
    }

    #[test]
    fn combine_falls_back_to_default() {
        let combined = combine_instructions(None, None, RegenKind::Description);
        assert_eq!(combined, RegenKind::Description.default_instruction());

        let combined = combine_instructions(Some("  "), Some(""), RegenKind::Metadata);
        assert_eq!(combined, RegenKind::Metadata.default_instruction());
    }

    #[test]
    fn combine_joins_both_blocks() {
        let combined =
            combine_instructions(Some("general"), Some("specific"), RegenKind::Description);
        assert_eq!(combined, "general\n\nspecific");
        assert_eq!(
            combine_instructions(Some("general"), None, RegenKind::Description),
            "general"
        );
        assert_eq!(
            combine_instructions(None, Some("specific"), RegenKind::Description),
            "specific"
        );
    }

    #[test]
    fn cascade_ctx_only_when_scope_cascades() {
        let mut scope = EditScope::targets([RegenKind::Description]);
        assert!(CascadeCtx::from_scope(&scope, vec![]).is_none());

        scope.cascade = true;
        scope.stop_at = Some(EntityId::from("root"));
        let ctx = CascadeCtx::from_scope(&scope, vec!["p1".into()]).expect("cascade ctx");
        assert_eq!(ctx.stop_at.as_deref(), Some("root"));
        assert_eq!(ctx.path, vec!["p1".to_string()]);
    }

    #[test]
    fn direct_ctx_marks_truncation() {
        let entity = make_entity();
        let long = "x".repeat(CONTENT_TRUNCATION_LIMIT * 2);
        let ctx = DirectInstructionCtx::new(
            &entity,
            RegenKind::Description,
            "rewrite it",
            &long,
            None,
            None,
        );
        assert!(ctx.truncated);
        assert_eq!(ctx.current_content.chars().count(), CONTENT_TRUNCATION_LIMIT);
        assert_eq!(ctx.component_name, "description");
        assert_eq!(ctx.entity.version, 2);
    }
}
