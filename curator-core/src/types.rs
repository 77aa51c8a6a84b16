//! Domain types for the Curator edit orchestrator.
//!
//! Identifiers (`EntityId`, `Cid`, `Tip`) are opaque strings wrapped in
//! newtypes; the client never parses or recomputes them. `version` and `tip`
//! form an opaque monotonic pair owned by the server and are only ever used
//! as the optimistic-concurrency token.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed stable identifier for an entity in the archive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub String);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A content identifier: the address of one immutable text blob in the store.
///
/// Identical content yields an identical `Cid`, so re-uploading unchanged
/// content is wasted work but never unsafe.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cid(pub String);

impl fmt::Display for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for Cid {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Cid {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// The content-address of an entity's current manifest.
///
/// Used as the compare-and-swap token for versioned updates: the server
/// accepts a write only when the caller's expected tip matches its current
/// tip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tip(pub String);

impl fmt::Display for Tip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for Tip {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Tip {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Entity snapshot
// ---------------------------------------------------------------------------

/// Immutable-by-convention snapshot of one versioned entity.
///
/// A given `id` has many versions over time, each with a distinct `tip`;
/// `tip` changes exactly when `version` increases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub version: u64,
    pub timestamp: DateTime<Utc>,
    pub tip: Tip,
    /// Named components, each independently content-addressed.
    #[serde(default)]
    pub components: BTreeMap<String, Cid>,
    #[serde(default, rename = "childIds")]
    pub child_ids: Vec<EntityId>,
    #[serde(default, rename = "parentId", skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<EntityId>,
}

// ---------------------------------------------------------------------------
// Regeneratable component kinds
// ---------------------------------------------------------------------------

/// The closed set of component kinds the regeneration service can rebuild.
///
/// Not every component name is regeneratable — only these kinds trigger
/// AI work when named in an [`EditScope`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RegenKind {
    Metadata,
    Description,
    KnowledgeGraph,
}

impl RegenKind {
    /// All kinds in a stable order.
    pub fn all() -> &'static [RegenKind] {
        &[
            RegenKind::Metadata,
            RegenKind::Description,
            RegenKind::KnowledgeGraph,
        ]
    }

    /// The component-map key this kind reads and writes.
    pub fn component_name(&self) -> &'static str {
        match self {
            RegenKind::Metadata => "metadata",
            RegenKind::Description => "description",
            RegenKind::KnowledgeGraph => "knowledge-graph",
        }
    }

    /// Fallback instruction used when neither a general nor a
    /// component-specific instruction was supplied.
    pub fn default_instruction(&self) -> &'static str {
        match self {
            RegenKind::Metadata => {
                "Regenerate the metadata for this entity, keeping every field consistent \
                 with the current content."
            }
            RegenKind::Description => {
                "Regenerate the description for this entity, preserving factual accuracy \
                 and the established tone."
            }
            RegenKind::KnowledgeGraph => {
                "Regenerate the knowledge graph for this entity, reflecting all entities \
                 and relationships present in the current content."
            }
        }
    }
}

impl fmt::Display for RegenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.component_name())
    }
}

// ---------------------------------------------------------------------------
// Edit scope and corrections
// ---------------------------------------------------------------------------

/// What the regeneration service should rebuild, and how far upward.
///
/// `stop_at` bounds a cascade; whether the boundary entity itself is included
/// is defined by the remote service — the client passes it through untouched
/// and never walks the entity tree.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EditScope {
    #[serde(default)]
    pub targets: BTreeSet<RegenKind>,
    #[serde(default)]
    pub cascade: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_at: Option<EntityId>,
}

impl EditScope {
    /// A scope over the given kinds with no cascade.
    pub fn targets(kinds: impl IntoIterator<Item = RegenKind>) -> Self {
        EditScope {
            targets: kinds.into_iter().collect(),
            cascade: false,
            stop_at: None,
        }
    }

    /// True when no regeneratable kind is named, i.e. submit skips phase 2.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// A discrete original→corrected replacement fact for the regeneration
/// service. Often derived from a word-level diff, but callers may add them
/// directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correction {
    pub original_text: String,
    pub corrected_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_component: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl Correction {
    pub fn new(original: impl Into<String>, corrected: impl Into<String>) -> Self {
        Correction {
            original_text: original.into(),
            corrected_text: corrected.into(),
            source_component: None,
            context: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Reprocess job status (server-owned, client-observed)
// ---------------------------------------------------------------------------

/// State of a remote regeneration job. Server-owned closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobState {
    Queued,
    Discovery,
    InProgress,
    Done,
    Error,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Done | JobState::Error)
    }
}

/// Work-unit counts for the current subphase of a running job.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct JobProgress {
    /// Name of the subphase currently in progress, when the job reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subphase: Option<String>,
    #[serde(default)]
    pub done: u64,
    #[serde(default)]
    pub total: u64,
}

/// One observed snapshot of a regeneration job.
///
/// Serde names follow the status endpoint wire format (`status`, `root_pi`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatus {
    pub batch_id: String,
    #[serde(rename = "status")]
    pub state: JobState,
    #[serde(default)]
    pub progress: JobProgress,
    #[serde(default, rename = "root_pi", skip_serializing_if = "Option::is_none")]
    pub root_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newtype_display() {
        assert_eq!(EntityId::from("e-1").to_string(), "e-1");
        assert_eq!(Cid::from("bafy123").to_string(), "bafy123");
        assert_eq!(Tip::from("t9").to_string(), "t9");
    }

    #[test]
    fn newtype_equality() {
        let a = Tip::from("x");
        let b = Tip::from(String::from("x"));
        assert_eq!(a, b);
    }

    #[test]
    fn regen_kind_wire_names_are_kebab_case() {
        assert_eq!(
            serde_json::to_string(&RegenKind::KnowledgeGraph).unwrap(),
            "\"knowledge-graph\""
        );
        assert_eq!(
            serde_json::from_str::<RegenKind>("\"description\"").unwrap(),
            RegenKind::Description
        );
    }

    #[test]
    fn regen_kind_component_names_match_display() {
        for kind in RegenKind::all() {
            assert_eq!(kind.to_string(), kind.component_name());
        }
    }

    #[test]
    fn entity_serde_roundtrip_with_camel_case_tree_fields() {
        let json = r#"{
            "id": "e-7",
            "version": 3,
            "timestamp": "2026-01-15T10:00:00Z",
            "tip": "T3",
            "components": {"description": "cid-d", "metadata": "cid-m"},
            "childIds": ["e-8"],
            "parentId": "e-1"
        }"#;
        let entity: Entity = serde_json::from_str(json).expect("decode entity");
        assert_eq!(entity.version, 3);
        assert_eq!(entity.tip, Tip::from("T3"));
        assert_eq!(entity.child_ids, vec![EntityId::from("e-8")]);
        assert_eq!(entity.parent_id, Some(EntityId::from("e-1")));

        let back = serde_json::to_value(&entity).expect("encode entity");
        assert_eq!(back["childIds"][0], "e-8");
        assert_eq!(back["parentId"], "e-1");
    }

    #[test]
    fn entity_decodes_without_optional_tree_fields() {
        let json = r#"{
            "id": "e-7",
            "version": 1,
            "timestamp": "2026-01-15T10:00:00Z",
            "tip": "T1"
        }"#;
        let entity: Entity = serde_json::from_str(json).expect("decode entity");
        assert!(entity.components.is_empty());
        assert!(entity.child_ids.is_empty());
        assert!(entity.parent_id.is_none());
    }

    #[test]
    fn scope_targets_dedupe_and_order() {
        let scope = EditScope::targets([
            RegenKind::Description,
            RegenKind::Metadata,
            RegenKind::Description,
        ]);
        assert_eq!(scope.targets.len(), 2);
        assert!(!scope.is_empty());
        assert!(EditScope::default().is_empty());
    }

    #[test]
    fn job_state_wire_names_and_terminality() {
        assert_eq!(
            serde_json::from_str::<JobState>("\"IN_PROGRESS\"").unwrap(),
            JobState::InProgress
        );
        assert!(JobState::Done.is_terminal());
        assert!(JobState::Error.is_terminal());
        assert!(!JobState::Queued.is_terminal());
        assert!(!JobState::Discovery.is_terminal());
    }

    #[test]
    fn job_status_decodes_with_missing_progress() {
        let json = r#"{"batch_id": "b-1", "status": "QUEUED"}"#;
        let status: JobStatus = serde_json::from_str(json).expect("decode status");
        assert_eq!(status.state, JobState::Queued);
        assert_eq!(status.progress, JobProgress::default());
        assert!(status.error.is_none());
    }
}
