//! Typed request/response bodies, one struct per endpoint.
//!
//! Wire names follow the services exactly (`expect_tip`, `components_remove`,
//! `pi`, `stop_at_pi`, `entity_pis`); Rust-side names stay descriptive. No
//! ambient JSON shapes: every body decodes into one of these or fails as a
//! `Decode` error.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use curator_core::{Cid, EntityId, RegenKind, Tip};

/// Body of `POST /entities/{id}/versions` — the compare-and-swap write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRequest {
    pub expect_tip: Tip,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub components: BTreeMap<String, Cid>,
    #[serde(
        default,
        rename = "components_remove",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub removed_components: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl CommitRequest {
    pub fn new(expect_tip: Tip) -> Self {
        CommitRequest {
            expect_tip,
            components: BTreeMap::new(),
            removed_components: Vec::new(),
            note: None,
        }
    }
}

/// Success body of the CAS write: the entity's new coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitOutcome {
    pub id: EntityId,
    pub tip: Tip,
    #[serde(rename = "ver")]
    pub version: u64,
}

/// One element of the upload response list; the client uses element 0.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadEntry {
    pub cid: Cid,
    pub name: String,
    #[serde(default)]
    pub size: u64,
}

/// Body of `POST /api/reprocess`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegenRequest {
    #[serde(rename = "pi")]
    pub id: EntityId,
    pub phases: Vec<RegenKind>,
    pub cascade: bool,
    #[serde(default)]
    pub options: RegenOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RegenOptions {
    #[serde(
        default,
        rename = "stop_at_pi",
        skip_serializing_if = "Option::is_none"
    )]
    pub stop_at: Option<EntityId>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_prompts: BTreeMap<RegenKind, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_note: Option<String>,
}

/// Acceptance body of the regeneration trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegenAccepted {
    pub batch_id: String,
    #[serde(rename = "entities_queued")]
    pub queued_count: u64,
    #[serde(default, rename = "entity_pis")]
    pub queued_ids: Vec<EntityId>,
    pub status_url: String,
}

/// Loosely-decoded 409 body: the server's current tip when it reports one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConflictBody {
    #[serde(default)]
    pub tip: Option<Tip>,
}

/// Loosely-decoded error body for non-success responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    /// Best-effort human message from whichever field is populated.
    pub fn into_message(self) -> Option<String> {
        self.error.or(self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_request_omits_empty_fields() {
        let request = CommitRequest::new(Tip::from("T3"));
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, serde_json::json!({ "expect_tip": "T3" }));
    }

    #[test]
    fn commit_request_wire_names() {
        let mut request = CommitRequest::new(Tip::from("T3"));
        request
            .components
            .insert("description".to_string(), Cid::from("cid-1"));
        request.removed_components.push("obsolete".to_string());
        request.note = Some("edit".to_string());

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["expect_tip"], "T3");
        assert_eq!(json["components"]["description"], "cid-1");
        assert_eq!(json["components_remove"][0], "obsolete");
        assert_eq!(json["note"], "edit");
    }

    #[test]
    fn regen_request_wire_names() {
        let request = RegenRequest {
            id: EntityId::from("e-9"),
            phases: vec![RegenKind::Description, RegenKind::KnowledgeGraph],
            cascade: true,
            options: RegenOptions {
                stop_at: Some(EntityId::from("root")),
                custom_prompts: BTreeMap::from([(
                    RegenKind::Description,
                    "focus on dates".to_string(),
                )]),
                custom_note: Some("batch edit".to_string()),
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["pi"], "e-9");
        assert_eq!(json["phases"][0], "description");
        assert_eq!(json["phases"][1], "knowledge-graph");
        assert_eq!(json["cascade"], true);
        assert_eq!(json["options"]["stop_at_pi"], "root");
        assert_eq!(json["options"]["custom_prompts"]["description"], "focus on dates");
        assert_eq!(json["options"]["custom_note"], "batch edit");
    }

    #[test]
    fn regen_accepted_decodes_wire_body() {
        let body = r#"{
            "batch_id": "b-77",
            "entities_queued": 2,
            "entity_pis": ["e-9", "e-1"],
            "status_url": "/api/reprocess/b-77/status"
        }"#;
        let accepted: RegenAccepted = serde_json::from_str(body).unwrap();
        assert_eq!(accepted.queued_count, 2);
        assert_eq!(accepted.queued_ids.len(), 2);
        assert_eq!(accepted.status_url, "/api/reprocess/b-77/status");
    }

    #[test]
    fn conflict_body_tolerates_unknown_shapes() {
        let with_tip: ConflictBody = serde_json::from_str(r#"{"tip": "T9"}"#).unwrap();
        assert_eq!(with_tip.tip, Some(Tip::from("T9")));

        let without: ConflictBody = serde_json::from_str(r#"{"error": "conflict"}"#).unwrap();
        assert!(without.tip.is_none());
    }
}
