//! Edit modes and their setter-validity table.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How this session's edits reach the regeneration service.
///
/// The mode is fixed at construction; every mode-gated setter consults the
/// capability methods below rather than matching on the variant itself, so
/// the validity table lives in exactly one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EditMode {
    /// The caller writes instructions; the AI rewrites content. Direct
    /// content edits are rejected.
    AiPrompt,
    /// The caller edits content by hand; a synthesized review prompt asks
    /// the AI to propagate the edits. Per-kind instruction overrides are
    /// allowed.
    ManualWithReview,
    /// The caller edits content by hand and no prompt is ever sent.
    /// Instruction setters are rejected.
    ManualOnly,
}

impl EditMode {
    pub fn allows_content_edits(&self) -> bool {
        !matches!(self, EditMode::AiPrompt)
    }

    pub fn allows_prompts(&self) -> bool {
        !matches!(self, EditMode::ManualOnly)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EditMode::AiPrompt => "ai-prompt",
            EditMode::ManualWithReview => "manual-with-review",
            EditMode::ManualOnly => "manual-only",
        }
    }
}

impl fmt::Display for EditMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
