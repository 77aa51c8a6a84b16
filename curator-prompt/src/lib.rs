//! # curator-prompt
//!
//! Deterministic instruction-payload rendering for the regeneration service.
//!
//! [`PromptComposer`] renders three payload shapes from typed contexts:
//! direct instructions, edit-review summaries, and the cascade-context
//! appendix. [`combine_instructions`] merges general and component-specific
//! instructions. Everything here is a pure function of its inputs — the same
//! context renders the same text at preview time and at submit time.

pub mod composer;
pub mod context;
pub mod error;

pub use composer::PromptComposer;
pub use context::{
    combine_instructions, truncate_content, CascadeCtx, DirectInstructionCtx, EditReviewCtx,
    EntityCtx, CONTENT_TRUNCATION_LIMIT,
};
pub use error::RenderError;
