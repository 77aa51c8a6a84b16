//! Curator core library — domain types for the edit orchestration engine.
//!
//! Public API surface:
//! - [`types`] — newtypes, entity snapshot, edit scope, job status
//!
//! Everything here is plain data: no network access and no mutable state.
//! The remote client, diff engine, prompt composer, and session crates all
//! build on these types.

pub mod types;

pub use types::{
    Cid, Correction, EditScope, Entity, EntityId, JobProgress, JobState, JobStatus, RegenKind, Tip,
};
