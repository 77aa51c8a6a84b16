//! Error types for curator-session.

use thiserror::Error;

use curator_client::ClientError;
use curator_prompt::RenderError;

use crate::mode::EditMode;

/// All errors a session method can surface.
///
/// The first five variants are state-machine misuse by the caller; the rest
/// wrap failures from the layers below unchanged.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A method that requires a loaded entity was called before `load()`.
    #[error("no entity loaded; call load() first")]
    NotLoaded,

    /// `load()` was called on a session that already holds an entity.
    #[error("an entity is already loaded on this session")]
    AlreadyLoaded,

    /// `submit()` was called while another submit was still in flight.
    #[error("a submit is already in flight on this session")]
    SubmitInFlight,

    /// A content setter was called in a mode that forbids direct edits.
    #[error("direct content edits are not allowed in {mode} mode")]
    ContentEditsNotAllowed { mode: EditMode },

    /// An instruction setter was called in a mode that never sends prompts.
    #[error("instructions are not allowed in {mode} mode")]
    PromptsNotAllowed { mode: EditMode },

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Render(#[from] RenderError),
}
