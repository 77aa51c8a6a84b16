//! Error types for curator-prompt.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while composing prompt payloads.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Tera template parse or render failure.
    #[error("template error: {0}")]
    Template(#[from] tera::Error),

    /// I/O failure while reading a user template override.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RenderError {
    RenderError::Io {
        path: path.into(),
        source,
    }
}
