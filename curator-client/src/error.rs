//! Error taxonomy for remote operations.

use thiserror::Error;

use curator_core::{EntityId, Tip};

use crate::transport::TransportError;

/// All errors a [`crate::RemoteClient`] operation can surface.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The remote reports the requested resource does not exist.
    #[error("not found: {resource}")]
    NotFound { resource: String },

    /// A compare-and-swap write lost a race with another writer.
    ///
    /// The caller must reload the entity and recompute its edit; this client
    /// never auto-retries a conflicting write.
    #[error(
        "commit conflict for {id}: expected tip {expected_tip}, server tip {server_tip}",
        server_tip = .actual_tip.as_ref().map(|t| t.0.as_str()).unwrap_or("unknown")
    )]
    Conflict {
        id: EntityId,
        expected_tip: Tip,
        actual_tip: Option<Tip>,
    },

    /// Generic non-success HTTP outcome.
    #[error("remote call failed (HTTP {status}): {message}")]
    Remote { status: u16, message: String },

    /// The remote answered but the body did not match the endpoint's typed
    /// shape.
    #[error("failed to decode {endpoint} response: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The regeneration trigger endpoint rejected the request.
    #[error("regeneration request rejected: {0}")]
    Regeneration(String),

    /// Network-level failure (connect, DNS, timeout).
    #[error(transparent)]
    Transport(#[from] TransportError),
}
