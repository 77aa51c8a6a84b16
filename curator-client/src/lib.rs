//! curator-client — resilient HTTP client for the entity store and
//! regeneration service.
//!
//! - [`client`] — [`RemoteClient`] with typed error mapping
//! - [`transport`] — the [`Transport`] seam and its ureq implementation
//! - [`retry`] — [`RetryPolicy`] backoff for the status poll
//! - [`wire`] — request/response bodies, one struct per endpoint
//! - [`config`] — [`ClientConfig`] load/save under `~/.curator/`

pub mod client;
pub mod config;
pub mod error;
pub mod retry;
pub mod transport;
pub mod wire;

pub use client::{RemoteClient, StatusUrlRewrite};
pub use config::{ClientConfig, ConfigError};
pub use error::ClientError;
pub use retry::RetryPolicy;
pub use transport::{HttpResponse, Transport, TransportError, UreqTransport};
pub use wire::{
    CommitOutcome, CommitRequest, RegenAccepted, RegenOptions, RegenRequest, UploadEntry,
};
