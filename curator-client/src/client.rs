//! The resilient remote client.
//!
//! Wraps every call to the entity store and the regeneration service, and
//! owns the error mapping: optimistic-concurrency conflicts, typed decode
//! failures, and the status-poll retry loop.
//!
//! Retry discipline: writes never retry — a blind write retry can clobber
//! intervening state or double-apply an edit. The status poll is the only
//! retrying call; it is an idempotent GET with a known transient failure
//! mode during job startup.

use serde::de::DeserializeOwned;

use curator_core::{Cid, Entity, EntityId, JobStatus};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::retry::RetryPolicy;
use crate::transport::{HttpResponse, Transport, TransportError, UreqTransport};
use crate::wire::{
    CommitOutcome, CommitRequest, ConflictBody, ErrorBody, RegenAccepted, RegenRequest,
    UploadEntry,
};

/// Caller-supplied hook that rewrites the status URL (e.g. to route through
/// a proxy). Must be idempotent; it is applied identically to every retry.
pub type StatusUrlRewrite = Box<dyn Fn(&str) -> String + Send + Sync>;

pub struct RemoteClient {
    transport: Box<dyn Transport>,
    store_url: String,
    regen_url: String,
    retry: RetryPolicy,
    rewrite_status_url: Option<StatusUrlRewrite>,
}

impl RemoteClient {
    /// Production client over [`UreqTransport`].
    pub fn new(config: &ClientConfig) -> Self {
        let transport = UreqTransport::new(config.auth_token.clone());
        Self::with_transport(config, Box::new(transport))
    }

    /// Client over a caller-supplied transport (tests use scripted fakes).
    pub fn with_transport(config: &ClientConfig, transport: Box<dyn Transport>) -> Self {
        RemoteClient {
            transport,
            store_url: config.store_url.trim_end_matches('/').to_string(),
            regen_url: config.regen_url.trim_end_matches('/').to_string(),
            retry: config.retry.clone(),
            rewrite_status_url: None,
        }
    }

    /// Install a status-URL rewrite hook.
    pub fn with_status_url_rewrite(
        mut self,
        hook: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.rewrite_status_url = Some(Box::new(hook));
        self
    }

    /// Fetch an entity snapshot. No retry: a missing or failing fetch here
    /// is not assumed to be orchestrator warmup.
    pub fn fetch_entity(&self, id: &EntityId) -> Result<Entity, ClientError> {
        let url = format!("{}/entities/{}", self.store_url, id);
        let response = self.transport.get(&url)?;
        if response.status == 404 {
            return Err(ClientError::NotFound {
                resource: format!("entity {id}"),
            });
        }
        if !response.is_success() {
            return Err(remote_error(&response));
        }
        decode("entity", &response.body)
    }

    /// Fetch one content blob by its address. No retry.
    pub fn fetch_content(&self, cid: &Cid) -> Result<String, ClientError> {
        let url = format!("{}/cat/{}", self.store_url, cid);
        let response = self.transport.get(&url)?;
        if response.status == 404 {
            return Err(ClientError::NotFound {
                resource: format!("content {cid}"),
            });
        }
        if !response.is_success() {
            return Err(remote_error(&response));
        }
        Ok(response.body)
    }

    /// Upload a text blob and return the store-assigned address.
    ///
    /// Content-addressing makes this idempotent: identical text yields the
    /// same [`Cid`].
    pub fn upload_content(&self, text: &str, suggested_name: &str) -> Result<Cid, ClientError> {
        let url = format!("{}/upload", self.store_url);
        let response = self
            .transport
            .post_multipart(&url, suggested_name, text.as_bytes())?;
        if !response.is_success() {
            return Err(remote_error(&response));
        }
        let entries: Vec<UploadEntry> = decode("upload", &response.body)?;
        entries
            .into_iter()
            .next()
            .map(|entry| entry.cid)
            .ok_or_else(|| ClientError::Remote {
                status: response.status,
                message: "upload response contained no entries".to_string(),
            })
    }

    /// The compare-and-swap write. Never retried: on
    /// [`ClientError::Conflict`] the caller must reload and recompute its
    /// edit before trying again.
    pub fn commit_update(
        &self,
        id: &EntityId,
        request: &CommitRequest,
    ) -> Result<CommitOutcome, ClientError> {
        let url = format!("{}/entities/{}/versions", self.store_url, id);
        let body = serde_json::to_value(request).map_err(|source| ClientError::Decode {
            endpoint: "commit request",
            source,
        })?;
        let response = self.transport.post_json(&url, &body)?;
        if response.status == 409 {
            let conflict: ConflictBody = serde_json::from_str(&response.body).unwrap_or_default();
            return Err(ClientError::Conflict {
                id: id.clone(),
                expected_tip: request.expect_tip.clone(),
                actual_tip: conflict.tip,
            });
        }
        if response.status == 404 {
            return Err(ClientError::NotFound {
                resource: format!("entity {id}"),
            });
        }
        if !response.is_success() {
            return Err(remote_error(&response));
        }
        decode("commit", &response.body)
    }

    /// Ask the regeneration service to rebuild the given phases, optionally
    /// cascading upward. The cascade flag and stop boundary pass through
    /// untouched; the service owns the tree walk.
    pub fn trigger_regeneration(
        &self,
        request: &RegenRequest,
    ) -> Result<RegenAccepted, ClientError> {
        let url = format!("{}/api/reprocess", self.regen_url);
        let body = serde_json::to_value(request).map_err(|source| ClientError::Decode {
            endpoint: "reprocess request",
            source,
        })?;
        let response = self.transport.post_json(&url, &body)?;
        if !response.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&response.body)
                .ok()
                .and_then(ErrorBody::into_message)
                .unwrap_or_else(|| format!("HTTP {}", response.status));
            return Err(ClientError::Regeneration(message));
        }
        decode("reprocess", &response.body)
    }

    /// Poll a job-status URL. The only retrying operation: 5xx responses and
    /// transport failures back off exponentially (warmup-sized base on the
    /// first poll of a job) up to the policy bound; any other failure is
    /// immediate. The rewrite hook, when installed, is applied before every
    /// attempt.
    ///
    /// On exhaustion the final failure surfaces with a gave-up message: a
    /// 5xx as [`ClientError::Remote`], a network-level failure as
    /// [`ClientError::Transport`] (there is no HTTP status to report for
    /// those).
    pub fn poll_status(
        &self,
        status_url: &str,
        is_first_poll: bool,
    ) -> Result<JobStatus, ClientError> {
        let url = self.resolve_status_url(status_url);
        let mut retries = 0u32;
        loop {
            let failure: ClientError = match self.transport.get(&url) {
                Ok(response) if response.is_success() => {
                    return decode("status", &response.body);
                }
                Ok(response) if !response.is_server_error() => {
                    return Err(remote_error(&response));
                }
                Ok(response) => remote_error(&response),
                Err(err) => err.into(),
            };

            retries += 1;
            if retries > self.retry.max_retries {
                return Err(match failure {
                    ClientError::Remote { status, message } => ClientError::Remote {
                        status,
                        message: format!(
                            "{message} (gave up after {} retries)",
                            self.retry.max_retries
                        ),
                    },
                    ClientError::Transport(err) => ClientError::Transport(TransportError {
                        url: err.url,
                        message: format!(
                            "{} (gave up after {} retries)",
                            err.message, self.retry.max_retries
                        ),
                    }),
                    other => other,
                });
            }
            let delay = self.retry.delay_for(retries, is_first_poll);
            tracing::warn!(
                "status poll failed ({failure}); retry {retries}/{} in {:?}",
                self.retry.max_retries,
                delay
            );
            if !delay.is_zero() {
                std::thread::sleep(delay);
            }
        }
    }

    fn resolve_status_url(&self, status_url: &str) -> String {
        let absolute = if status_url.starts_with('/') {
            format!("{}{}", self.regen_url, status_url)
        } else {
            status_url.to_string()
        };
        match &self.rewrite_status_url {
            Some(hook) => hook(&absolute),
            None => absolute,
        }
    }
}

fn decode<T: DeserializeOwned>(endpoint: &'static str, body: &str) -> Result<T, ClientError> {
    serde_json::from_str(body).map_err(|source| ClientError::Decode { endpoint, source })
}

fn remote_error(response: &HttpResponse) -> ClientError {
    let mut message: String = response.body.trim().chars().take(200).collect();
    if message.is_empty() {
        message = "no response body".to_string();
    }
    ClientError::Remote {
        status: response.status,
        message,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
